//! Module: dataset
//! Responsibility: deterministic documents for the matrix protocols and
//! their contribution to backend sinks.
//! Does not own: which indexes receive which dataset (see `matrix`).

use crate::{
    backend::DocumentSink,
    binding::{BindingTree, ObjectFieldBinding},
    document::{Document, DocumentObject},
    error::SearchError,
    types::{FieldTypeDescriptor, TestValues},
    value::Value,
};
use std::thread;
use tracing::{debug, warn};

/// Number of sibling fields in the multi-field dataset.
pub const MULTI_FIELD_COUNT: usize = 3;

///
/// DataSet
///
/// Documents sharing one routing key. Document `i` is identified by
/// `doc_id(i)` so expectations can be written against ordinals.
///

#[derive(Clone, Debug)]
pub struct DataSet {
    routing_key: String,
    documents: Vec<Document>,
    ordinals: usize,
}

impl DataSet {
    /// One document per value at `path`; plus an empty document.
    #[must_use]
    pub fn single_field(routing_key: &str, path: &str, values: &TestValues) -> Self {
        let mut set = Self::new(routing_key);
        for (ordinal, value) in values.all_stored().iter().enumerate() {
            let mut doc = set.document(ordinal);
            write_path(doc.root_mut(), path, value.clone());
            set.documents.push(doc);
        }
        set.ordinals = values.len();
        set.push_empty(Document::new(set.empty_doc_id()));

        set
    }

    /// Document `i` holds value `i` in `paths[i]`. Only as many documents
    /// as the type has distinguishable values.
    #[must_use]
    pub fn multi_field(routing_key: &str, paths: &[String], values: &TestValues) -> Self {
        let mut set = Self::new(routing_key);
        let count = paths.len().min(values.len());
        for (ordinal, path) in paths.iter().take(count).enumerate() {
            let mut doc = set.document(ordinal);
            write_path(doc.root_mut(), path, values.stored(ordinal).clone());
            set.documents.push(doc);
        }
        set.ordinals = count;

        set
    }

    /// Document `i` holds value `i` in the `field_type` leaf of every node of
    /// `tree`. Each populated instance also gets an empty sibling instance
    /// of every child object; the empty document has the instance tree
    /// and no value.
    #[must_use]
    pub fn object_nesting(
        routing_key: &str,
        tree: &BindingTree,
        field_type: &FieldTypeDescriptor,
        values: &TestValues,
    ) -> Self {
        let mut set = Self::new(routing_key);
        let Some(root) = tree.root() else {
            return set;
        };

        for (ordinal, value) in values.all_stored().iter().enumerate() {
            let mut doc = set.document(ordinal);
            populate(doc.root_mut(), tree, root, field_type, value);
            set.documents.push(doc);
        }
        set.ordinals = values.len();

        let mut empty = Document::new(set.empty_doc_id());
        skeleton(empty.root_mut(), tree, root);
        set.push_empty(empty);

        set
    }

    /// The identifier space of `of`, without any field value.
    #[must_use]
    pub fn missing_field(of: &Self) -> Self {
        let documents = of
            .documents
            .iter()
            .map(|doc| Document::new(doc.id.clone()).routing(of.routing_key.clone()))
            .collect();

        Self {
            routing_key: of.routing_key.clone(),
            documents,
            ordinals: of.ordinals,
        }
    }

    fn new(routing_key: &str) -> Self {
        Self {
            routing_key: routing_key.to_string(),
            documents: Vec::new(),
            ordinals: 0,
        }
    }

    fn document(&self, ordinal: usize) -> Document {
        Document::new(self.doc_id(ordinal)).routing(self.routing_key.clone())
    }

    fn push_empty(&mut self, doc: Document) {
        self.documents.push(doc.routing(self.routing_key.clone()));
    }

    #[must_use]
    pub fn routing_key(&self) -> &str {
        &self.routing_key
    }

    #[must_use]
    pub fn doc_id(&self, ordinal: usize) -> String {
        format!("{}_doc_{ordinal}", self.routing_key)
    }

    #[must_use]
    pub fn empty_doc_id(&self) -> String {
        format!("{}_doc_empty", self.routing_key)
    }

    /// Number of value-carrying documents; ordinals are `0..ordinals()`.
    #[must_use]
    pub const fn ordinals(&self) -> usize {
        self.ordinals
    }

    #[must_use]
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Append every document to `sink` without joining it.
    pub fn contribute(&self, sink: &mut dyn DocumentSink) -> Result<(), SearchError> {
        debug!(
            index = sink.index_name(),
            routing_key = %self.routing_key,
            documents = self.documents.len(),
            "contributing dataset"
        );
        for doc in &self.documents {
            sink.add(doc.clone())?;
        }

        Ok(())
    }
}

fn write_path(root: &mut DocumentObject, path: &str, value: Value) {
    let mut segments = path.split('.').collect::<Vec<_>>();
    let Some(leaf) = segments.pop() else {
        return;
    };

    let mut object = root;
    for segment in segments {
        object = object.add_object(segment);
    }
    object.add_value(leaf, value);
}

fn populate(
    object: &mut DocumentObject,
    tree: &BindingTree,
    node: &ObjectFieldBinding,
    field_type: &FieldTypeDescriptor,
    value: &Value,
) {
    if let Some(leaf) = node.field(field_type) {
        object.set(leaf, value.clone());
    }

    for child in node.children().filter_map(|path| tree.get(path)) {
        populate(
            object.add_object(&child.relative_name),
            tree,
            child,
            field_type,
            value,
        );
        object.add_object(&child.relative_name);
    }
}

fn skeleton(object: &mut DocumentObject, tree: &BindingTree, node: &ObjectFieldBinding) {
    for child in node.children().filter_map(|path| tree.get(path)) {
        skeleton(object.add_object(&child.relative_name), tree, child);
    }
}

///
/// BulkIndexer
///
/// Contributes datasets to several sinks and joins every sink before
/// returning. With `concurrent`, each sink runs on its own scoped thread.
///

pub struct BulkIndexer<'d> {
    targets: Vec<(Box<dyn DocumentSink>, Vec<&'d DataSet>)>,
    concurrent: bool,
}

impl<'d> BulkIndexer<'d> {
    #[must_use]
    pub fn new(concurrent: bool) -> Self {
        Self {
            targets: Vec::new(),
            concurrent,
        }
    }

    /// Queue `datasets` for `sink`.
    #[must_use]
    pub fn add(mut self, sink: Box<dyn DocumentSink>, datasets: Vec<&'d DataSet>) -> Self {
        self.targets.push((sink, datasets));
        self
    }

    /// Contribute and join everything; the first failure wins.
    pub fn join(self) -> Result<(), SearchError> {
        let sinks = self.targets.len();
        debug!(sinks, concurrent = self.concurrent, "bulk indexing");

        if !self.concurrent {
            return self.targets.into_iter().try_for_each(|(sink, sets)| feed(sink, &sets));
        }

        thread::scope(|s| {
            let handles = self
                .targets
                .into_iter()
                .map(|(sink, sets)| s.spawn(move || feed(sink, &sets)))
                .collect::<Vec<_>>();

            handles
                .into_iter()
                .map(|handle| {
                    handle.join().unwrap_or_else(|_| {
                        warn!("bulk indexing thread panicked");
                        Err(SearchError::backend("Bulk indexing thread panicked."))
                    })
                })
                .collect::<Vec<_>>()
                .into_iter()
                .collect::<Result<(), _>>()
        })
    }
}

fn feed(mut sink: Box<dyn DocumentSink>, datasets: &[&DataSet]) -> Result<(), SearchError> {
    for set in datasets {
        set.contribute(sink.as_mut())?;
    }

    sink.join()
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        binding::ObjectFieldBindingGenerator,
        schema::IndexSchemaBuilder,
        types::{BOOLEAN, INTEGER, KEYWORD},
    };
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct RecordingSink {
        added: Arc<Mutex<Vec<String>>>,
        fail_on_join: bool,
    }

    impl DocumentSink for RecordingSink {
        fn index_name(&self) -> &str {
            "recording"
        }

        fn add(&mut self, document: Document) -> Result<(), SearchError> {
            self.added.lock().expect("lock").push(document.id);
            Ok(())
        }

        fn join(self: Box<Self>) -> Result<(), SearchError> {
            if self.fail_on_join {
                return Err(SearchError::backend("refresh failed"));
            }
            Ok(())
        }
    }

    fn count_values(object: &DocumentObject) -> usize {
        object.value_entries().map(|(_, v)| v.len()).sum::<usize>()
            + object
                .object_entries()
                .flat_map(|(_, instances)| instances)
                .map(count_values)
                .sum::<usize>()
    }

    #[test]
    fn single_field_documents_and_identifiers() {
        let set = DataSet::single_field("single_integer", "integer_field", &INTEGER.test_values());

        assert_eq!(set.ordinals(), 5);
        assert_eq!(set.documents().len(), 6);
        assert_eq!(set.doc_id(2), "single_integer_doc_2");
        assert_eq!(set.documents()[2].root.values("integer_field"), &[Value::Int(13)]);
        let empty = set.documents().last().expect("empty document");
        assert_eq!(empty.id, "single_integer_doc_empty");
        assert!(empty.root.has_no_values());
        assert!(set.documents().iter().all(|d| d.routing_key.as_deref() == Some("single_integer")));
    }

    #[test]
    fn booleans_get_two_multi_field_documents() {
        let paths = (0..MULTI_FIELD_COUNT)
            .map(|i| format!("boolean_field{i}"))
            .collect::<Vec<_>>();

        let set = DataSet::multi_field("multi_boolean", &paths, &BOOLEAN.test_values());
        assert_eq!(set.documents().len(), 2);
        assert_eq!(set.documents()[1].root.values("boolean_field1"), &[Value::Bool(true)]);

        let set = DataSet::multi_field("multi_integer", &paths, &INTEGER.test_values());
        assert_eq!(set.documents().len(), MULTI_FIELD_COUNT);
        assert!(set.documents()[2].root.values("integer_field0").is_empty());
    }

    #[test]
    fn object_nesting_writes_every_node_and_empty_siblings() {
        let mut builder = IndexSchemaBuilder::new("main");
        let tree = ObjectFieldBindingGenerator::new([&KEYWORD]).create_root(&mut builder);
        let values = KEYWORD.test_values();
        let set = DataSet::object_nesting("nesting_keyword", &tree, &KEYWORD, &values);

        let doc = &set.documents()[0];
        assert_eq!(count_values(&doc.root), tree.len());
        let nested = doc.root.objects("nested");
        assert_eq!(nested.len(), 2);
        assert_eq!(nested[0].values("keyword_field"), &[Value::from("Irving")]);
        assert!(nested[1].has_no_values());

        let empty = set.documents().last().expect("empty document");
        assert!(empty.root.has_no_values());
        assert_eq!(empty.root.objects("flattened").len(), 1);
        assert_eq!(empty.root.objects("flattened")[0].objects("nested").len(), 1);
    }

    #[test]
    fn missing_field_keeps_identifiers_only() {
        let set = DataSet::single_field("single_keyword", "keyword_field", &KEYWORD.test_values());
        let missing = DataSet::missing_field(&set);

        let ids = |s: &DataSet| s.documents().iter().map(|d| d.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&missing), ids(&set));
        assert!(missing.documents().iter().all(|d| d.root.has_no_values()));
    }

    #[test]
    fn bulk_indexer_feeds_every_sink_and_reports_failures() {
        let set = DataSet::single_field("rk", "integer_field", &INTEGER.test_values());
        let first = RecordingSink::default();
        let second = RecordingSink::default();

        BulkIndexer::new(true)
            .add(Box::new(first.clone()), vec![&set])
            .add(Box::new(second.clone()), vec![&set, &set])
            .join()
            .expect("contribution");
        assert_eq!(first.added.lock().expect("lock").len(), 6);
        assert_eq!(second.added.lock().expect("lock").len(), 12);

        let failing = RecordingSink {
            fail_on_join: true,
            ..RecordingSink::default()
        };
        let err = BulkIndexer::new(false)
            .add(Box::new(failing), vec![&set])
            .join()
            .expect_err("join failure propagates");
        assert!(err.message.contains("refresh failed"));
    }
}
