//! Module: index
//! Responsibility: committed documents of one index and the validation
//! that turns a contributed document into its indexed form.
//! Does not own: write buffering (see `sink`).

use crate::codec::{FieldEncoder, IndexedValue};
use std::{
    collections::BTreeMap,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard},
};
use tck_core::{
    document::{Document, DocumentObject},
    error::{ErrorClass, ErrorContext, SearchError},
    schema::{IndexSchema, SchemaNode},
    value::Value,
};

///
/// IndexedObject
///
/// Indexed mirror of `DocumentObject`, keyed by relative names.
///

#[derive(Clone, Debug, Default)]
pub struct IndexedObject {
    values: BTreeMap<String, Vec<IndexedValue>>,
    objects: BTreeMap<String, Vec<Self>>,
}

impl IndexedObject {
    /// Values of the field at `relative` below this instance. Intermediate
    /// object instances are flattened into one list.
    #[must_use]
    pub fn values_at<'a>(&'a self, relative: &str) -> Vec<&'a IndexedValue> {
        let mut out = Vec::new();
        self.collect_values(relative, &mut out);
        out
    }

    fn collect_values<'a>(&'a self, relative: &str, out: &mut Vec<&'a IndexedValue>) {
        match relative.split_once('.') {
            None => out.extend(self.values.get(relative).into_iter().flatten()),
            Some((head, rest)) => {
                for child in self.objects.get(head).into_iter().flatten() {
                    child.collect_values(rest, out);
                }
            }
        }
    }

    /// Instances of the object field at `relative` below this instance.
    #[must_use]
    pub fn objects_at<'a>(&'a self, relative: &str) -> Vec<&'a Self> {
        let mut out = Vec::new();
        self.collect_objects(relative, &mut out);
        out
    }

    fn collect_objects<'a>(&'a self, relative: &str, out: &mut Vec<&'a Self>) {
        match relative.split_once('.') {
            None => out.extend(self.objects.get(relative).into_iter().flatten()),
            Some((head, rest)) => {
                for child in self.objects.get(head).into_iter().flatten() {
                    child.collect_objects(rest, out);
                }
            }
        }
    }

    /// No value anywhere in this instance or below it.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.values().all(Vec::is_empty)
            && self.objects.values().flatten().all(Self::is_empty)
    }
}

///
/// IndexedDocument
///

#[derive(Clone, Debug)]
pub struct IndexedDocument {
    pub id: String,
    pub routing_key: Option<String>,
    pub root: IndexedObject,
}

impl IndexedDocument {
    /// Validate `document` against `schema` and encode every value.
    pub fn index(schema: &IndexSchema, document: Document) -> Result<Self, SearchError> {
        let root = index_object(schema, None, &document.root).map_err(|err| {
            err.with_context(ErrorContext::new().with_indexes([schema.name()]))
        })?;

        Ok(Self {
            id: document.id,
            routing_key: document.routing_key,
            root,
        })
    }

    #[must_use]
    pub fn is_routed_to(&self, routing_key: Option<&str>) -> bool {
        routing_key.is_none_or(|key| self.routing_key.as_deref() == Some(key))
    }
}

fn index_object(
    schema: &IndexSchema,
    parent: Option<&str>,
    object: &DocumentObject,
) -> Result<IndexedObject, SearchError> {
    let absolute = |name: &str| parent.map_or_else(|| name.to_string(), |p| format!("{p}.{name}"));
    let mut indexed = IndexedObject::default();

    for (name, values) in object.value_entries() {
        let path = absolute(name);
        let Some(field) = schema.field(&path) else {
            return Err(invalid(&path, "is not a value field of this index"));
        };
        if values.len() > 1 && !field.options.multi_valued {
            return Err(invalid(&path, "is not multi-valued"));
        }

        let encoder = FieldEncoder::for_schema(field)?;
        let mut encoded = Vec::with_capacity(values.len());
        for value in values {
            let coerced = value
                .coerce_to(field.field_type.value_kind())
                .ok_or_else(|| invalid(&path, &format!("cannot hold '{value}'")))?;
            if let (Some(dimension), Value::Vector(vector)) = (field.options.dimension, &coerced)
                && vector.len() != dimension
            {
                return Err(invalid(&path, &format!("expects vectors of dimension {dimension}")));
            }
            encoded.push(encoder.encode(&coerced));
        }
        indexed.values.insert(name.to_string(), encoded);
    }

    for (name, instances) in object.object_entries() {
        let path = absolute(name);
        let Some(SchemaNode::Object(schema_object)) = schema.node(&path) else {
            return Err(invalid(&path, "is not an object field of this index"));
        };
        if instances.len() > 1 && !schema_object.multi_valued {
            return Err(invalid(&path, "is not multi-valued"));
        }

        let children = instances
            .iter()
            .map(|instance| index_object(schema, Some(&path), instance))
            .collect::<Result<Vec<_>, _>>()?;
        indexed.objects.insert(name.to_string(), children);
    }

    Ok(indexed)
}

fn invalid(path: &str, problem: &str) -> SearchError {
    SearchError::new(
        ErrorClass::Argument,
        format!("Invalid document: field '{path}' {problem}."),
    )
}

///
/// MemoryIndex
///
/// Committed documents by identifier. Readers never observe a partially
/// committed batch.
///

#[derive(Debug)]
pub struct MemoryIndex {
    schema: Arc<IndexSchema>,
    documents: RwLock<BTreeMap<String, IndexedDocument>>,
}

impl MemoryIndex {
    #[must_use]
    pub fn new(schema: Arc<IndexSchema>) -> Self {
        Self {
            schema,
            documents: RwLock::new(BTreeMap::new()),
        }
    }

    #[must_use]
    pub const fn schema(&self) -> &Arc<IndexSchema> {
        &self.schema
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.schema.name()
    }

    /// Make a batch searchable; a later document replaces an earlier one
    /// with the same identifier.
    pub fn commit(&self, batch: Vec<IndexedDocument>) {
        let mut documents = self.documents.write().unwrap_or_else(PoisonError::into_inner);
        for document in batch {
            documents.insert(document.id.clone(), document);
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, IndexedDocument>> {
        self.documents.read().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }
}
