use crate::{
    codec::FieldEncoder,
    eval::{Candidate, Program},
    index::MemoryIndex,
    sink::MemorySink,
};
use std::{
    collections::BTreeMap,
    sync::{Arc, PoisonError, RwLock},
};
use tck_core::{
    backend::{Backend, BackendFeatures, DocumentSink, SearchHit, SearchQuery, SearchResult},
    error::{ErrorClass, ErrorContext, SearchError},
    schema::{IndexSchema, IndexSchemaBuilder},
    scope::ScopeModel,
};
use tracing::{debug, info};

///
/// MemoryBackend
///
/// Reference backend: every index lives in memory. Evaluation is exact, so
/// the default approximate tolerance of one hit holds for knn.
///

#[derive(Debug)]
pub struct MemoryBackend {
    name: String,
    features: BackendFeatures,
    indexes: RwLock<BTreeMap<String, Arc<MemoryIndex>>>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::named("memory")
    }

    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            features: BackendFeatures::default(),
            indexes: RwLock::new(BTreeMap::new()),
        }
    }

    #[must_use]
    pub const fn with_features(mut self, features: BackendFeatures) -> Self {
        self.features = features;
        self
    }

    fn index(&self, name: &str) -> Result<Arc<MemoryIndex>, SearchError> {
        self.indexes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| SearchError::backend(format!("Unknown index '{name}'.")))
    }

    /// Committed documents of `index`, `None` for unknown indexes.
    #[must_use]
    pub fn document_count(&self, index: &str) -> Option<usize> {
        self.index(index).ok().map(|index| index.len())
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for MemoryBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn features(&self) -> BackendFeatures {
        self.features
    }

    fn create_index(&self, builder: IndexSchemaBuilder) -> Result<Arc<IndexSchema>, SearchError> {
        let schema = Arc::new(IndexSchema::realize(builder, |ty, options| {
            self.traits_for(ty, options)
        })?);
        for field in schema.fields() {
            FieldEncoder::for_schema(field).map_err(|err| {
                err.with_context(
                    ErrorContext::new()
                        .with_indexes([schema.name()])
                        .with_field(field.path.as_str()),
                )
            })?;
        }

        let mut indexes = self.indexes.write().unwrap_or_else(PoisonError::into_inner);
        if indexes.contains_key(schema.name()) {
            return Err(SearchError::new(
                ErrorClass::Schema,
                format!("Index '{}' already exists.", schema.name()),
            ));
        }
        indexes.insert(
            schema.name().to_string(),
            Arc::new(MemoryIndex::new(Arc::clone(&schema))),
        );
        info!(
            backend = %self.name,
            index = schema.name(),
            fields = schema.fields().count(),
            "created index"
        );

        Ok(schema)
    }

    fn schema(&self, index: &str) -> Option<Arc<IndexSchema>> {
        self.index(index).ok().map(|index| Arc::clone(index.schema()))
    }

    fn sink(&self, index: &str) -> Result<Box<dyn DocumentSink>, SearchError> {
        Ok(Box::new(MemorySink::new(self.index(index)?)))
    }

    fn execute(
        &self,
        scope: &ScopeModel,
        query: &SearchQuery,
    ) -> Result<SearchResult, SearchError> {
        let mut program = Program::compile(&query.predicate, &query.params)?;
        let indexes = scope
            .index_names()
            .map(|name| self.index(name))
            .collect::<Result<Vec<_>, _>>()?;
        let snapshots = indexes
            .iter()
            .map(|index| (index.name(), index.read()))
            .collect::<Vec<_>>();

        let routing_key = query.routing_key.as_deref();
        let candidates = snapshots
            .iter()
            .flat_map(|(index, documents)| {
                documents
                    .values()
                    .filter(move |document| document.is_routed_to(routing_key))
                    .map(move |document| Candidate {
                        index: *index,
                        document,
                    })
            })
            .collect::<Vec<_>>();
        program.prepare(&candidates);

        let hits = candidates
            .iter()
            .filter_map(|candidate| {
                program.score(candidate).map(|score| SearchHit {
                    index: candidate.index.to_string(),
                    id: candidate.document.id.clone(),
                    score,
                })
            })
            .collect::<Vec<_>>();
        debug!(
            predicate = %query.predicate,
            candidates = candidates.len(),
            hits = hits.len(),
            "executed query"
        );

        Ok(SearchResult::ranked(hits, query.limit))
    }
}

///
/// TESTS
///
