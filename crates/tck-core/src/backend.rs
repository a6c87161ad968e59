//! Module: backend
//! Responsibility: contracts a search backend implements to be verified.
//! Does not own: any evaluation strategy; backends bring their own.

use crate::{
    document::Document,
    error::SearchError,
    predicate::{Predicate, QueryParams},
    schema::{FieldOptions, IndexSchema, IndexSchemaBuilder, TraitSet, standard_traits},
    scope::ScopeModel,
    types::FieldTypeDescriptor,
    value::Value,
};
use std::{cmp::Ordering, sync::Arc};

///
/// BackendFeatures
///
/// Capabilities that change what the kit may assert.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BackendFeatures {
    /// Approximate (knn) predicates pass when the expected document is
    /// among this many top hits.
    pub approximate_top_k: usize,
}

impl Default for BackendFeatures {
    fn default() -> Self {
        Self {
            approximate_top_k: 1,
        }
    }
}

///
/// Backend
///

pub trait Backend: Send + Sync {
    fn name(&self) -> &str;

    fn features(&self) -> BackendFeatures {
        BackendFeatures::default()
    }

    /// Traits a field declared with `options` supports on this backend.
    fn traits_for(&self, field_type: &FieldTypeDescriptor, options: &FieldOptions) -> TraitSet {
        standard_traits(field_type, options)
    }

    /// Realize and register an index; the name must be unused.
    fn create_index(&self, builder: IndexSchemaBuilder) -> Result<Arc<IndexSchema>, SearchError>;

    fn schema(&self, index: &str) -> Option<Arc<IndexSchema>>;

    /// Scope over the named indexes.
    fn scope(&self, indexes: &[&str]) -> Result<ScopeModel, SearchError> {
        let schemas = indexes
            .iter()
            .map(|name| {
                self.schema(name)
                    .ok_or_else(|| SearchError::backend(format!("Unknown index '{name}'.")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        ScopeModel::new(schemas)
    }

    /// Writer for one index; writes become searchable once joined.
    fn sink(&self, index: &str) -> Result<Box<dyn DocumentSink>, SearchError>;

    fn execute(&self, scope: &ScopeModel, query: &SearchQuery) -> Result<SearchResult, SearchError>;
}

///
/// DocumentSink
///

pub trait DocumentSink: Send {
    fn index_name(&self) -> &str;

    fn add(&mut self, document: Document) -> Result<(), SearchError>;

    /// Block until every added document is committed and searchable.
    fn join(self: Box<Self>) -> Result<(), SearchError>;
}

///
/// SearchQuery
///

#[derive(Clone, Debug)]
pub struct SearchQuery {
    pub predicate: Predicate,
    pub routing_key: Option<String>,
    pub params: QueryParams,
    pub limit: Option<usize>,
}

impl SearchQuery {
    #[must_use]
    pub fn new(predicate: Predicate) -> Self {
        Self {
            predicate,
            routing_key: None,
            params: QueryParams::new(),
            limit: None,
        }
    }

    /// Only documents contributed with this routing key are searched.
    #[must_use]
    pub fn routing(mut self, key: impl Into<String>) -> Self {
        self.routing_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

///
/// SearchHit
///

#[derive(Clone, Debug, PartialEq)]
pub struct SearchHit {
    pub index: String,
    pub id: String,
    pub score: f32,
}

///
/// SearchResult
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchResult {
    pub hits: Vec<SearchHit>,
    pub total: usize,
}

impl SearchResult {
    /// Order hits by descending score, then index name, then id, and keep
    /// the first `limit`. `total` counts every hit.
    #[must_use]
    pub fn ranked(mut hits: Vec<SearchHit>, limit: Option<usize>) -> Self {
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.index.cmp(&b.index))
                .then_with(|| a.id.cmp(&b.id))
        });
        let total = hits.len();
        if let Some(limit) = limit {
            hits.truncate(limit);
        }

        Self { hits, total }
    }

    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.hits.iter().map(|hit| hit.id.as_str()).collect()
    }
}

///
/// TESTS
///
