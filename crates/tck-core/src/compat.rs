//! Module: compat
//! Responsibility: run one predicate over a federated scope and verify the
//! merged result or the diagnostic raised for divergent indexes.
//! Does not own: the diagnostics themselves. Every inconsistency is raised
//! by `ScopeModel` in this crate, so each backend inherits them unchanged.

use crate::{
    assert::{DocRef, assert_that, expect_error},
    backend::{Backend, SearchQuery, SearchResult},
    error::{ConformanceError, ErrorClass, SearchError},
    predicate::{Predicate, PredicateFactory},
    scope::ScopeModel,
};
use tracing::debug;

///
/// CompatibilityExpectation
///
/// What a divergence diagnostic must mention: the field path, the
/// inconsistency (`Inconsistent support for '<trait>'` or
/// `<Property> differs: ...`) and every index of the scope.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CompatibilityExpectation {
    pub field_path: String,
    pub detail: String,
    pub class: ErrorClass,
}

impl CompatibilityExpectation {
    #[must_use]
    pub fn new(field_path: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            field_path: field_path.into(),
            detail: detail.into(),
            class: ErrorClass::Inconsistency,
        }
    }

    #[must_use]
    pub const fn with_class(mut self, class: ErrorClass) -> Self {
        self.class = class;
        self
    }
}

///
/// CompatibilityVerifier
///

pub struct CompatibilityVerifier<'b> {
    backend: &'b dyn Backend,
    routing_key: Option<String>,
}

impl<'b> CompatibilityVerifier<'b> {
    #[must_use]
    pub fn new(backend: &'b dyn Backend) -> Self {
        Self {
            backend,
            routing_key: None,
        }
    }

    /// Restrict every query to one routing key.
    #[must_use]
    pub fn routing(mut self, key: impl Into<String>) -> Self {
        self.routing_key = Some(key.into());
        self
    }

    fn scope(&self, context: &str, indexes: &[&str]) -> Result<ScopeModel, ConformanceError> {
        self.backend
            .scope(indexes)
            .map_err(|err| ConformanceError::fixture(context, err))
    }

    fn run<F>(&self, scope: &ScopeModel, build: F) -> Result<SearchResult, SearchError>
    where
        F: FnOnce(&PredicateFactory<'_>) -> Result<Predicate, SearchError>,
    {
        let predicate = build(&PredicateFactory::new(scope))?;
        let mut query = SearchQuery::new(predicate);
        query.routing_key.clone_from(&self.routing_key);

        self.backend.execute(scope, &query)
    }

    /// The predicate, built once over `indexes`, returns exactly `expected`
    /// with each hit attributed to its own index.
    pub fn expect_union<F>(
        &self,
        context: &str,
        indexes: &[&str],
        build: F,
        expected: impl IntoIterator<Item = DocRef>,
    ) -> Result<(), ConformanceError>
    where
        F: FnOnce(&PredicateFactory<'_>) -> Result<Predicate, SearchError>,
    {
        debug!(context, ?indexes, "expecting federated union");
        let scope = self.scope(context, indexes)?;
        let result = self
            .run(&scope, build)
            .map_err(|err| ConformanceError::unexpected(context, err))?;

        assert_that(context, &result).has_hits_any_order(expected)?;

        Ok(())
    }

    /// Building or executing the predicate over `indexes` fails with the
    /// expected diagnostic.
    pub fn expect_failure<F>(
        &self,
        context: &str,
        indexes: &[&str],
        build: F,
        expectation: &CompatibilityExpectation,
    ) -> Result<(), ConformanceError>
    where
        F: FnOnce(&PredicateFactory<'_>) -> Result<Predicate, SearchError>,
    {
        debug!(context, ?indexes, detail = %expectation.detail, "expecting divergence");
        let scope = self.scope(context, indexes)?;
        let outcome = self.run(&scope, build);

        expect_error(context, outcome, expectation.class)?
            .message_contains(&expectation.field_path)?
            .message_contains(&expectation.detail)?
            .context_indexes_contain(indexes.iter().copied())?;

        Ok(())
    }

    /// Indexes lacking the field are ignored: only `present_index`
    /// contributes hits.
    pub fn expect_missing_field_tolerated<F>(
        &self,
        context: &str,
        indexes: &[&str],
        build: F,
        present_index: &str,
        ids: &[String],
    ) -> Result<(), ConformanceError>
    where
        F: FnOnce(&PredicateFactory<'_>) -> Result<Predicate, SearchError>,
    {
        self.expect_union(
            context,
            indexes,
            build,
            DocRef::all_in(present_index, ids.iter().cloned()),
        )
    }
}
