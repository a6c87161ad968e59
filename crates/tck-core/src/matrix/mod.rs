//! Module: matrix
//! Responsibility: exercise one predicate kind across every field type,
//! multiplicity, nesting path and score modifier.
//! Does not own: what a predicate kind means (see `scenarios`).

mod fixture;
mod runner;
pub mod scenarios;

pub use fixture::{FixtureIndexes, MatrixFixture, TypeFixture, incompatible_counterpart};
pub use runner::PredicateMatrixRunner;

use crate::{
    error::SearchError,
    predicate::{Predicate, PredicateFactory},
    schema::{FieldOptions, SearchTrait, standard_traits},
    types::{FieldTypeDescriptor, TestValues},
    value::Value,
};
use std::fmt;

///
/// PredicateScenario
///
/// Capability set of one predicate kind. The runner only calls these
/// hooks; everything kind-specific lives behind them. Hooks returning
/// `None` opt the kind out of the corresponding check.
///

pub trait PredicateScenario: Send + Sync {
    /// Stable name, used in index names and failure contexts.
    fn kind(&self) -> &'static str;

    fn required_trait(&self) -> SearchTrait;

    fn supports(&self, field_type: &FieldTypeDescriptor) -> bool {
        standard_traits(field_type, &FieldOptions::new()).contains(&self.required_trait())
    }

    /// Values the datasets of this kind store.
    fn values(&self, field_type: &'static FieldTypeDescriptor) -> TestValues {
        field_type.test_values()
    }

    /// Predicate matching exactly the document holding value `ordinal`.
    fn predicate(
        &self,
        factory: &PredicateFactory<'_>,
        path: &str,
        ordinal: usize,
        values: &TestValues,
    ) -> Result<Predicate, SearchError>;

    /// Same as `predicate`, with DSL conversion disabled.
    fn raw_predicate(
        &self,
        factory: &PredicateFactory<'_>,
        path: &str,
        ordinal: usize,
        values: &TestValues,
    ) -> Result<Predicate, SearchError> {
        self.predicate(factory, path, ordinal, values)
    }

    fn multi_field_predicate(
        &self,
        _factory: &PredicateFactory<'_>,
        _paths: &[&str],
        _ordinal: usize,
        _values: &TestValues,
    ) -> Option<Result<Predicate, SearchError>> {
        None
    }

    /// Predicate whose well-typed argument no stored document holds.
    /// Approximate kinds always return neighbours and opt out.
    fn non_matching_predicate(
        &self,
        factory: &PredicateFactory<'_>,
        path: &str,
        values: &TestValues,
    ) -> Option<Result<Predicate, SearchError>> {
        if self.relaxed() {
            return None;
        }
        let absent = TestValues::identity(vec![values.non_matching()?.clone()]);

        Some(self.predicate(factory, path, 0, &absent))
    }

    /// Predicate on the object field at `object_path`, matching documents
    /// holding at least one populated instance of it.
    fn object_predicate(
        &self,
        _factory: &PredicateFactory<'_>,
        _object_path: &str,
    ) -> Option<Result<Predicate, SearchError>> {
        None
    }

    /// Predicate taking its argument from query parameter `param`.
    fn parameterized_predicate(
        &self,
        _factory: &PredicateFactory<'_>,
        _path: &str,
        _param: &str,
    ) -> Option<Result<Predicate, SearchError>> {
        None
    }

    /// Parameter value that makes `parameterized_predicate` match `ordinal`.
    fn parameter_value(&self, ordinal: usize, values: &TestValues) -> Value {
        values.matching(ordinal).clone()
    }

    fn boosted(
        &self,
        factory: &PredicateFactory<'_>,
        path: &str,
        ordinal: usize,
        values: &TestValues,
        boost: f32,
    ) -> Result<Predicate, SearchError> {
        Ok(self.predicate(factory, path, ordinal, values)?.boost(boost))
    }

    fn constant_score(
        &self,
        factory: &PredicateFactory<'_>,
        path: &str,
        ordinal: usize,
        values: &TestValues,
    ) -> Result<Predicate, SearchError> {
        Ok(self.predicate(factory, path, ordinal, values)?.constant_score())
    }

    /// Predicate built with a null argument.
    fn null_argument(
        &self,
        _factory: &PredicateFactory<'_>,
        _path: &str,
    ) -> Option<Result<Predicate, SearchError>> {
        None
    }

    /// Approximate kinds only guarantee the expected document ranks within
    /// the backend's top-k tolerance.
    fn relaxed(&self) -> bool {
        false
    }

    /// Whether arguments pass through DSL converters.
    fn uses_conversion(&self) -> bool {
        self.required_trait().converts_values()
    }
}

///
/// MatrixReport
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MatrixReport {
    pub scenario: String,
    pub checks: usize,
    pub skipped: usize,
}

impl MatrixReport {
    #[must_use]
    pub fn new(scenario: &str) -> Self {
        Self {
            scenario: scenario.to_string(),
            ..Self::default()
        }
    }

    pub fn merge(&mut self, other: &Self) {
        self.checks += other.checks;
        self.skipped += other.skipped;
    }
}

impl fmt::Display for MatrixReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} checks passed, {} skipped",
            self.scenario, self.checks, self.skipped
        )
    }
}
