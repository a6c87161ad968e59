use crate::{
    error::SearchError,
    matrix::PredicateScenario,
    predicate::{Predicate, PredicateFactory},
    schema::SearchTrait,
    types::TestValues,
    value::Value,
};

///
/// KnnScenario
///
/// Nearest neighbour of the stored vector itself. Approximate backends
/// only have to rank it within their top-k tolerance.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct KnnScenario;

impl PredicateScenario for KnnScenario {
    fn kind(&self) -> &'static str {
        "knn"
    }

    fn required_trait(&self) -> SearchTrait {
        SearchTrait::Knn
    }

    fn predicate(
        &self,
        factory: &PredicateFactory<'_>,
        path: &str,
        ordinal: usize,
        values: &TestValues,
    ) -> Result<Predicate, SearchError> {
        factory
            .knn(1)
            .field(path)
            .matching(values.stored(ordinal).clone())
    }

    fn parameterized_predicate(
        &self,
        factory: &PredicateFactory<'_>,
        path: &str,
        param: &str,
    ) -> Option<Result<Predicate, SearchError>> {
        Some(factory.knn(1).field(path).matching_param(param))
    }

    fn parameter_value(&self, ordinal: usize, values: &TestValues) -> Value {
        values.stored(ordinal).clone()
    }

    fn null_argument(
        &self,
        factory: &PredicateFactory<'_>,
        path: &str,
    ) -> Option<Result<Predicate, SearchError>> {
        Some(factory.knn(1).field(path).matching(Value::Null))
    }

    fn relaxed(&self) -> bool {
        true
    }
}
