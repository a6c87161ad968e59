use crate::{
    error::SearchError,
    matrix::PredicateScenario,
    predicate::{Predicate, PredicateFactory},
    schema::SearchTrait,
    types::TestValues,
    value::Value,
};

/// Length of the prefix pattern scenarios anchor on. Every test word of a
/// type differs within it.
const PREFIX_LEN: usize = 3;

fn prefix(value: &Value) -> String {
    value.to_string().chars().take(PREFIX_LEN).collect()
}

///
/// PhraseScenario
///
/// The stored text itself is the phrase: analysis on both sides must
/// agree on token positions.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct PhraseScenario;

impl PredicateScenario for PhraseScenario {
    fn kind(&self) -> &'static str {
        "phrase"
    }

    fn required_trait(&self) -> SearchTrait {
        SearchTrait::Phrase
    }

    fn predicate(
        &self,
        factory: &PredicateFactory<'_>,
        path: &str,
        ordinal: usize,
        values: &TestValues,
    ) -> Result<Predicate, SearchError> {
        factory
            .phrase()
            .field(path)
            .matching(values.stored(ordinal).clone())
    }

    fn multi_field_predicate(
        &self,
        factory: &PredicateFactory<'_>,
        paths: &[&str],
        ordinal: usize,
        values: &TestValues,
    ) -> Option<Result<Predicate, SearchError>> {
        Some(
            factory
                .phrase()
                .fields(paths.iter().copied())
                .matching(values.stored(ordinal).clone()),
        )
    }

    fn parameterized_predicate(
        &self,
        factory: &PredicateFactory<'_>,
        path: &str,
        param: &str,
    ) -> Option<Result<Predicate, SearchError>> {
        Some(factory.phrase().field(path).matching_param(param))
    }

    fn parameter_value(&self, ordinal: usize, values: &TestValues) -> Value {
        values.stored(ordinal).clone()
    }

    fn null_argument(
        &self,
        factory: &PredicateFactory<'_>,
        path: &str,
    ) -> Option<Result<Predicate, SearchError>> {
        Some(factory.phrase().field(path).matching(Value::Null))
    }
}

///
/// WildcardScenario
///

#[derive(Clone, Copy, Debug, Default)]
pub struct WildcardScenario;

impl WildcardScenario {
    fn pattern(ordinal: usize, values: &TestValues) -> String {
        format!("{}*", prefix(values.matching(ordinal)))
    }
}

impl PredicateScenario for WildcardScenario {
    fn kind(&self) -> &'static str {
        "wildcard"
    }

    fn required_trait(&self) -> SearchTrait {
        SearchTrait::Wildcard
    }

    fn predicate(
        &self,
        factory: &PredicateFactory<'_>,
        path: &str,
        ordinal: usize,
        values: &TestValues,
    ) -> Result<Predicate, SearchError> {
        factory
            .wildcard()
            .field(path)
            .matching(Self::pattern(ordinal, values))
    }

    fn multi_field_predicate(
        &self,
        factory: &PredicateFactory<'_>,
        paths: &[&str],
        ordinal: usize,
        values: &TestValues,
    ) -> Option<Result<Predicate, SearchError>> {
        Some(
            factory
                .wildcard()
                .fields(paths.iter().copied())
                .matching(Self::pattern(ordinal, values)),
        )
    }

    fn parameterized_predicate(
        &self,
        factory: &PredicateFactory<'_>,
        path: &str,
        param: &str,
    ) -> Option<Result<Predicate, SearchError>> {
        Some(factory.wildcard().field(path).matching_param(param))
    }

    fn parameter_value(&self, ordinal: usize, values: &TestValues) -> Value {
        Value::Text(Self::pattern(ordinal, values))
    }

    fn null_argument(
        &self,
        factory: &PredicateFactory<'_>,
        path: &str,
    ) -> Option<Result<Predicate, SearchError>> {
        Some(factory.wildcard().field(path).matching(Value::Null))
    }
}

///
/// RegexpScenario
///

#[derive(Clone, Copy, Debug, Default)]
pub struct RegexpScenario;

impl RegexpScenario {
    fn pattern(ordinal: usize, values: &TestValues) -> String {
        format!("{}.*", prefix(values.matching(ordinal)))
    }
}

impl PredicateScenario for RegexpScenario {
    fn kind(&self) -> &'static str {
        "regexp"
    }

    fn required_trait(&self) -> SearchTrait {
        SearchTrait::Regexp
    }

    fn predicate(
        &self,
        factory: &PredicateFactory<'_>,
        path: &str,
        ordinal: usize,
        values: &TestValues,
    ) -> Result<Predicate, SearchError> {
        factory
            .regexp()
            .field(path)
            .matching(Self::pattern(ordinal, values))
    }

    fn multi_field_predicate(
        &self,
        factory: &PredicateFactory<'_>,
        paths: &[&str],
        ordinal: usize,
        values: &TestValues,
    ) -> Option<Result<Predicate, SearchError>> {
        Some(
            factory
                .regexp()
                .fields(paths.iter().copied())
                .matching(Self::pattern(ordinal, values)),
        )
    }

    fn parameterized_predicate(
        &self,
        factory: &PredicateFactory<'_>,
        path: &str,
        param: &str,
    ) -> Option<Result<Predicate, SearchError>> {
        Some(factory.regexp().field(path).matching_param(param))
    }

    fn parameter_value(&self, ordinal: usize, values: &TestValues) -> Value {
        Value::Text(Self::pattern(ordinal, values))
    }

    fn null_argument(
        &self,
        factory: &PredicateFactory<'_>,
        path: &str,
    ) -> Option<Result<Predicate, SearchError>> {
        Some(factory.regexp().field(path).matching(Value::Null))
    }
}

///
/// SimpleQueryStringScenario
///
/// A quoted phrase of the matching argument.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct SimpleQueryStringScenario;

impl SimpleQueryStringScenario {
    fn query(ordinal: usize, values: &TestValues) -> String {
        format!("\"{}\"", values.matching(ordinal))
    }
}

impl PredicateScenario for SimpleQueryStringScenario {
    fn kind(&self) -> &'static str {
        "simple-query-string"
    }

    fn required_trait(&self) -> SearchTrait {
        SearchTrait::SimpleQueryString
    }

    fn predicate(
        &self,
        factory: &PredicateFactory<'_>,
        path: &str,
        ordinal: usize,
        values: &TestValues,
    ) -> Result<Predicate, SearchError> {
        factory
            .simple_query_string()
            .field(path)
            .matching(Self::query(ordinal, values))
    }

    fn multi_field_predicate(
        &self,
        factory: &PredicateFactory<'_>,
        paths: &[&str],
        ordinal: usize,
        values: &TestValues,
    ) -> Option<Result<Predicate, SearchError>> {
        Some(
            factory
                .simple_query_string()
                .fields(paths.iter().copied())
                .matching(Self::query(ordinal, values)),
        )
    }

    fn parameterized_predicate(
        &self,
        factory: &PredicateFactory<'_>,
        path: &str,
        param: &str,
    ) -> Option<Result<Predicate, SearchError>> {
        Some(factory.simple_query_string().field(path).matching_param(param))
    }

    fn parameter_value(&self, ordinal: usize, values: &TestValues) -> Value {
        Value::Text(Self::query(ordinal, values))
    }

    fn null_argument(
        &self,
        factory: &PredicateFactory<'_>,
        path: &str,
    ) -> Option<Result<Predicate, SearchError>> {
        Some(factory.simple_query_string().field(path).matching(Value::Null))
    }
}
