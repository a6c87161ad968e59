use crate::{
    error::SearchError,
    matrix::PredicateScenario,
    predicate::{Predicate, PredicateFactory, ValueConvert},
    schema::SearchTrait,
    types::{FieldTypeDescriptor, TestValues},
    value::Value,
};

///
/// MatchScenario
///

#[derive(Clone, Copy, Debug, Default)]
pub struct MatchScenario;

impl PredicateScenario for MatchScenario {
    fn kind(&self) -> &'static str {
        "match"
    }

    fn required_trait(&self) -> SearchTrait {
        SearchTrait::Match
    }

    fn predicate(
        &self,
        factory: &PredicateFactory<'_>,
        path: &str,
        ordinal: usize,
        values: &TestValues,
    ) -> Result<Predicate, SearchError> {
        factory
            .match_field(path)
            .matching(values.matching(ordinal).clone())
    }

    fn raw_predicate(
        &self,
        factory: &PredicateFactory<'_>,
        path: &str,
        ordinal: usize,
        values: &TestValues,
    ) -> Result<Predicate, SearchError> {
        factory
            .match_field(path)
            .convert(ValueConvert::No)
            .matching(values.matching(ordinal).clone())
    }

    fn multi_field_predicate(
        &self,
        factory: &PredicateFactory<'_>,
        paths: &[&str],
        ordinal: usize,
        values: &TestValues,
    ) -> Option<Result<Predicate, SearchError>> {
        let (first, rest) = paths.split_first()?;

        Some(
            factory
                .match_field(first)
                .fields(rest.iter().copied())
                .matching(values.matching(ordinal).clone()),
        )
    }

    fn parameterized_predicate(
        &self,
        factory: &PredicateFactory<'_>,
        path: &str,
        param: &str,
    ) -> Option<Result<Predicate, SearchError>> {
        Some(factory.match_field(path).matching_param(param))
    }

    fn null_argument(
        &self,
        factory: &PredicateFactory<'_>,
        path: &str,
    ) -> Option<Result<Predicate, SearchError>> {
        Some(factory.match_field(path).matching(Value::Null))
    }
}

///
/// RangeScenario
///
/// `between(v, v)`: a degenerate inclusive range selecting one value.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct RangeScenario;

impl PredicateScenario for RangeScenario {
    fn kind(&self) -> &'static str {
        "range"
    }

    fn required_trait(&self) -> SearchTrait {
        SearchTrait::Range
    }

    fn predicate(
        &self,
        factory: &PredicateFactory<'_>,
        path: &str,
        ordinal: usize,
        values: &TestValues,
    ) -> Result<Predicate, SearchError> {
        let value = values.matching(ordinal);

        factory.range().field(path).between(value.clone(), value.clone())
    }

    fn raw_predicate(
        &self,
        factory: &PredicateFactory<'_>,
        path: &str,
        ordinal: usize,
        values: &TestValues,
    ) -> Result<Predicate, SearchError> {
        let value = values.matching(ordinal);

        factory
            .range()
            .field(path)
            .convert(ValueConvert::No)
            .between(value.clone(), value.clone())
    }

    fn multi_field_predicate(
        &self,
        factory: &PredicateFactory<'_>,
        paths: &[&str],
        ordinal: usize,
        values: &TestValues,
    ) -> Option<Result<Predicate, SearchError>> {
        let value = values.matching(ordinal);

        Some(
            factory
                .range()
                .fields(paths.iter().copied())
                .between(value.clone(), value.clone()),
        )
    }

    fn parameterized_predicate(
        &self,
        factory: &PredicateFactory<'_>,
        path: &str,
        param: &str,
    ) -> Option<Result<Predicate, SearchError>> {
        Some(factory.range().field(path).between_params(param, param))
    }

    fn null_argument(
        &self,
        factory: &PredicateFactory<'_>,
        path: &str,
    ) -> Option<Result<Predicate, SearchError>> {
        Some(factory.range().field(path).between(Value::Null, Value::Null))
    }
}

///
/// TermsScenario
///

#[derive(Clone, Copy, Debug, Default)]
pub struct TermsScenario;

impl PredicateScenario for TermsScenario {
    fn kind(&self) -> &'static str {
        "terms"
    }

    fn required_trait(&self) -> SearchTrait {
        SearchTrait::Terms
    }

    fn predicate(
        &self,
        factory: &PredicateFactory<'_>,
        path: &str,
        ordinal: usize,
        values: &TestValues,
    ) -> Result<Predicate, SearchError> {
        factory
            .terms()
            .field(path)
            .matching_any([values.matching(ordinal).clone()])
    }

    fn raw_predicate(
        &self,
        factory: &PredicateFactory<'_>,
        path: &str,
        ordinal: usize,
        values: &TestValues,
    ) -> Result<Predicate, SearchError> {
        factory
            .terms()
            .field(path)
            .convert(ValueConvert::No)
            .matching_any([values.matching(ordinal).clone()])
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
                .terms()
                .fields(paths.iter().copied())
                .matching_any([values.matching(ordinal).clone()]),
        )
    }

    fn null_argument(
        &self,
        factory: &PredicateFactory<'_>,
        path: &str,
    ) -> Option<Result<Predicate, SearchError>> {
        Some(factory.terms().field(path).matching_any([Value::Null]))
    }
}

///
/// ExistsScenario
///
/// Datasets hold a single value: presence is all that is matched. On
/// object fields only populated instances count.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct ExistsScenario;

impl PredicateScenario for ExistsScenario {
    fn kind(&self) -> &'static str {
        "exists"
    }

    fn required_trait(&self) -> SearchTrait {
        SearchTrait::Exists
    }

    fn values(&self, field_type: &'static FieldTypeDescriptor) -> TestValues {
        let values = field_type.test_values();

        TestValues::new(vec![values.stored(0).clone()], vec![values.matching(0).clone()])
    }

    fn predicate(
        &self,
        factory: &PredicateFactory<'_>,
        path: &str,
        _ordinal: usize,
        _values: &TestValues,
    ) -> Result<Predicate, SearchError> {
        factory.exists(path).build()
    }

    fn object_predicate(
        &self,
        factory: &PredicateFactory<'_>,
        object_path: &str,
    ) -> Option<Result<Predicate, SearchError>> {
        Some(factory.exists(object_path).build())
    }
}
