use super::*;
use crate::{
    error::{ErrorClass, SearchError},
    schema::{
        FieldOptions, IndexSchema, IndexSchemaBuilder, ObjectStructure, PrefixIdConverter,
        standard_traits,
    },
    scope::ScopeModel,
    types::{GEO_POINT, INTEGER, KEYWORD, VECTOR},
    value::{GeoPoint, Value},
};
use std::sync::Arc;

///
/// AuthorNamed
///
/// `author(name)` matches the keyword field of the scope it is attached to.
///

#[derive(Debug)]
struct AuthorNamed;

impl NamedPredicateDefinition for AuthorNamed {
    fn create(&self, context: &NamedPredicateContext<'_>) -> Result<Predicate, SearchError> {
        let name = context.param("name")?.clone();

        context.factory().match_field("keyword_field").matching(name)
    }
}

fn scope() -> ScopeModel {
    let mut builder = IndexSchemaBuilder::new("main");
    builder
        .field("integer_field", &INTEGER, FieldOptions::new())
        .field("keyword_field", &KEYWORD, FieldOptions::new())
        .field("geo_point_field", &GEO_POINT, FieldOptions::new())
        .field("vector_field", &VECTOR, FieldOptions::new());
    builder.id_converter(Arc::new(PrefixIdConverter::new("document")));
    let nested = builder.object_field("nested", ObjectStructure::Nested, true);
    nested
        .field("keyword_field", &KEYWORD, FieldOptions::new())
        .named_predicate("author", Arc::new(AuthorNamed));
    nested
        .object_field("nested", ObjectStructure::Nested, true)
        .field("keyword_field", &KEYWORD, FieldOptions::new());
    builder
        .object_field("flattened", ObjectStructure::Flattened, true)
        .field("keyword_field", &KEYWORD, FieldOptions::new());

    let schema = IndexSchema::realize(builder, standard_traits).expect("schema should realize");
    ScopeModel::new(vec![Arc::new(schema)]).expect("scope")
}

fn nested_paths(predicate: &Predicate) -> Vec<(String, bool)> {
    let mut out = Vec::new();
    let mut current = predicate;
    while let PredicateKind::Nested {
        path,
        implicit,
        inner,
    } = &current.kind
    {
        out.push((path.clone(), *implicit));
        current = inner.as_ref();
    }
    out
}

#[test]
fn null_value_is_an_argument_error() {
    let scope = scope();
    let f = PredicateFactory::new(&scope);

    let err = f
        .match_field("integer_field")
        .matching(Option::<i32>::None)
        .expect_err("null value");

    assert!(err.is(ErrorClass::Argument));
    assert!(err.message.contains("must not be null"));
}

#[test]
fn unsupported_trait_names_field_and_trait() {
    let scope = scope();
    let f = PredicateFactory::new(&scope);

    let err = f
        .match_field("geo_point_field")
        .matching(GeoPoint::new(1.0, 2.0))
        .expect_err("match on geo point");

    assert!(err.is(ErrorClass::Schema));
    assert!(err.message.contains("geo_point_field"));
    assert!(err.message.contains("predicate:match"));
}

#[test]
fn wrong_value_type_is_rejected() {
    let scope = scope();
    let f = PredicateFactory::new(&scope);

    let err = f
        .match_field("integer_field")
        .matching("three")
        .expect_err("text against integer");

    assert!(err.is(ErrorClass::Argument));
}

#[test]
fn fields_inside_nested_objects_are_wrapped_implicitly() {
    let scope = scope();
    let f = PredicateFactory::new(&scope);

    let predicate = f
        .match_field("nested.nested.keyword_field")
        .matching("x")
        .expect("predicate");

    assert_eq!(
        nested_paths(&predicate),
        vec![
            ("nested".to_string(), true),
            ("nested.nested".to_string(), true)
        ]
    );
}

#[test]
fn flattened_fields_are_not_wrapped() {
    let scope = scope();
    let f = PredicateFactory::new(&scope);

    let predicate = f
        .match_field("flattened.keyword_field")
        .matching("x")
        .expect("predicate");

    assert!(nested_paths(&predicate).is_empty());
}

#[test]
fn explicit_nested_replaces_the_implicit_wrapper() {
    let scope = scope();
    let f = PredicateFactory::new(&scope);

    let inner = f
        .match_field("nested.nested.keyword_field")
        .matching("x")
        .expect("inner");
    let explicit = f.nested("nested.nested").add(inner).build().expect("nested");

    assert_eq!(
        nested_paths(&explicit),
        vec![
            ("nested".to_string(), true),
            ("nested.nested".to_string(), false)
        ]
    );
}

#[test]
fn nested_rejects_fields_outside_the_object() {
    let scope = scope();
    let f = PredicateFactory::new(&scope);

    let outside = f.match_field("keyword_field").matching("x").expect("inner");
    let err = f
        .nested("nested")
        .add(outside)
        .build()
        .expect_err("root field inside nested");

    assert!(err.is(ErrorClass::Schema));
}

#[test]
fn nested_on_flattened_object_is_unsupported() {
    let scope = scope();
    let f = PredicateFactory::new(&scope);

    let inner = f
        .match_field("flattened.keyword_field")
        .matching("x")
        .expect("inner");
    let err = f
        .nested("flattened")
        .add(inner)
        .build()
        .expect_err("flattened objects cannot be nested predicates");

    assert!(err.message.contains("predicate:nested"));
}

#[test]
fn fields_from_different_nested_objects_cannot_be_combined() {
    let scope = scope();
    let f = PredicateFactory::new(&scope);

    let err = f
        .match_field("keyword_field")
        .field("nested.keyword_field")
        .matching("x")
        .expect_err("different nested chains");

    assert!(err.is(ErrorClass::Schema));
}

#[test]
fn range_requires_one_bound() {
    let scope = scope();
    let f = PredicateFactory::new(&scope);

    let err = f
        .range()
        .field("integer_field")
        .between(Option::<i32>::None, Option::<i32>::None)
        .expect_err("open range");

    assert!(err.message.contains("at least one bound must not be null"));
    f.range()
        .field("integer_field")
        .between(Option::<i32>::None, 3)
        .expect("half-open range");
}

#[test]
fn empty_terms_are_rejected() {
    let scope = scope();
    let f = PredicateFactory::new(&scope);

    let err = f
        .terms()
        .field("keyword_field")
        .matching_any(Vec::<Value>::new())
        .expect_err("no terms");

    assert!(err.message.contains("'terms' must not be empty."));
}

#[test]
fn knn_requires_positive_k_and_matching_dimension() {
    let scope = scope();
    let f = PredicateFactory::new(&scope);

    let err = f
        .knn(0)
        .field("vector_field")
        .matching(vec![1.0_f32, 0.0, 0.0])
        .expect_err("k = 0");
    assert!(err.message.contains("must be strictly positive"));

    let err = f
        .knn(1)
        .field("vector_field")
        .matching(vec![1.0_f32, 0.0])
        .expect_err("wrong dimension");
    assert!(err.message.contains("expected dimension 3"));
}

#[test]
fn missing_query_parameter_is_a_query_error() {
    let scope = scope();
    let f = PredicateFactory::new(&scope);

    let predicate = f
        .match_field("integer_field")
        .matching_param("p")
        .expect("deferred argument");
    let PredicateKind::Match { fields, value } = &predicate.kind else {
        panic!("expected a match predicate");
    };

    let err = fields[0]
        .index_value(value, &QueryParams::new())
        .expect_err("no parameter bound");
    assert!(err.is(ErrorClass::Query));

    let params = QueryParams::from([("p".to_string(), Value::Int(3))]);
    assert_eq!(
        fields[0].index_value(value, &params).expect("bound"),
        Value::Int(3)
    );
}

#[test]
fn boost_and_constant_score_commute() {
    let scope = scope();
    let f = PredicateFactory::new(&scope);
    let p = || f.match_field("integer_field").matching(3).expect("predicate");

    let before = p().boost(39.0).constant_score();
    let after = p().constant_score().boost(39.0);

    assert_eq!(before.boost, after.boost);
    assert_eq!(before.constant_score, after.constant_score);
    assert_eq!(p().boost(2.0).boost(3.0).boost, Some(6.0));
}

#[test]
fn match_all_except_accumulates_exclusions() {
    let scope = scope();
    let f = PredicateFactory::new(&scope);

    let predicate = f
        .match_all()
        .except(f.match_field("keyword_field").matching("aaa").expect("p"));

    let PredicateKind::MatchAll { except } = &predicate.kind else {
        panic!("expected matchAll");
    };
    assert_eq!(except.len(), 1);
}

#[test]
fn named_predicate_resolves_paths_relative_to_its_object() {
    let scope = scope();
    let f = PredicateFactory::new(&scope);

    let predicate = f
        .named("nested.author")
        .param("name", "Irving")
        .build()
        .expect("named predicate");

    assert_eq!(predicate.paths(), vec!["nested.keyword_field"]);

    let err = f.named("nested.author").build().expect_err("missing parameter");
    assert!(err.message.contains("'name'"));
}

#[test]
fn unknown_named_predicate_is_unsupported_on_its_object() {
    let scope = scope();
    let f = PredicateFactory::new(&scope);

    let err = f.named("nested.nope").build().expect_err("no such predicate");

    assert!(err.is(ErrorClass::Schema));
    assert!(err.message.contains("predicate:named:nope"));
}

#[test]
fn id_predicate_validates_arguments() {
    let scope = scope();
    let f = PredicateFactory::new(&scope);

    f.id().matching(1).matching(3).build().expect("converted ids");

    let err = f.id().build().expect_err("no ids");
    assert!(err.message.contains("must not be empty"));

    let err = f
        .id()
        .matching(1)
        .convert(ValueConvert::No)
        .build()
        .expect_err("raw ids must be strings");
    assert!(err.is(ErrorClass::Argument));
}

#[test]
fn exists_on_object_fields_is_supported() {
    let scope = scope();
    let f = PredicateFactory::new(&scope);

    let predicate = f.exists("nested.nested").build().expect("exists on object");

    assert_eq!(nested_paths(&predicate), vec![("nested".to_string(), true)]);
}

#[test]
fn minimum_should_match_above_clause_count_is_kept() {
    let scope = scope();
    let f = PredicateFactory::new(&scope);

    let predicate = f.bool().should(f.match_all()).minimum_should_match(2).build();
    let PredicateKind::Bool(clauses) = &predicate.kind else {
        panic!("expected a bool predicate, got {predicate:?}");
    };

    assert_eq!(clauses.required_should(), 2);
}
