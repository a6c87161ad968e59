use super::*;
use std::sync::Arc;
use tck_core::{
    document::{Document, DocumentObject},
    error::ErrorClass,
    predicate::{BooleanOperator, PredicateFactory},
    schema::{FieldOptions, IndexSchema, IndexSchemaBuilder, ObjectStructure, standard_traits},
    scope::ScopeModel,
    types::{ANALYZED_STRING, GEO_POINT, INTEGER, KEYWORD, NORMALIZED_STRING, VECTOR},
    value::GeoPoint,
};

fn schema() -> Arc<IndexSchema> {
    let mut builder = IndexSchemaBuilder::new("main");
    builder
        .field("title", &ANALYZED_STRING, FieldOptions::new())
        .field("name", &NORMALIZED_STRING, FieldOptions::new())
        .field("rank", &INTEGER, FieldOptions::new())
        .field("embedding", &VECTOR, FieldOptions::new())
        .field("location", &GEO_POINT, FieldOptions::new());
    builder
        .object_field("authors", ObjectStructure::Nested, true)
        .field("first", &KEYWORD, FieldOptions::new())
        .field("last", &KEYWORD, FieldOptions::new());
    builder
        .object_field("tags", ObjectStructure::Flattened, true)
        .field("first", &KEYWORD, FieldOptions::new())
        .field("last", &KEYWORD, FieldOptions::new());

    Arc::new(IndexSchema::realize(builder, standard_traits).expect("schema should realize"))
}

fn person(object: &mut DocumentObject, first: &str, last: &str) {
    object.add_value("first", first).add_value("last", last);
}

fn documents(schema: &IndexSchema) -> Vec<IndexedDocument> {
    let mut first = Document::new("1");
    let root = first.root_mut();
    root.add_value("title", "The Quick brown Fox")
        .add_value("name", "Irving")
        .add_value("rank", 3)
        .add_value("embedding", vec![1.0_f32, 0.0, 0.0])
        .add_value("location", GeoPoint::new(40.0, -71.0));
    person(root.add_object("authors"), "John", "Woolf");
    person(root.add_object("authors"), "Virginia", "Irving");
    person(root.add_object("tags"), "John", "Woolf");
    person(root.add_object("tags"), "Virginia", "Irving");

    let mut second = Document::new("2");
    let root = second.root_mut();
    root.add_value("title", "lazy dog")
        .add_value("name", "Kerouac")
        .add_value("rank", 5)
        .add_value("embedding", vec![0.0_f32, 1.0, 0.0])
        .add_value("location", GeoPoint::new(45.0, -60.0));
    person(root.add_object("authors"), "John", "Irving");

    let third = Document::new("3");

    [first, second, third]
        .into_iter()
        .map(|doc| IndexedDocument::index(schema, doc).expect("document should index"))
        .collect()
}

fn search(
    predicate: &Predicate,
    params: &QueryParams,
    documents: &[IndexedDocument],
) -> Result<Vec<(String, f32)>, SearchError> {
    let mut program = Program::compile(predicate, params)?;
    let candidates = documents
        .iter()
        .map(|document| Candidate {
            index: "main",
            document,
        })
        .collect::<Vec<_>>();
    program.prepare(&candidates);

    Ok(candidates
        .iter()
        .filter_map(|c| program.score(c).map(|score| (c.document.id.clone(), score)))
        .collect())
}

fn ids(hits: &[(String, f32)]) -> Vec<&str> {
    hits.iter().map(|(id, _)| id.as_str()).collect()
}

fn fixture() -> (ScopeModel, Vec<IndexedDocument>) {
    let schema = schema();
    let docs = documents(&schema);

    (ScopeModel::new(vec![schema]).expect("scope"), docs)
}

#[test]
fn nested_clauses_share_one_instance_flattened_do_not() {
    let (scope, docs) = fixture();
    let f = PredicateFactory::new(&scope);
    let clause = |path: &str, value: &str| f.match_field(path).matching(value).expect("match");

    let nested = f
        .nested("authors")
        .add(clause("authors.first", "John"))
        .add(clause("authors.last", "Irving"))
        .build()
        .expect("nested");
    let hits = search(&nested, &QueryParams::new(), &docs).expect("search");
    assert_eq!(ids(&hits), vec!["2"]);

    let flattened = f.and([clause("tags.first", "John"), clause("tags.last", "Irving")]);
    let hits = search(&flattened, &QueryParams::new(), &docs).expect("search");
    assert_eq!(ids(&hits), vec!["1"]);
}

#[test]
fn analyzed_and_normalized_text() {
    let (scope, docs) = fixture();
    let f = PredicateFactory::new(&scope);
    let params = QueryParams::new();

    let matched = f.match_field("title").matching("FOX").expect("match");
    assert_eq!(ids(&search(&matched, &params, &docs).expect("search")), vec!["1"]);

    let wildcard = f.wildcard().field("name").matching("KER*").expect("wildcard");
    assert_eq!(ids(&search(&wildcard, &params, &docs).expect("search")), vec!["2"]);

    let phrase = f.phrase().field("title").slop(1).matching("quick fox").expect("phrase");
    assert_eq!(ids(&search(&phrase, &params, &docs).expect("search")), vec!["1"]);
    let strict = f.phrase().field("title").matching("quick fox").expect("phrase");
    assert!(search(&strict, &params, &docs).expect("search").is_empty());

    let sqs = f
        .simple_query_string()
        .field("title")
        .matching("dog -\"brown fox\"")
        .expect("sqs");
    assert_eq!(ids(&search(&sqs, &params, &docs).expect("search")), vec!["2"]);
}

#[test]
fn negation_matches_documents_without_the_field() {
    let (scope, docs) = fixture();
    let f = PredicateFactory::new(&scope);
    let not = f.not(f.match_field("rank").matching(3).expect("match"));

    let hits = search(&not, &QueryParams::new(), &docs).expect("search");
    assert_eq!(ids(&hits), vec!["2", "3"]);
}

#[test]
fn missing_parameters_fail_before_evaluation() {
    let (scope, _) = fixture();
    let f = PredicateFactory::new(&scope);
    let predicate = f.match_field("rank").matching_param("value").expect("match");

    let err = search(&predicate, &QueryParams::new(), &[]).expect_err("missing parameter");
    assert_eq!(err.class, ErrorClass::Query);
    assert!(err.message.contains("value"));

    let mut params = QueryParams::new();
    params.insert("value".into(), Value::Int(5));
    let (_, docs) = fixture();
    assert_eq!(ids(&search(&predicate, &params, &docs).expect("search")), vec!["2"]);
}

#[test]
fn invalid_regexp_is_a_query_error() {
    let (scope, docs) = fixture();
    let f = PredicateFactory::new(&scope);
    let predicate = f.regexp().field("name").matching("(unclosed").expect("regexp");

    let err = search(&predicate, &QueryParams::new(), &docs).expect_err("invalid pattern");
    assert_eq!(err.class, ErrorClass::Query);
}

#[test]
fn boost_and_constant_score_modifiers() {
    let (scope, docs) = fixture();
    let f = PredicateFactory::new(&scope);
    let rank = |value: i32| f.match_field("rank").matching(value).expect("match");

    let predicate = f.or([rank(3), rank(5).boost(4.0)]);
    let hits = search(&predicate, &QueryParams::new(), &docs).expect("search");
    assert_eq!(hits, vec![("1".to_string(), 1.0), ("2".to_string(), 4.0)]);

    let boosted_first = f.match_field("title").matching("quick fox").expect("match").boost(3.0);
    let constant = boosted_first.constant_score();
    let hits = search(&constant, &QueryParams::new(), &docs).expect("search");
    assert_eq!(hits, vec![("1".to_string(), 3.0)]);
}

#[test]
fn knn_selects_top_k_among_filtered_candidates() {
    let (scope, docs) = fixture();
    let f = PredicateFactory::new(&scope);

    let nearest = f.knn(1).field("embedding").matching(vec![0.9_f32, 0.1, 0.0]).expect("knn");
    assert_eq!(ids(&search(&nearest, &QueryParams::new(), &docs).expect("search")), vec!["1"]);

    let filtered = f
        .knn(1)
        .field("embedding")
        .filter(f.match_field("rank").matching(5).expect("filter"))
        .matching(vec![0.9_f32, 0.1, 0.0])
        .expect("knn");
    let hits = search(&filtered, &QueryParams::new(), &docs).expect("search");
    assert_eq!(ids(&hits), vec!["2"]);
    assert!(hits[0].1 < 1.0);
}

#[test]
fn object_exists_ignores_empty_instances() {
    let schema = schema();
    let mut doc = Document::new("empty-authors");
    doc.root_mut().add_object("authors");
    let docs = vec![IndexedDocument::index(&schema, doc).expect("index")];
    let scope = ScopeModel::new(vec![schema]).expect("scope");
    let f = PredicateFactory::new(&scope);

    let exists = f.exists("authors").build().expect("exists");
    assert!(search(&exists, &QueryParams::new(), &docs).expect("search").is_empty());
}

#[test]
fn field_boost_scales_only_that_field() {
    let (scope, docs) = fixture();
    let f = PredicateFactory::new(&scope);

    let predicate = f
        .match_field("title")
        .field_with_boost("name", 3.0)
        .matching("irving")
        .expect("match");
    let hits = search(&predicate, &QueryParams::new(), &docs).expect("search");

    assert_eq!(hits, vec![("1".to_string(), 3.0)]);
}

#[test]
fn terms_matching_all_requires_every_value() {
    let (scope, docs) = fixture();
    let f = PredicateFactory::new(&scope);
    let params = QueryParams::new();
    let terms = || f.terms().field("tags.first");

    let all = terms().matching_all(["John", "Virginia"]).expect("terms");
    assert_eq!(ids(&search(&all, &params, &docs).expect("search")), vec!["1"]);

    let partial = terms().matching_all(["John", "Nobody"]).expect("terms");
    assert!(search(&partial, &params, &docs).expect("search").is_empty());

    let any = terms().matching_any(["John", "Nobody"]).expect("terms");
    assert_eq!(ids(&search(&any, &params, &docs).expect("search")), vec!["1"]);
}

#[test]
fn minimum_should_match_counts_satisfied_clauses() {
    let (scope, docs) = fixture();
    let f = PredicateFactory::new(&scope);
    let params = QueryParams::new();
    let rank = |value: i32| f.match_field("rank").matching(value).expect("match");
    let title = f.match_field("title").matching("fox").expect("match");

    let one = f.bool().should(rank(3)).should(rank(5)).minimum_should_match(1).build();
    assert_eq!(ids(&search(&one, &params, &docs).expect("search")), vec!["1", "2"]);

    let two = f.bool().should(rank(3)).should(title).minimum_should_match(2).build();
    assert_eq!(ids(&search(&two, &params, &docs).expect("search")), vec!["1"]);

    let unsatisfiable = f.bool().should(rank(3)).should(rank(5)).minimum_should_match(3).build();
    assert!(search(&unsatisfiable, &params, &docs).expect("search").is_empty());
}

#[test]
fn simple_query_string_default_operator() {
    let (scope, docs) = fixture();
    let f = PredicateFactory::new(&scope);
    let params = QueryParams::new();
    let sqs = |operator| {
        f.simple_query_string()
            .field("title")
            .default_operator(operator)
            .matching("quick dog")
            .expect("sqs")
    };

    let either = sqs(BooleanOperator::Or);
    assert_eq!(ids(&search(&either, &params, &docs).expect("search")), vec!["1", "2"]);

    let both = sqs(BooleanOperator::And);
    assert!(search(&both, &params, &docs).expect("search").is_empty());
}

#[test]
fn polygon_contains_only_enclosed_points() {
    let (scope, docs) = fixture();
    let f = PredicateFactory::new(&scope);
    let square = [(39.0, -72.0), (41.0, -72.0), (41.0, -70.0), (39.0, -70.0)]
        .map(|(lat, lon)| GeoPoint::new(lat, lon));

    let predicate = f
        .spatial()
        .within()
        .field("location")
        .polygon(square)
        .expect("polygon");
    let hits = search(&predicate, &QueryParams::new(), &docs).expect("search");

    assert_eq!(ids(&hits), vec!["1"]);
}
