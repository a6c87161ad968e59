//! Federated scopes over hand-written indexes sharing the `number` field:
//! merged results and the diagnostics raised when the indexes disagree.

use super::{LiteralRun, numbered};
use crate::{
    assert::{DocRef, expect_error},
    backend::Backend,
    compat::{CompatibilityExpectation, CompatibilityVerifier},
    error::{ConformanceError, ErrorClass, SearchError},
    matrix::MatrixReport,
    predicate::{Predicate, PredicateFactory, ValueConvert},
    schema::{FieldOptions, IndexSchemaBuilder, ObjectStructure, TextParsingConverter},
    types::{INTEGER, KEYWORD},
    value::Value,
};
use std::sync::Arc;

/// Index `name` declaring `number` with `options`, holding documents `"1"`
/// to `"3"` with numbers 5, 6 and 7.
fn numbers(
    run: &LiteralRun<'_>,
    name: &str,
    options: FieldOptions,
) -> Result<(), ConformanceError> {
    let mut builder = IndexSchemaBuilder::new(name);
    builder.field("number", &INTEGER, options);

    run.index(builder, numbered("number", [5, 6, 7]))
}

fn converted(run: &LiteralRun<'_>, name: &str) -> Result<(), ConformanceError> {
    let options = FieldOptions::new().dsl_converter(Arc::new(TextParsingConverter));

    numbers(run, name, options)
}

fn number(f: &PredicateFactory<'_>, value: impl Into<Value>) -> Result<Predicate, SearchError> {
    f.match_field("number").matching(value)
}

/// Compatible indexes merge their hits, each attributed to its own index.
pub fn federated_union(backend: &dyn Backend) -> Result<MatrixReport, ConformanceError> {
    const INDEXES: [&str; 2] = ["literal_union_a", "literal_union_b"];

    let mut run = LiteralRun::new(backend, "federated union");
    for name in INDEXES {
        numbers(&run, name, FieldOptions::new())?;
    }

    CompatibilityVerifier::new(backend).expect_union(
        &run.context("match(number, 6)"),
        &INDEXES,
        |f| number(f, 6),
        INDEXES.map(|index| DocRef::new(index, "2")),
    )?;
    run.passed();

    Ok(run.finish())
}

/// An index without the field contributes nothing and raises nothing.
pub fn missing_field_tolerated(backend: &dyn Backend) -> Result<MatrixReport, ConformanceError> {
    const PLAIN: &str = "literal_sparse_plain";
    const SPARSE: &str = "literal_sparse_label";

    let mut run = LiteralRun::new(backend, "missing field tolerated");
    numbers(&run, PLAIN, FieldOptions::new())?;
    let mut sparse = IndexSchemaBuilder::new(SPARSE);
    sparse.field("label", &KEYWORD, FieldOptions::new());
    run.index(sparse, numbered("label", ["a", "b", "c"]))?;

    CompatibilityVerifier::new(backend).expect_missing_field_tolerated(
        &run.context("match(number, 7)"),
        &[PLAIN, SPARSE],
        |f| number(f, 7),
        PLAIN,
        &["3".to_string()],
    )?;
    run.passed();

    Ok(run.finish())
}

/// Diverging DSL converters fail a converted argument; raw arguments reach
/// both indexes alike.
pub fn converter_divergence(backend: &dyn Backend) -> Result<MatrixReport, ConformanceError> {
    const PLAIN: &str = "literal_converter_plain";
    const CONVERTED: &str = "literal_converter_text";

    let mut run = LiteralRun::new(backend, "converter divergence");
    numbers(&run, PLAIN, FieldOptions::new())?;
    converted(&run, CONVERTED)?;
    let verifier = CompatibilityVerifier::new(backend);

    verifier.expect_failure(
        &run.context("converted"),
        &[PLAIN, CONVERTED],
        |f| number(f, 5),
        &CompatibilityExpectation::new("number", "DSL converter differs"),
    )?;
    run.passed();

    verifier.expect_union(
        &run.context("raw"),
        &[PLAIN, CONVERTED],
        |f| {
            f.match_field("number")
                .convert(ValueConvert::No)
                .matching(5)
        },
        [DocRef::new(PLAIN, "1"), DocRef::new(CONVERTED, "1")],
    )?;
    run.passed();

    Ok(run.finish())
}

/// A text-parsing converter accepts text arguments and rejects the
/// field's own value type.
pub fn text_parsing_converter(backend: &dyn Backend) -> Result<MatrixReport, ConformanceError> {
    const INDEX: &str = "literal_text_parsing";

    let mut run = LiteralRun::new(backend, "text parsing converter");
    converted(&run, INDEX)?;
    let scope = run.scope(&[INDEX])?;
    let f = PredicateFactory::new(&scope);

    run.expect_hits("text argument", &scope, number(&f, " 6 "), INDEX, &["2"])?;

    expect_error(run.context("integer argument"), number(&f, 6), ErrorClass::Argument)?
        .message_contains("Expected a text argument")?;
    run.passed();

    Ok(run.finish())
}

/// A field searchable in only some indexes is an inconsistency.
pub fn partial_support(backend: &dyn Backend) -> Result<MatrixReport, ConformanceError> {
    const PLAIN: &str = "literal_support_plain";
    const UNSEARCHABLE: &str = "literal_support_unsearchable";

    let mut run = LiteralRun::new(backend, "partial support");
    numbers(&run, PLAIN, FieldOptions::new())?;
    numbers(&run, UNSEARCHABLE, FieldOptions::new().searchable(false))?;

    CompatibilityVerifier::new(backend).expect_failure(
        &run.context("match(number, 5)"),
        &[PLAIN, UNSEARCHABLE],
        |f| number(f, 5),
        &CompatibilityExpectation::new("number", "Inconsistent support for 'predicate:match'"),
    )?;
    run.passed();

    Ok(run.finish())
}

/// A path that is a value field in one index and an object in another
/// cannot be targeted.
pub fn field_kind_divergence(backend: &dyn Backend) -> Result<MatrixReport, ConformanceError> {
    const PLAIN: &str = "literal_kind_value";
    const OBJECT: &str = "literal_kind_object";

    let mut run = LiteralRun::new(backend, "field kind divergence");
    numbers(&run, PLAIN, FieldOptions::new())?;
    let mut object = IndexSchemaBuilder::new(OBJECT);
    object
        .object_field("number", ObjectStructure::Nested, true)
        .field("value", &INTEGER, FieldOptions::new());
    run.index(object, Vec::new())?;

    CompatibilityVerifier::new(backend).expect_failure(
        &run.context("match(number, 5)"),
        &[PLAIN, OBJECT],
        |f| number(f, 5),
        &CompatibilityExpectation::new("number", "Field kind differs"),
    )?;
    run.passed();

    Ok(run.finish())
}
