//! Concrete queries over single hand-written indexes.

use super::{LiteralRun, numbered};
use crate::{
    assert::expect_error,
    backend::Backend,
    document::Document,
    error::{ConformanceError, ErrorClass},
    matrix::MatrixReport,
    predicate::{PredicateFactory, ValueConvert},
    schema::{FieldOptions, IndexSchemaBuilder, PrefixIdConverter},
    types::{ANALYZED_STRING, BIG_DECIMAL, INTEGER, KEYWORD},
};
use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use std::sync::Arc;

/// `not(match(field2, 3))` over five integer fields returns the other two
/// documents.
pub fn negated_match(backend: &dyn Backend) -> Result<MatrixReport, ConformanceError> {
    const INDEX: &str = "literal_negation";

    let mut run = LiteralRun::new(backend, "negated match");
    let mut builder = IndexSchemaBuilder::new(INDEX);
    for name in ["field1", "field2", "field3", "field4", "field5"] {
        builder.field(name, &INTEGER, FieldOptions::new());
    }
    run.index(builder, numbered("field2", [3, 13, 25]))?;

    let scope = run.scope(&[INDEX])?;
    let f = PredicateFactory::new(&scope);
    let predicate = f.match_field("field2").matching(3).map(|p| f.not(p));
    run.expect_hits("not(match(field2, 3))", &scope, predicate, INDEX, &["2", "3"])?;

    Ok(run.finish())
}

/// `match_all().except(match(string, "aaa"))` drops only the first document.
pub fn match_all_except(backend: &dyn Backend) -> Result<MatrixReport, ConformanceError> {
    const INDEX: &str = "literal_except";

    let mut run = LiteralRun::new(backend, "match all except");
    let mut builder = IndexSchemaBuilder::new(INDEX);
    builder.field("string", &KEYWORD, FieldOptions::new());
    run.index(builder, numbered("string", ["aaa", "bbb", "ccc"]))?;

    let scope = run.scope(&[INDEX])?;
    let f = PredicateFactory::new(&scope);
    let predicate = f
        .match_field("string")
        .matching("aaa")
        .map(|excluded| f.match_all().except(excluded));
    run.expect_hits("match_all().except(aaa)", &scope, predicate, INDEX, &["2", "3"])?;

    Ok(run.finish())
}

/// Two indexes encoding `amount` with scales 2 and 7 cannot share a decimal
/// argument; the diagnostic names both codecs, the field and both indexes.
pub fn decimal_scale_divergence(backend: &dyn Backend) -> Result<MatrixReport, ConformanceError> {
    const INDEXES: [&str; 2] = ["literal_scale_2", "literal_scale_7"];

    let mut run = LiteralRun::new(backend, "decimal scale divergence");
    for (name, scale) in INDEXES.into_iter().zip([2, 7]) {
        let mut builder = IndexSchemaBuilder::new(name);
        builder.field(
            "amount",
            &BIG_DECIMAL,
            FieldOptions::new().decimal_scale(scale),
        );
        run.index(builder, Vec::new())?;
    }

    let scope = run.scope(&INDEXES)?;
    let f = PredicateFactory::new(&scope);
    let amount = BigDecimal::new(BigInt::from(15), 1);
    let outcome = run.execute(&scope, f.match_field("amount").matching(amount));

    let context = run.context("match(amount, 1.5)");
    expect_error(context, outcome, ErrorClass::Inconsistency)?
        .message_contains("decimalScale=2")?
        .message_contains("decimalScale=7")?
        .context_field("amount")?
        .context_indexes_contain(INDEXES)?;
    run.passed();

    Ok(run.finish())
}

/// Identifier predicates go through the index's id converter unless
/// conversion is disabled.
pub fn prefixed_identifiers(backend: &dyn Backend) -> Result<MatrixReport, ConformanceError> {
    const INDEX: &str = "literal_ids";

    let mut run = LiteralRun::new(backend, "prefixed identifiers");
    let mut builder = IndexSchemaBuilder::new(INDEX);
    builder.id_converter(Arc::new(PrefixIdConverter::new("document")));
    run.index(builder, ["document1", "document2", "document3"].map(Document::new))?;

    let scope = run.scope(&[INDEX])?;
    let f = PredicateFactory::new(&scope);
    let converted = f.id().matching(1).matching(3).build();
    run.expect_hits("id(1, 3)", &scope, converted, INDEX, &["document1", "document3"])?;

    let raw = f
        .id()
        .convert(ValueConvert::No)
        .matching("document2")
        .build();
    run.expect_hits("raw id", &scope, raw, INDEX, &["document2"])?;

    Ok(run.finish())
}

/// Slop bounds how many positions the phrase tokens may move apart.
pub fn phrase_slop(backend: &dyn Backend) -> Result<MatrixReport, ConformanceError> {
    const INDEX: &str = "literal_phrases";
    const TEXTS: [&str; 5] = [
        "quick fox",
        "quick red fox",
        "quick red lazy fox",
        "quick red lazy old fox",
        "quick red lazy old sly fox",
    ];

    let mut run = LiteralRun::new(backend, "phrase slop");
    let mut builder = IndexSchemaBuilder::new(INDEX);
    builder.field("text", &ANALYZED_STRING, FieldOptions::new());
    run.index(builder, numbered("text", TEXTS))?;

    let scope = run.scope(&[INDEX])?;
    let f = PredicateFactory::new(&scope);
    for (slop, ids) in [
        (0, &["1"][..]),
        (2, &["1", "2", "3"][..]),
        (3, &["1", "2", "3", "4"][..]),
    ] {
        let phrase = f.phrase().field("text").slop(slop).matching("quick fox");
        run.expect_hits(&format!("slop {slop}"), &scope, phrase, INDEX, ids)?;
    }

    Ok(run.finish())
}
