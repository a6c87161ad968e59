//! Object-field semantics over a small library index: NESTED instances
//! scope their clauses, FLATTENED ones do not.

use super::LiteralRun;
use crate::{
    assert::{DocRef, assert_that, expect_error},
    backend::Backend,
    document::Document,
    error::{ConformanceError, ErrorClass, SearchError},
    matrix::MatrixReport,
    predicate::{Predicate, PredicateFactory},
    schema::{FieldOptions, IndexSchemaBuilder, ObjectStructure},
    scope::ScopeModel,
    types::KEYWORD,
};

fn author(doc: &mut Document, object: &str, first: &str, last: &str) {
    doc.root_mut()
        .add_object(object)
        .add_value("first", first)
        .add_value("last", last);
}

/// Index `name` with nested `authors`, flattened `credits` and nested
/// `shelves.books`. Document `mixed` spreads John Irving over two
/// instances, `exact` holds him in one and `hollow` has one empty author.
fn library(run: &LiteralRun<'_>, name: &str) -> Result<ScopeModel, ConformanceError> {
    let mut builder = IndexSchemaBuilder::new(name);
    for (object, structure) in [
        ("authors", ObjectStructure::Nested),
        ("credits", ObjectStructure::Flattened),
    ] {
        builder
            .object_field(object, structure, true)
            .field("first", &KEYWORD, FieldOptions::new())
            .field("last", &KEYWORD, FieldOptions::new());
    }
    builder
        .object_field("shelves", ObjectStructure::Nested, true)
        .object_field("books", ObjectStructure::Nested, true)
        .field("title", &KEYWORD, FieldOptions::new());

    let mut mixed = Document::new("mixed");
    for object in ["authors", "credits"] {
        author(&mut mixed, object, "John", "Woolf");
        author(&mut mixed, object, "Virginia", "Irving");
    }
    let mut exact = Document::new("exact");
    for object in ["authors", "credits"] {
        author(&mut exact, object, "John", "Irving");
    }
    let shelf = exact.root_mut().add_object("shelves");
    shelf.add_object("books").add_value("title", "Garp");
    shelf.add_object("books").add_value("title", "Owen");
    let mut hollow = Document::new("hollow");
    hollow.root_mut().add_object("authors");

    run.index(builder, [mixed, exact, hollow])?;
    run.scope(&[name])
}

fn john_irving(f: &PredicateFactory<'_>, object: &str) -> Result<Vec<Predicate>, SearchError> {
    [("first", "John"), ("last", "Irving")]
        .into_iter()
        .map(|(field, value)| f.match_field(&format!("{object}.{field}")).matching(value))
        .collect()
}

/// Clauses inside `nested(authors)` must hold in one instance; the same
/// clauses on flattened `credits` may hold across instances. Clauses on
/// fields outside the nested object are rejected at build time.
pub fn nested_instance_scoping(backend: &dyn Backend) -> Result<MatrixReport, ConformanceError> {
    const INDEX: &str = "literal_library_scoping";

    let mut run = LiteralRun::new(backend, "nested instance scoping");
    let scope = library(&run, INDEX)?;
    let f = PredicateFactory::new(&scope);

    let nested = john_irving(&f, "authors").and_then(|clauses| {
        clauses
            .into_iter()
            .fold(f.nested("authors"), |nested, clause| nested.add(clause))
            .build()
    });
    run.expect_hits("nested authors", &scope, nested, INDEX, &["exact"])?;

    let flattened = john_irving(&f, "credits").map(|clauses| f.and(clauses));
    run.expect_hits("flattened credits", &scope, flattened, INDEX, &["exact", "mixed"])?;

    let outside = f
        .match_field("credits.first")
        .matching("John")
        .and_then(|clause| f.nested("authors").add(clause).build());
    expect_error(run.context("clause outside"), outside, ErrorClass::Schema)?
        .message_contains("credits.first")?;
    run.passed();

    Ok(run.finish())
}

/// A clause on `shelves.books.title` is wrapped in both nested levels
/// implicitly and ranks exactly as the explicit wrappers do.
pub fn implicit_nesting(backend: &dyn Backend) -> Result<MatrixReport, ConformanceError> {
    const INDEX: &str = "literal_library_implicit";

    let mut run = LiteralRun::new(backend, "implicit nesting");
    let scope = library(&run, INDEX)?;
    let f = PredicateFactory::new(&scope);
    let title = || f.match_field("shelves.books.title").matching("Owen");

    let implicit = run.expect_hits("implicit", &scope, title(), INDEX, &["exact"])?;
    let expected = implicit.hits.iter().map(DocRef::of).collect::<Vec<_>>();

    let inner = title().and_then(|clause| f.nested("shelves.books").add(clause).build());
    let outer = inner
        .clone()
        .and_then(|inner| f.nested("shelves").add(inner).build());
    for (check, predicate) in [("explicit inner", inner), ("explicit outer", outer)] {
        let result = run.search(check, &scope, predicate)?;
        assert_that(run.context(check), &result).has_hits_exact_order(expected.clone())?;
        run.passed();
    }

    Ok(run.finish())
}

/// `exists` on an object field counts only populated instances.
pub fn object_exists(backend: &dyn Backend) -> Result<MatrixReport, ConformanceError> {
    const INDEX: &str = "literal_library_exists";

    let mut run = LiteralRun::new(backend, "object exists");
    let scope = library(&run, INDEX)?;
    let f = PredicateFactory::new(&scope);

    let authors = f.exists("authors").build();
    run.expect_hits("exists(authors)", &scope, authors, INDEX, &["exact", "mixed"])?;
    let books = f.exists("shelves.books").build();
    run.expect_hits("exists(shelves.books)", &scope, books, INDEX, &["exact"])?;

    Ok(run.finish())
}
