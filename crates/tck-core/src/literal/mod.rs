//! Module: literal
//! Responsibility: hand-written indexes and documents with literal expected
//! hits and diagnostics, runnable against any backend.
//! Does not own: the generated predicate matrix (see `matrix`).

mod federation;
mod nesting;
mod queries;

pub use federation::{
    converter_divergence, federated_union, field_kind_divergence, missing_field_tolerated,
    partial_support, text_parsing_converter,
};
pub use nesting::{implicit_nesting, nested_instance_scoping, object_exists};
pub use queries::{
    decimal_scale_divergence, match_all_except, negated_match, phrase_slop, prefixed_identifiers,
};

use crate::{
    assert::{DocRef, assert_that},
    backend::{Backend, SearchQuery, SearchResult},
    document::Document,
    error::{ConformanceError, SearchError},
    matrix::MatrixReport,
    predicate::Predicate,
    schema::IndexSchemaBuilder,
    scope::ScopeModel,
    value::Value,
};
use tracing::debug;

/// Runs one literal fixture on a backend that has none of its indexes yet.
pub type LiteralCheck = fn(&dyn Backend) -> Result<MatrixReport, ConformanceError>;

///
/// LiteralFixture
///

#[derive(Clone, Copy, Debug)]
pub struct LiteralFixture {
    pub name: &'static str,
    pub run: LiteralCheck,
}

static STANDARD: [LiteralFixture; 14] = [
    fixture("negated match", negated_match),
    fixture("match all except", match_all_except),
    fixture("decimal scale divergence", decimal_scale_divergence),
    fixture("prefixed identifiers", prefixed_identifiers),
    fixture("phrase slop", phrase_slop),
    fixture("nested instance scoping", nested_instance_scoping),
    fixture("implicit nesting", implicit_nesting),
    fixture("object exists", object_exists),
    fixture("federated union", federated_union),
    fixture("missing field tolerated", missing_field_tolerated),
    fixture("converter divergence", converter_divergence),
    fixture("text parsing converter", text_parsing_converter),
    fixture("partial support", partial_support),
    fixture("field kind divergence", field_kind_divergence),
];

const fn fixture(name: &'static str, run: LiteralCheck) -> LiteralFixture {
    LiteralFixture { name, run }
}

/// Every shipped literal fixture, in run order. Index names never collide,
/// so all of them can share one backend.
#[must_use]
pub fn standard_fixtures() -> &'static [LiteralFixture] {
    &STANDARD
}

/// Documents `"1"`, `"2"`, ... holding one value each in `field`.
#[must_use]
pub fn numbered<V: Into<Value>>(field: &str, values: impl IntoIterator<Item = V>) -> Vec<Document> {
    values
        .into_iter()
        .enumerate()
        .map(|(i, value)| {
            let mut doc = Document::new((i + 1).to_string());
            doc.root_mut().add_value(field, value);
            doc
        })
        .collect()
}

///
/// LiteralRun
///
/// Bookkeeping of one fixture run: failure contexts and the check count.
///

struct LiteralRun<'b> {
    backend: &'b dyn Backend,
    report: MatrixReport,
}

impl<'b> LiteralRun<'b> {
    fn new(backend: &'b dyn Backend, name: &str) -> Self {
        Self {
            backend,
            report: MatrixReport::new(name),
        }
    }

    fn context(&self, check: &str) -> String {
        format!("literal / {} / {check}", self.report.scenario)
    }

    /// Create the index and make `documents` searchable.
    fn index(
        &self,
        builder: IndexSchemaBuilder,
        documents: impl IntoIterator<Item = Document>,
    ) -> Result<(), ConformanceError> {
        let context = self.context("setup");
        let fixture = |err| ConformanceError::fixture(&context, err);

        let name = self.backend.create_index(builder).map_err(fixture)?.name().to_string();
        let mut sink = self.backend.sink(&name).map_err(fixture)?;
        for document in documents {
            sink.add(document).map_err(fixture)?;
        }
        sink.join().map_err(fixture)?;
        debug!(fixture = %self.report.scenario, index = %name, "literal index ready");

        Ok(())
    }

    fn scope(&self, indexes: &[&str]) -> Result<ScopeModel, ConformanceError> {
        self.backend
            .scope(indexes)
            .map_err(|err| ConformanceError::fixture(self.context("scope"), err))
    }

    /// Build outcome of a predicate, executed over `scope`.
    fn execute(
        &self,
        scope: &ScopeModel,
        predicate: Result<Predicate, SearchError>,
    ) -> Result<SearchResult, SearchError> {
        self.backend.execute(scope, &SearchQuery::new(predicate?))
    }

    fn search(
        &self,
        check: &str,
        scope: &ScopeModel,
        predicate: Result<Predicate, SearchError>,
    ) -> Result<SearchResult, ConformanceError> {
        self.execute(scope, predicate)
            .map_err(|err| ConformanceError::unexpected(self.context(check), err))
    }

    /// The predicate returns exactly `ids` of `index`, in any order.
    fn expect_hits(
        &mut self,
        check: &str,
        scope: &ScopeModel,
        predicate: Result<Predicate, SearchError>,
        index: &str,
        ids: &[&str],
    ) -> Result<SearchResult, ConformanceError> {
        let result = self.search(check, scope, predicate)?;
        assert_that(self.context(check), &result)
            .has_hits_any_order(DocRef::all_in(index, ids.iter().copied()))?;
        self.report.checks += 1;

        Ok(result)
    }

    fn passed(&mut self) {
        self.report.checks += 1;
    }

    fn finish(self) -> MatrixReport {
        self.report
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn fixture_names_are_unique() {
        let names = standard_fixtures().iter().map(|f| f.name).collect::<BTreeSet<_>>();

        assert_eq!(names.len(), standard_fixtures().len());
    }

    #[test]
    fn numbered_documents_start_at_one() {
        let docs = numbered("n", [5, 6]);

        assert_eq!(docs.iter().map(|d| d.id.as_str()).collect::<Vec<_>>(), vec!["1", "2"]);
        assert_eq!(docs[1].root.values("n"), &[Value::Int(6)]);
    }
}
