//! Core of the predicate TCK: the value and schema model, the predicate DSL,
//! backend contracts, fixture generation, and the verification protocols
//! (predicate matrix, literal fixtures, cross-index compatibility, result
//! assertions).
#![warn(unreachable_pub)]

pub mod assert;
pub mod backend;
pub mod binding;
pub mod compat;
pub mod config;
pub mod dataset;
pub mod document;
pub mod error;
pub mod literal;
pub mod matrix;
pub mod predicate;
pub mod schema;
pub mod scope;
pub mod types;
pub mod value;

///
/// CONSTANTS
///

/// Maximum depth of generated object-field binding trees.
///
/// The root sits at depth 0; nodes at `MAX_DEPTH` have no children.
pub const MAX_DEPTH: usize = 4;

///
/// Prelude
///
/// Vocabulary needed to write a scenario or a backend adapter.
///

pub mod prelude {
    pub use crate::{
        assert::{DocRef, ErrorAssertion, ResultAssertion, assert_that, expect_error},
        backend::{Backend, BackendFeatures, DocumentSink, SearchHit, SearchQuery, SearchResult},
        compat::{CompatibilityExpectation, CompatibilityVerifier},
        config::TckConfig,
        error::{ConformanceError, ErrorClass, SearchError},
        matrix::{MatrixReport, PredicateMatrixRunner, PredicateScenario},
        predicate::{Predicate, PredicateFactory, ValueConvert},
        schema::{FieldOptions, IndexSchemaBuilder, ObjectStructure, SearchTrait},
        scope::ScopeModel,
        types::FieldTypeDescriptor,
        value::{GeoPoint, Value},
    };
}
