//! Predicate TCK: conformance kit for search-predicate backends.
//!
//! This is the public meta-crate. Backend authors depend on **tck** only.
//!
//! It re-exports:
//!   - `tck-core`   (value and schema model, predicate DSL, harness)
//!   - `tck-memory` (reference in-memory backend, `memory` feature)

pub use tck_core as core;
#[cfg(feature = "memory")]
pub use tck_memory as memory;

mod suite;

pub use suite::{Suite, SuiteReport};

//
// Prelude
//

pub mod prelude {
    pub use crate::{Suite, SuiteReport};
    pub use tck_core::prelude::*;
}
