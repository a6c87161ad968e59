//! Reference in-memory backend for the predicate TCK. Evaluation is
//! exhaustive and exact; it exists to exercise the kit, not to search.

mod analysis;
mod backend;
mod codec;
mod eval;
mod index;
mod sink;

pub use backend::MemoryBackend;
