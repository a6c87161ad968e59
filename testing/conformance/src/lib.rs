//! Shared setup for the conformance tests: configuration, logging and a
//! runner for the literal fixtures of `tck::core::literal`.

use std::{path::Path, sync::Once};
use tck::{
    core::{config::ConfigError, literal::LiteralCheck},
    memory::MemoryBackend,
    prelude::*,
};
use tracing_subscriber::{EnvFilter, fmt};

static TRACING: Once = Once::new();

/// Install a test-writer subscriber once per test binary. `RUST_LOG`
/// controls verbosity; the default is `warn`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = fmt().with_env_filter(filter).with_test_writer().try_init();
    });
}

/// Settings from this crate's `tck.toml`.
pub fn config() -> Result<TckConfig, ConfigError> {
    TckConfig::load(Path::new(env!("CARGO_MANIFEST_DIR")).join("tck.toml"))
}

/// Run a literal fixture on a fresh reference backend.
pub fn run_literal(check: LiteralCheck) -> Result<MatrixReport, ConformanceError> {
    init_tracing();

    check(&MemoryBackend::new())
}
