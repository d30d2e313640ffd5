//! Test support: logging setup and fixture files

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;

use tracing::info;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

static TEST_SETUP: Once = Once::new();

/// Install a global tracing subscriber once per test binary.
///
/// `RUST_LOG` wins; otherwise this crate logs at debug.
pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("dms_hierarchy=debug"));

        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .with_test_writer()
                .with_target(true)
                .with_span_events(FmtSpan::CLOSE)
                .with_filter(env_filter),
        );
        if tracing::dispatcher::has_been_set() {
            return;
        }
        if let Err(e) = subscriber.try_init() {
            eprintln!("Error: Failed to set up logging: {}", e);
        }
        info!("Test Setup complete (RUST_LOG={:?})", env::var("RUST_LOG").ok());
    });
}

/// Write `json` as `hierarchy.json` into `dir` and return its path.
pub fn write_fixture(dir: &Path, json: &str) -> PathBuf {
    let path = dir.join("hierarchy.json");
    fs::write(&path, json).unwrap_or_else(|e| panic!("write {}: {}", path.display(), e));
    path
}
