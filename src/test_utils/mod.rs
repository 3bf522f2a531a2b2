//! Test utilities for dekube-manager
//!
//! In-memory fakes of the network traits and registry fixtures, so the whole
//! pipeline can run in tests without touching GitHub.
//!
//! # Example
//!
//! ```rust,no_run
//! use dekube_manager::core::ArtifactKind;
//! use dekube_manager::test_utils::{FakeFetcher, FakeReleaseSource};
//!
//! let releases = FakeReleaseSource::default().with_release("org/keycloak", &["v0.1.0", "v0.2.0"]);
//! let fetcher = FakeFetcher::default()
//!     .with_artifact(ArtifactKind::Extension, "org/keycloak", "v0.2.0", "keycloak.py", "# kc");
//! ```

pub mod fakes;
pub mod fixtures;

pub use fakes::{FakeFetcher, FakeReleaseSource};
pub use fixtures::{RegistryFixture, registry_json, sample_distributions, sample_extensions};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` when given, otherwise
/// `RUST_LOG`; with neither, tests stay silent.
///
/// ```bash
/// RUST_LOG=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
