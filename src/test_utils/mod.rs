//! Test utilities.
//!
//! - [`init_test_logging`] - route `tracing` output through the test harness
//! - [`GemSourceFixture`] - temporary gem source trees
//!
//! # Example
//!
//! ```rust,no_run
//! use rubygems_import::test_utils::{GemSourceFixture, init_test_logging};
//!
//! init_test_logging(None);
//! let fixture = GemSourceFixture::new().unwrap();
//! fixture.gemspec("foo", "1.2", &[]).unwrap();
//! ```

pub mod fixtures;

pub use fixtures::GemSourceFixture;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

static INIT_LOGGING: Once = Once::new();

/// Installs a test-harness subscriber once per test binary.
///
/// With `Some(level)` that level is used; otherwise `RUST_LOG` is honored, and
/// without it nothing is installed so test output stays quiet.
///
/// ```bash
/// RUST_LOG=rubygems_import=trace cargo test interceptor
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
            .try_init();
    });
}
