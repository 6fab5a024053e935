//! Shared fixtures for the supervisor's integration tests: a scriptable
//! process backend, a sink that records what it was told and builders for
//! requests and download options.

pub mod builders;
pub mod fake_backend;
pub mod recording_sink;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};
use ytdlp_supervisor::logging::LOG_ENV;

/// Upper bound for any single awaited step in a test.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

static INIT: Once = Once::new();

/// Install a test-writer subscriber once per test binary.
///
/// Output is captured per test and only shown for failures. The filter comes
/// from `YTDLP_SUPERVISOR_LOG` (same variable as the binary), e.g.
/// `YTDLP_SUPERVISOR_LOG=ytdlp_supervisor=debug cargo test`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = std::env::var(LOG_ENV)
            .ok()
            .and_then(|v| EnvFilter::try_new(v).ok())
            .unwrap_or_else(|| EnvFilter::new("ytdlp_supervisor=debug"));

        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}

/// Await `f`, failing the test after [`TEST_TIMEOUT`].
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    tokio::time::timeout(TEST_TIMEOUT, f)
        .await
        .expect("test step timed out")
}

/// Poll `check` every few milliseconds until it returns true, failing the
/// test after [`TEST_TIMEOUT`].
pub async fn eventually<F>(mut check: F)
where
    F: FnMut() -> bool,
{
    with_timeout(async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
}
