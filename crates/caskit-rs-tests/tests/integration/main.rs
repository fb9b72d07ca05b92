//! Cross-module integration tests

use std::sync::Once;

use tracing_subscriber::EnvFilter;

mod config_loading;
mod service_url;

static TRACING: Once = Once::new();

/// Route library logs to the test harness; `RUST_LOG` controls verbosity
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}
