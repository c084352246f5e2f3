use tracing_subscriber::{EnvFilter, fmt};

use crate::neotass::dimensional::error::{EtlError, Result};

/// Installs the global subscriber. `RUST_LOG` wins over `default_level`
/// when set.
pub fn init(default_level: &str) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| EtlError::Logging(err.to_string()))
}

/// Routes log output through the test harness; repeated calls are no-ops.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
