//! Command handlers -- one module per subcommand

pub mod list;
pub mod run;

use std::path::Path;
use std::time::Duration;

use packmatrix_core::config::PackmatrixConfig;

use crate::cli::DEFAULT_CONFIG;
use crate::error::CliError;

/// Load the effective configuration.
///
/// An explicit path must exist. Without one, `packmatrix.toml` is loaded if
/// present, otherwise defaults plus environment overrides are used.
pub async fn load_config(path: Option<&Path>) -> Result<PackmatrixConfig, CliError> {
    let config = match path {
        Some(path) => PackmatrixConfig::load(path).await?,
        None if Path::new(DEFAULT_CONFIG).is_file() => PackmatrixConfig::load(DEFAULT_CONFIG).await?,
        None => PackmatrixConfig::from_env()?,
    };
    Ok(config)
}

/// `850ms`, `12.3s`
pub(crate) fn format_elapsed(elapsed: Duration) -> String {
    if elapsed < Duration::from_secs(1) {
        format!("{}ms", elapsed.as_millis())
    } else {
        format!("{:.1}s", elapsed.as_secs_f64())
    }
}
