pub mod config_cmd;
pub mod doctor;
pub mod lessons;
pub mod models;
pub mod preview;
pub mod serve;

use lectern_config::{AppConfig, ConfigError};
use std::path::Path;

/// Load configuration from an explicit path, or the default location.
/// Environment overrides apply either way.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    match path {
        Some(path) => {
            let mut config = AppConfig::load_from(path)?;
            config.apply_env_overrides(|key| std::env::var(key).ok())?;
            config.validate()?;
            Ok(config)
        }
        None => AppConfig::load(),
    }
}

/// USD amount with enough precision for per-token prices.
pub fn format_usd(amount: f64) -> String {
    if amount == 0.0 {
        "$0".to_string()
    } else if amount < 0.01 {
        format!("${amount:.6}")
    } else {
        format!("${amount:.2}")
    }
}
