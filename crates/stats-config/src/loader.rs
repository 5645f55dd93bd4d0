//! Configuration loader with layered sources.

use crate::{validation, AppConfig};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use stats_core::StatsError;
use std::path::Path;
use tracing::{debug, info};

/// Well-known variables and the keys they override, first match wins.
const ENV_OVERRIDES: &[(&str, &[&str])] = &[
    ("cache.host", &["CACHE_HOST", "REDIS_HOST"]),
    ("cache.port", &["CACHE_PORT", "REDIS_PORT"]),
    ("server.port", &["LISTEN_PORT", "PORT"]),
];

/// Configuration loader.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_dir: String,
}

impl ConfigLoader {
    /// Creates a new configuration loader.
    ///
    /// Configuration is loaded from multiple sources in order:
    /// 1. `config/default.toml` - Default values
    /// 2. `config/local.toml` - Local overrides
    /// 3. Environment variables with `STATS__` prefix (`STATS__PROBE__CACHE_TIMEOUT_MS`)
    /// 4. `CACHE_HOST`, `CACHE_PORT`, `LISTEN_PORT` and their aliases
    pub fn new(config_dir: impl Into<String>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    /// Creates a loader for the default location (`./config`).
    pub fn from_default_location() -> Self {
        Self::new("./config")
    }

    /// Loads and validates configuration from files and the process environment.
    pub fn load(&self) -> Result<AppConfig, StatsError> {
        // Load .env file if present
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file found or error loading it: {}", e);
        }

        self.load_with(|name| std::env::var(name).ok())
    }

    /// Loads configuration using `lookup` for the well-known variables.
    pub fn load_with<F>(&self, lookup: F) -> Result<AppConfig, StatsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Config::builder();

        // 1. Load default configuration
        let default_path = format!("{}/default.toml", self.config_dir);
        if Path::new(&default_path).exists() {
            debug!("Loading default config from: {}", default_path);
            builder = builder.add_source(File::with_name(&default_path).required(false));
        }

        // 2. Load local overrides (not committed to version control)
        let local_path = format!("{}/local.toml", self.config_dir);
        if Path::new(&local_path).exists() {
            debug!("Loading local config from: {}", local_path);
            builder = builder.add_source(File::with_name(&local_path).required(false));
        }

        // 3. Override with prefixed environment variables
        builder = builder.add_source(
            Environment::with_prefix("STATS")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        // 4. Well-known deployment variables
        builder = apply_env_overrides(builder, &lookup)?;

        let app_config: AppConfig = builder
            .build()
            .and_then(|config| config.try_deserialize::<AppConfig>())
            .map_err(config_error_to_stats_error)?;

        validation::validate(&app_config).map_err(|errors| {
            let joined = errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            StatsError::Configuration(joined)
        })?;

        info!(
            listen = %app_config.server.listen_addr(),
            cache_configured = app_config.cache.is_configured(),
            "Configuration loaded"
        );

        Ok(app_config)
    }
}

fn apply_env_overrides<F>(
    mut builder: ConfigBuilder<DefaultState>,
    lookup: &F,
) -> Result<ConfigBuilder<DefaultState>, StatsError>
where
    F: Fn(&str) -> Option<String>,
{
    for (key, names) in ENV_OVERRIDES {
        let Some((name, value)) = names
            .iter()
            .copied()
            .find_map(|name| lookup(name).filter(|v| !v.trim().is_empty()).map(|v| (name, v)))
        else {
            continue;
        };

        let overridden = if key.ends_with(".port") {
            let port = parse_port(name, &value)?;
            builder.set_override(*key, i64::from(port))
        } else {
            builder.set_override(*key, value.trim().to_string())
        };
        builder = overridden.map_err(config_error_to_stats_error)?;
    }

    Ok(builder)
}

fn parse_port(name: &str, value: &str) -> Result<u16, StatsError> {
    value
        .trim()
        .parse::<u16>()
        .map_err(|e| StatsError::Configuration(format!("{} must be a port number, got '{}': {}", name, value, e)))
}

fn config_error_to_stats_error(err: ConfigError) -> StatsError {
    StatsError::Configuration(err.to_string())
}
