//! Configuration validation.
//!
//! Fails fast on values that would make the server misbehave at runtime.

use crate::AppConfig;
use std::fmt;

/// Configuration validation error variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    /// Port number is invalid (must be 1-65535).
    InvalidPort { name: String, value: u16 },
    /// Timeout value must be positive.
    NonPositiveTimeout { name: String },
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPort { name, value } => {
                write!(f, "Invalid port for {}: {} (must be 1-65535)", name, value)
            }
            Self::NonPositiveTimeout { name } => {
                write!(f, "Timeout {} must be greater than zero", name)
            }
        }
    }
}

impl std::error::Error for ConfigValidationError {}

/// Validates the configuration, collecting every problem found.
pub fn validate(config: &AppConfig) -> Result<(), Vec<ConfigValidationError>> {
    let mut errors = Vec::new();

    if config.server.port == 0 {
        errors.push(ConfigValidationError::InvalidPort {
            name: "server.port".to_string(),
            value: config.server.port,
        });
    }

    if config.cache.is_configured() {
        if config.cache.port == 0 {
            errors.push(ConfigValidationError::InvalidPort {
                name: "cache.port".to_string(),
                value: config.cache.port,
            });
        }
        if config.cache.connect_timeout_ms == 0 {
            errors.push(ConfigValidationError::NonPositiveTimeout {
                name: "cache.connect_timeout_ms".to_string(),
            });
        }
    }

    if config.probe.cache_timeout_ms == 0 {
        errors.push(ConfigValidationError::NonPositiveTimeout {
            name: "probe.cache_timeout_ms".to_string(),
        });
    }

    if config.shutdown.deadline_secs == 0 {
        errors.push(ConfigValidationError::NonPositiveTimeout {
            name: "shutdown.deadline_secs".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_zero_listen_port_rejected() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        let errors = validate(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ConfigValidationError::InvalidPort {
                name: "server.port".to_string(),
                value: 0
            }]
        );
    }

    #[test]
    fn test_cache_fields_ignored_when_unconfigured() {
        let mut config = AppConfig::default();
        config.cache.port = 0;
        config.cache.connect_timeout_ms = 0;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_cache_fields_checked_when_configured() {
        let mut config = AppConfig::default();
        config.cache.host = Some("localhost".to_string());
        config.cache.port = 0;
        config.cache.connect_timeout_ms = 0;
        let errors = validate(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_zero_deadline_rejected() {
        let mut config = AppConfig::default();
        config.shutdown.deadline_secs = 0;
        let errors = validate(&config).unwrap_err();
        assert!(errors[0].to_string().contains("shutdown.deadline_secs"));
    }
}
