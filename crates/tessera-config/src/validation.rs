//! Configuration validation.
//!
//! Every check runs and all problems are reported together, so a bad
//! deployment fails at startup with the full list instead of one error at a
//! time.

use crate::{
    AppConfig, DatabaseConfig, ObservabilityConfig, RateLimitConfig, RedisConfig, ServerConfig,
};
use std::fmt;
use url::Url;

/// Configuration validation error variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    /// Port number is invalid (must be 1-65535).
    InvalidPort { name: String, value: u16 },
    /// Pool size configuration is invalid (min must be <= max).
    InvalidPoolSize { min: u32, max: u32 },
    /// Pool size must be at least one connection.
    EmptyPool { name: String },
    /// URL is malformed or uses the wrong scheme.
    InvalidUrl { url_type: String, message: String },
    /// Timeout value must be positive.
    NonPositiveTimeout { name: String },
    /// Rate limit must allow at least one request.
    InvalidRateLimit,
    /// Log level is invalid.
    InvalidLogLevel { value: String },
    /// Log format is invalid.
    InvalidLogFormat { value: String },
    /// Metrics path cannot be mounted as a route.
    InvalidMetricsPath { value: String, reason: String },
    /// Basic auth is enabled without a username.
    MissingBasicAuthUsername,
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPort { name, value } => {
                write!(f, "Invalid port for {}: {} (must be 1-65535)", name, value)
            }
            Self::InvalidPoolSize { min, max } => {
                write!(f, "Invalid pool size: min ({}) > max ({})", min, max)
            }
            Self::EmptyPool { name } => write!(f, "{} must be at least 1", name),
            Self::InvalidUrl { url_type, message } => {
                write!(f, "Invalid {} URL: {}", url_type, message)
            }
            Self::NonPositiveTimeout { name } => write!(f, "{} must be positive", name),
            Self::InvalidRateLimit => {
                write!(f, "rate_limit.requests_per_minute must be positive when enabled")
            }
            Self::InvalidLogLevel { value } => write!(
                f,
                "Invalid log level: '{}' (valid: trace, debug, info, warn, error)",
                value
            ),
            Self::InvalidLogFormat { value } => {
                write!(f, "Invalid log format: '{}' (valid: pretty, json)", value)
            }
            Self::InvalidMetricsPath { value, reason } => {
                write!(f, "Invalid metrics path '{}': {}", value, reason)
            }
            Self::MissingBasicAuthUsername => {
                write!(f, "security.basic_auth_username is required when basic auth is enabled")
            }
        }
    }
}

impl std::error::Error for ConfigValidationError {}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    const VALID_LOG_LEVELS: &'static [&'static str] = &["trace", "debug", "info", "warn", "error"];
    const VALID_LOG_FORMATS: &'static [&'static str] = &["pretty", "json"];
    /// Paths the REST router mounts itself.
    const RESERVED_PATHS: &'static [&'static str] =
        &["/", "/health", "/ready", "/live", "/users", "/api-docs/openapi.json"];

    /// Validates the entire application configuration.
    ///
    /// Returns `Ok(())` if valid, or every validation error found.
    pub fn validate(config: &AppConfig) -> Result<(), Vec<ConfigValidationError>> {
        let mut errors = Vec::new();

        Self::validate_server(&config.server, &mut errors);
        Self::validate_database(&config.database, &mut errors);
        Self::validate_redis(&config.redis, &mut errors);
        Self::validate_rate_limit(&config.rate_limit, &mut errors);
        Self::validate_observability(&config.observability, &mut errors);

        if config.security.basic_auth_enabled && config.security.basic_auth_username.is_empty() {
            errors.push(ConfigValidationError::MissingBasicAuthUsername);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_server(config: &ServerConfig, errors: &mut Vec<ConfigValidationError>) {
        if config.port == 0 {
            errors.push(ConfigValidationError::InvalidPort {
                name: "server.port".to_string(),
                value: config.port,
            });
        }
        if config.request_timeout_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveTimeout {
                name: "server.request_timeout_secs".to_string(),
            });
        }
    }

    fn validate_database(config: &DatabaseConfig, errors: &mut Vec<ConfigValidationError>) {
        if let Err(message) = check_url(&config.url, &["postgres", "postgresql"]) {
            errors.push(ConfigValidationError::InvalidUrl {
                url_type: "database".to_string(),
                message,
            });
        }

        if config.max_connections == 0 {
            errors.push(ConfigValidationError::EmptyPool {
                name: "database.max_connections".to_string(),
            });
        }
        if config.min_connections > config.max_connections {
            errors.push(ConfigValidationError::InvalidPoolSize {
                min: config.min_connections,
                max: config.max_connections,
            });
        }
        if config.connect_timeout_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveTimeout {
                name: "database.connect_timeout_secs".to_string(),
            });
        }
    }

    fn validate_redis(config: &RedisConfig, errors: &mut Vec<ConfigValidationError>) {
        if !config.enabled {
            return;
        }

        if let Err(message) = check_url(&config.url, &["redis", "rediss"]) {
            errors.push(ConfigValidationError::InvalidUrl {
                url_type: "redis".to_string(),
                message,
            });
        }
        if config.pool_size == 0 {
            errors.push(ConfigValidationError::EmptyPool {
                name: "redis.pool_size".to_string(),
            });
        }
        if config.connect_timeout_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveTimeout {
                name: "redis.connect_timeout_secs".to_string(),
            });
        }
    }

    fn validate_rate_limit(config: &RateLimitConfig, errors: &mut Vec<ConfigValidationError>) {
        if config.enabled && config.requests_per_minute == 0 {
            errors.push(ConfigValidationError::InvalidRateLimit);
        }
    }

    fn validate_observability(config: &ObservabilityConfig, errors: &mut Vec<ConfigValidationError>) {
        let level = config.log_level.to_lowercase();
        if !Self::VALID_LOG_LEVELS.contains(&level.as_str()) {
            errors.push(ConfigValidationError::InvalidLogLevel {
                value: config.log_level.clone(),
            });
        }

        let format = config.log_format.to_lowercase();
        if !Self::VALID_LOG_FORMATS.contains(&format.as_str()) {
            errors.push(ConfigValidationError::InvalidLogFormat {
                value: config.log_format.clone(),
            });
        }

        if config.metrics_enabled {
            if let Err(reason) = Self::check_metrics_path(&config.metrics_path) {
                errors.push(ConfigValidationError::InvalidMetricsPath {
                    value: config.metrics_path.clone(),
                    reason,
                });
            }
        }
    }

    fn check_metrics_path(path: &str) -> Result<(), String> {
        if !path.starts_with('/') {
            return Err("must start with '/'".to_string());
        }
        if path.contains([':', '*']) {
            return Err("must not contain route parameters".to_string());
        }
        if Self::RESERVED_PATHS.contains(&path) || path.starts_with("/users/") {
            return Err("clashes with an API route".to_string());
        }
        Ok(())
    }
}

/// Parses `raw` and checks its scheme against `schemes`.
fn check_url(raw: &str, schemes: &[&str]) -> Result<(), String> {
    if raw.is_empty() {
        return Err("URL cannot be empty".to_string());
    }

    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    if !schemes.contains(&url.scheme()) {
        return Err(format!(
            "scheme '{}' not supported (expected one of: {})",
            url.scheme(),
            schemes.join(", ")
        ));
    }
    Ok(())
}
