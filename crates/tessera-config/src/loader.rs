//! Configuration loader with layered sources.

use crate::{AppConfig, ConfigValidator, DEFAULT_BASIC_AUTH_PASSWORD};
use config::{Config, ConfigError, Environment, File};
use std::path::Path;
use tessera_core::TesseraError;
use tracing::{debug, info, warn};

/// Environment variable selecting the environment overlay file.
pub const ENVIRONMENT_VAR: &str = "TESSERA_ENVIRONMENT";

const DEFAULT_ENVIRONMENT: &str = "development";

/// Loads and validates the application configuration once at startup.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: AppConfig,
}

impl ConfigLoader {
    /// Creates a new configuration loader.
    ///
    /// Configuration is loaded from multiple sources in order:
    /// 1. `{config_dir}/default.toml`
    /// 2. `{config_dir}/{environment}.toml`, where the environment comes from
    ///    `TESSERA_ENVIRONMENT` (default `development`)
    /// 3. `{config_dir}/local.toml`, for uncommitted overrides
    /// 4. Environment variables such as `TESSERA_SERVER__PORT=9000`
    ///
    /// Missing files are skipped. The merged result is validated before it
    /// is returned.
    pub fn new(config_dir: impl AsRef<Path>) -> Result<Self, TesseraError> {
        let config = Self::load_config(config_dir.as_ref())?;
        Ok(Self { config })
    }

    /// Loads configuration from the default location (`./config`).
    pub fn from_default_location() -> Result<Self, TesseraError> {
        Self::new("./config")
    }

    /// Returns the loaded configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Consumes the loader, returning the configuration.
    #[must_use]
    pub fn into_config(self) -> AppConfig {
        self.config
    }

    fn load_config(config_dir: &Path) -> Result<AppConfig, TesseraError> {
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file found or error loading it: {}", e);
        }

        let environment =
            std::env::var(ENVIRONMENT_VAR).unwrap_or_else(|_| DEFAULT_ENVIRONMENT.to_string());
        Self::load_for_environment(config_dir, &environment)
    }

    fn load_for_environment(config_dir: &Path, environment: &str) -> Result<AppConfig, TesseraError> {
        info!("Loading configuration for environment: {}", environment);

        let mut builder = Config::builder()
            .set_default("app.environment", environment)
            .map_err(config_error)?;

        for name in ["default", environment, "local"] {
            let path = config_dir.join(format!("{}.toml", name));
            if path.exists() {
                debug!("Loading config from: {}", path.display());
                builder = builder.add_source(File::from(path).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("TESSERA")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("server.cors_origins")
                .try_parsing(true),
        );

        let app_config: AppConfig = builder
            .build()
            .and_then(|config| config.try_deserialize())
            .map_err(config_error)?;

        Self::validate_config(&app_config)?;

        Ok(app_config)
    }

    fn validate_config(config: &AppConfig) -> Result<(), TesseraError> {
        if config.app.is_production()
            && config.security.basic_auth_enabled
            && config.security.basic_auth_password == DEFAULT_BASIC_AUTH_PASSWORD
        {
            warn!("Using default basic-auth password in production! This is a security risk.");
        }

        ConfigValidator::validate(config).map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
            TesseraError::Configuration(messages.join("; "))
        })
    }
}

fn config_error(err: ConfigError) -> TesseraError {
    TesseraError::Configuration(err.to_string())
}
