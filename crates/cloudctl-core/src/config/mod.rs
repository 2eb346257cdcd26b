//! Configuration types for cloudctl.
//!
//! Configuration is loaded from a single YAML file (`cloudctl.yaml`) and then
//! overlaid with environment variables.
//!
//! # Lookup order
//!
//! 1. The path passed with `--config`
//! 2. The path in `CLOUDCTL_CONFIG`
//! 3. `./cloudctl.yaml` when it exists
//! 4. Built-in defaults
//!
//! `AZURE_SUBSCRIPTION_ID` and `AZURE_TENANT_ID` override the file values.

pub mod credentials;
pub mod endpoint;

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub use credentials::CredentialsConfig;
pub use endpoint::{GraphConfig, ResourceManagerConfig};

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "CLOUDCTL_CONFIG";

/// Configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "cloudctl.yaml";

/// Complete cloudctl configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CloudctlConfig {
    /// Subscription that role definitions are scoped to.
    #[serde(default)]
    pub subscription_id: Option<String>,

    /// Directory tenant used for principal lookups.
    #[serde(default)]
    pub tenant_id: Option<String>,

    /// Resource Manager endpoint.
    #[serde(default)]
    pub resource_manager: ResourceManagerConfig,

    /// Directory endpoint.
    #[serde(default)]
    pub graph: GraphConfig,

    /// Where bearer tokens are read from.
    #[serde(default)]
    pub credentials: CredentialsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("missing configuration value: {0}")]
    Missing(&'static str),

    #[error("no bearer token found in environment variable {0}")]
    MissingCredential(String),
}

impl CloudctlConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(ConfigError::from)
    }

    /// Load configuration following the documented lookup order and apply
    /// environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match Self::resolve_path(explicit) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "Loading configuration");
                Self::from_file(&path)?
            }
            None => {
                tracing::debug!("No configuration file found, using defaults");
                Self::default()
            }
        };

        config.apply_overrides(|key| env::var(key).ok());
        Ok(config)
    }

    fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        if let Ok(path) = env::var(CONFIG_ENV) {
            if !path.is_empty() {
                return Some(PathBuf::from(path));
            }
        }
        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        local.exists().then_some(local)
    }

    /// Overlay values from an environment-like lookup.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(subscription) = lookup("AZURE_SUBSCRIPTION_ID").filter(|s| !s.is_empty()) {
            self.subscription_id = Some(subscription);
        }
        if let Some(tenant) = lookup("AZURE_TENANT_ID").filter(|s| !s.is_empty()) {
            self.tenant_id = Some(tenant);
        }
    }

    /// Scope under which role definitions are listed, e.g. `/subscriptions/{id}`.
    pub fn subscription_scope(&self) -> Result<String, ConfigError> {
        let subscription = self
            .subscription_id
            .as_deref()
            .ok_or(ConfigError::Missing("subscription_id"))?;
        Ok(format!("/subscriptions/{}", subscription))
    }

    pub fn tenant(&self) -> Result<&str, ConfigError> {
        self.tenant_id
            .as_deref()
            .ok_or(ConfigError::Missing("tenant_id"))
    }
}
