//! Configuration types shared across all cloudctl crates.

pub mod config;

pub use config::{
    CloudctlConfig, ConfigError, CredentialsConfig, GraphConfig, LoggingConfig,
    ResourceManagerConfig,
};
