//! Credential configuration.
//!
//! cloudctl never acquires tokens itself. It reads bearer tokens that were
//! obtained out of band from the environment variables named here.

use serde::{Deserialize, Serialize};
use std::env;

use super::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Environment variable holding the Resource Manager bearer token.
    #[serde(default = "default_access_token_env")]
    pub access_token_env: String,

    /// Environment variable holding the graph bearer token.
    #[serde(default = "default_graph_token_env")]
    pub graph_token_env: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            access_token_env: default_access_token_env(),
            graph_token_env: default_graph_token_env(),
        }
    }
}

impl CredentialsConfig {
    /// Read the Resource Manager token from the environment.
    pub fn access_token(&self) -> Result<String, ConfigError> {
        read_token(&self.access_token_env)
    }

    /// Read the graph token from the environment.
    pub fn graph_token(&self) -> Result<String, ConfigError> {
        read_token(&self.graph_token_env)
    }
}

fn read_token(var: &str) -> Result<String, ConfigError> {
    match env::var(var) {
        Ok(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        _ => Err(ConfigError::MissingCredential(var.to_string())),
    }
}

fn default_access_token_env() -> String {
    "AZURE_ACCESS_TOKEN".to_string()
}

fn default_graph_token_env() -> String {
    "AZURE_GRAPH_TOKEN".to_string()
}
