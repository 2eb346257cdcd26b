//! Remote endpoint configuration.

use serde::{Deserialize, Serialize};

/// Resource Manager endpoint hosting the authorization provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceManagerConfig {
    /// Base URL of the management endpoint.
    #[serde(default = "default_resource_manager_endpoint")]
    pub endpoint: String,

    /// `api-version` sent with every authorization request.
    #[serde(default = "default_resource_manager_api_version")]
    pub api_version: String,
}

impl Default for ResourceManagerConfig {
    fn default() -> Self {
        Self {
            endpoint: default_resource_manager_endpoint(),
            api_version: default_resource_manager_api_version(),
        }
    }
}

/// Directory (graph) endpoint used to resolve principals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    #[serde(default = "default_graph_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_graph_api_version")]
    pub api_version: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            endpoint: default_graph_endpoint(),
            api_version: default_graph_api_version(),
        }
    }
}

fn default_resource_manager_endpoint() -> String {
    "https://management.azure.com/".to_string()
}

fn default_resource_manager_api_version() -> String {
    "2015-07-01".to_string()
}

fn default_graph_endpoint() -> String {
    "https://graph.windows.net/".to_string()
}

fn default_graph_api_version() -> String {
    "1.6".to_string()
}
