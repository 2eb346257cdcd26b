//! Directory (graph) client used to resolve principal names.

use async_trait::async_trait;
use cloudctl_core::CloudctlConfig;
use serde::Deserialize;
use url::Url;

use crate::arm::{base_url, check_status, odata_escape};
use crate::error::AuthzError;
use crate::management::PrincipalDirectory;
use crate::model::{ListResponse, Principal, PrincipalKind};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DirectoryObject {
    object_id: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    user_principal_name: Option<String>,
    #[serde(default)]
    object_type: Option<String>,
}

impl From<DirectoryObject> for Principal {
    fn from(object: DirectoryObject) -> Self {
        Principal {
            display_name: object
                .display_name
                .or_else(|| object.user_principal_name.clone())
                .unwrap_or_else(|| object.object_id.clone()),
            kind: PrincipalKind::from_object_type(object.object_type.as_deref()),
            id: object.object_id,
            user_principal_name: object.user_principal_name,
        }
    }
}

pub struct GraphDirectoryClient {
    http: reqwest::Client,
    endpoint: Url,
    api_version: String,
    tenant: String,
    token: String,
}

impl GraphDirectoryClient {
    pub fn new(
        endpoint: &str,
        api_version: impl Into<String>,
        tenant: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, AuthzError> {
        Ok(Self {
            http: reqwest::Client::new(),
            endpoint: base_url(endpoint)?,
            api_version: api_version.into(),
            tenant: tenant.into(),
            token: token.into(),
        })
    }

    pub fn from_config(config: &CloudctlConfig) -> Result<Self, AuthzError> {
        Self::new(
            &config.graph.endpoint,
            config.graph.api_version.clone(),
            config.tenant()?,
            config.credentials.graph_token()?,
        )
    }

    fn url(&self, collection: &str) -> Result<Url, AuthzError> {
        let mut url = self
            .endpoint
            .join(&format!("{}/{}", self.tenant, collection))?;
        url.query_pairs_mut()
            .append_pair("api-version", &self.api_version);
        Ok(url)
    }

    async fn query(
        &self,
        collection: &str,
        filter: String,
    ) -> Result<Vec<DirectoryObject>, AuthzError> {
        let mut url = self.url(collection)?;
        url.query_pairs_mut().append_pair("$filter", &filter);
        tracing::debug!(url = %url, "Directory query");

        let response = self.http.get(url).bearer_auth(&self.token).send().await?;
        let page: ListResponse<DirectoryObject> = check_status(response, "principal", &filter)
            .await?
            .json()
            .await?;
        Ok(page.value)
    }
}

#[async_trait]
impl PrincipalDirectory for GraphDirectoryClient {
    async fn resolve_principal(&self, name: &str) -> Result<Principal, AuthzError> {
        let escaped = odata_escape(name);

        let users = self
            .query("users", format!("userPrincipalName eq '{}'", escaped))
            .await?;
        if let Some(user) = users.into_iter().next() {
            return Ok(user.into());
        }

        let service_principals = self
            .query("servicePrincipals", format!("displayName eq '{}'", escaped))
            .await?;
        service_principals
            .into_iter()
            .next()
            .map(Into::into)
            .ok_or_else(|| AuthzError::not_found("principal", name))
    }

    async fn get_principal(&self, id: &str) -> Result<Option<Principal>, AuthzError> {
        let url = self.url(&format!("directoryObjects/{}", id))?;
        let response = self.http.get(url).bearer_auth(&self.token).send().await?;

        match check_status(response, "principal", id).await {
            Ok(response) => {
                let object: DirectoryObject = response.json().await?;
                Ok(Some(object.into()))
            }
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}
