//! REST client for the Resource Manager authorization provider.

use async_trait::async_trait;
use cloudctl_core::CloudctlConfig;
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::AuthzError;
use crate::management::AuthorizationManagement;
use crate::model::{
    AUTHORIZATION_PROVIDER, ListAssignmentsFilter, ListResponse, RoleAssignment,
    RoleAssignmentCreateParameters, RoleDefinition,
};

pub struct ArmAuthorizationClient {
    http: reqwest::Client,
    endpoint: Url,
    api_version: String,
    /// Subscription scope used for definition lookups and listings.
    scope: String,
    token: String,
}

impl ArmAuthorizationClient {
    pub fn new(
        endpoint: &str,
        api_version: impl Into<String>,
        scope: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, AuthzError> {
        Ok(Self {
            http: reqwest::Client::new(),
            endpoint: base_url(endpoint)?,
            api_version: api_version.into(),
            scope: scope.into(),
            token: token.into(),
        })
    }

    pub fn from_config(config: &CloudctlConfig) -> Result<Self, AuthzError> {
        Self::new(
            &config.resource_manager.endpoint,
            config.resource_manager.api_version.clone(),
            config.subscription_scope()?,
            config.credentials.access_token()?,
        )
    }

    fn url(&self, path: &str) -> Result<Url, AuthzError> {
        let mut url = self.endpoint.join(path.trim_start_matches('/'))?;
        url.query_pairs_mut()
            .append_pair("api-version", &self.api_version);
        Ok(url)
    }

    fn definitions_path(&self) -> String {
        format!(
            "{}/{}/roleDefinitions",
            self.scope.trim_end_matches('/'),
            AUTHORIZATION_PROVIDER
        )
    }

    fn assignment_path(scope: &str, name: &str) -> String {
        format!(
            "{}/{}/roleAssignments/{}",
            scope.trim_end_matches('/'),
            AUTHORIZATION_PROVIDER,
            name
        )
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&RoleAssignmentCreateParameters>,
        kind: &'static str,
        id: &str,
    ) -> Result<Response, AuthzError> {
        tracing::debug!(method = %method, url = %url, "Authorization request");

        let mut request = self.http.request(method, url).bearer_auth(&self.token);
        if let Some(body) = body {
            request = request.json(body);
        }
        check_status(request.send().await?, kind, id).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        kind: &'static str,
        id: &str,
    ) -> Result<T, AuthzError> {
        let response = self.send(Method::GET, url, None, kind, id).await?;
        Ok(response.json().await?)
    }

    /// Follow `nextLink` until the listing is exhausted.
    async fn list_all<T: DeserializeOwned>(
        &self,
        first: Url,
        kind: &'static str,
    ) -> Result<Vec<T>, AuthzError> {
        let mut items = Vec::new();
        let mut next = Some(first);
        while let Some(url) = next.take() {
            let page: ListResponse<T> = self.get_json(url, kind, "*").await?;
            items.extend(page.value);
            if let Some(link) = page.next_link.filter(|l| !l.is_empty()) {
                next = Some(Url::parse(&link)?);
            }
        }
        Ok(items)
    }
}

#[async_trait]
impl AuthorizationManagement for ArmAuthorizationClient {
    async fn get_role_definition(&self, id: &str) -> Result<RoleDefinition, AuthzError> {
        let path = if id.starts_with('/') {
            id.to_string()
        } else {
            format!("{}/{}", self.definitions_path(), id)
        };
        self.get_json(self.url(&path)?, "role definition", id).await
    }

    async fn list_role_definitions(&self) -> Result<Vec<RoleDefinition>, AuthzError> {
        let url = self.url(&self.definitions_path())?;
        self.list_all(url, "role definition").await
    }

    async fn create_role_assignment(
        &self,
        scope: &str,
        name: &str,
        parameters: &RoleAssignmentCreateParameters,
    ) -> Result<RoleAssignment, AuthzError> {
        let url = self.url(&Self::assignment_path(scope, name))?;
        let response = self
            .send(Method::PUT, url, Some(parameters), "role assignment", name)
            .await?;
        Ok(response.json().await?)
    }

    async fn get_role_assignment(
        &self,
        scope: &str,
        name: &str,
    ) -> Result<RoleAssignment, AuthzError> {
        let url = self.url(&Self::assignment_path(scope, name))?;
        self.get_json(url, "role assignment", name).await
    }

    async fn list_role_assignments(
        &self,
        filter: &ListAssignmentsFilter,
    ) -> Result<Vec<RoleAssignment>, AuthzError> {
        let path = format!(
            "{}/{}/roleAssignments",
            self.scope.trim_end_matches('/'),
            AUTHORIZATION_PROVIDER
        );
        let mut url = self.url(&path)?;
        if let Some(principal_id) = &filter.principal_id {
            url.query_pairs_mut().append_pair(
                "$filter",
                &format!("principalId eq '{}'", odata_escape(principal_id)),
            );
        }
        self.list_all(url, "role assignment").await
    }

    async fn delete_role_assignment(&self, scope: &str, name: &str) -> Result<(), AuthzError> {
        let url = self.url(&Self::assignment_path(scope, name))?;
        self.send(Method::DELETE, url, None, "role assignment", name)
            .await?;
        Ok(())
    }
}

/// Parse an endpoint so that relative joins append to its path.
pub(crate) fn base_url(endpoint: &str) -> Result<Url, AuthzError> {
    if endpoint.ends_with('/') {
        Ok(Url::parse(endpoint)?)
    } else {
        Ok(Url::parse(&format!("{}/", endpoint))?)
    }
}

/// Map a non-success response onto the error taxonomy.
pub(crate) async fn check_status(
    response: Response,
    kind: &'static str,
    id: &str,
) -> Result<Response, AuthzError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::warn!(status = status.as_u16(), kind, id, "Remote call failed");

    match status {
        StatusCode::NOT_FOUND => Err(AuthzError::not_found(kind, id)),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AuthzError::Unauthorized(body)),
        _ => Err(AuthzError::Remote {
            status: status.as_u16(),
            body,
        }),
    }
}

pub(crate) fn odata_escape(value: &str) -> String {
    value.replace('\'', "''")
}
