//! The policies client: role definitions and role assignments.
//!
//! Translates per-call filter parameters into calls on the
//! [`AuthorizationManagement`] service and resolves principal names through
//! the [`PrincipalDirectory`]. Results are projected into view objects.
//!
//! Lookups aimed at one specific entity (get by id, filter by name, remove)
//! fail with [`AuthzError::NotFound`]. Open listings return an empty vector.

use std::sync::Arc;

use cloudctl_core::CloudctlConfig;
use uuid::Uuid;

use crate::arm::ArmAuthorizationClient;
use crate::error::AuthzError;
use crate::graph::GraphDirectoryClient;
use crate::management::{AuthorizationManagement, PrincipalDirectory};
use crate::model::{
    FilterRoleAssignmentsOptions, ListAssignmentsFilter, RoleAssignment,
    RoleAssignmentCreateParameters, RoleAssignmentView, RoleDefinitionView, same_scope,
};

pub struct PoliciesClient {
    authorization: Arc<dyn AuthorizationManagement>,
    directory: Arc<dyn PrincipalDirectory>,
}

impl PoliciesClient {
    pub fn new(
        authorization: Arc<dyn AuthorizationManagement>,
        directory: Arc<dyn PrincipalDirectory>,
    ) -> Self {
        Self {
            authorization,
            directory,
        }
    }

    /// Build a client talking to the endpoints named in the configuration.
    pub fn from_config(config: &CloudctlConfig) -> Result<Self, AuthzError> {
        let authorization = ArmAuthorizationClient::from_config(config)?;
        let directory = GraphDirectoryClient::from_config(config)?;
        Ok(Self::new(Arc::new(authorization), Arc::new(directory)))
    }

    pub async fn get_role_definition(&self, id: &str) -> Result<RoleDefinitionView, AuthzError> {
        if id.trim().is_empty() {
            return Err(AuthzError::InvalidArgument(
                "role definition id must not be empty".to_string(),
            ));
        }
        let definition = self.authorization.get_role_definition(id).await?;
        Ok(definition.into())
    }

    /// All definitions when `name` is empty, otherwise the single definition
    /// whose role name equals `name`.
    pub async fn filter_role_definitions(
        &self,
        name: &str,
    ) -> Result<Vec<RoleDefinitionView>, AuthzError> {
        let definitions = self.authorization.list_role_definitions().await?;

        if name.is_empty() {
            tracing::debug!(count = definitions.len(), "Listing all role definitions");
            return Ok(definitions.into_iter().map(Into::into).collect());
        }

        let definition = definitions
            .into_iter()
            .find(|d| d.properties.role_name == name)
            .ok_or_else(|| AuthzError::not_found("role definition", name))?;

        Ok(vec![definition.into()])
    }

    /// Create a role assignment and return the record as the service now
    /// reports it.
    pub async fn create_role_assignment(
        &self,
        options: &FilterRoleAssignmentsOptions,
    ) -> Result<RoleAssignmentView, AuthzError> {
        let principal_name = required(&options.principal_name, "principal name")?;
        let role_name = required(&options.role_definition_name, "role definition name")?;
        let scope = required(&options.scope, "scope")?;

        let principal = self.directory.resolve_principal(principal_name).await?;
        let role_definition_id = self
            .filter_role_definitions(role_name)
            .await?
            .into_iter()
            .next()
            .map(|d| d.id)
            .ok_or_else(|| AuthzError::not_found("role definition", role_name))?;
        let assignment_name = Uuid::new_v4().to_string();

        tracing::info!(
            principal = %principal.id,
            role_definition = %role_definition_id,
            scope = %scope,
            assignment = %assignment_name,
            "Creating role assignment"
        );

        let parameters = RoleAssignmentCreateParameters::new(&principal.id, &role_definition_id);
        self.authorization
            .create_role_assignment(scope, &assignment_name, &parameters)
            .await?;

        let created = self
            .authorization
            .get_role_assignment(scope, &assignment_name)
            .await?;
        self.to_view(created).await
    }

    /// Assignments of the given principal, optionally narrowed by role
    /// definition name and scope. Order is the order the service returned.
    pub async fn filter_role_assignments(
        &self,
        options: &FilterRoleAssignmentsOptions,
    ) -> Result<Vec<RoleAssignmentView>, AuthzError> {
        let mut filter = ListAssignmentsFilter::default();
        if let Some(name) = non_empty(&options.principal_name) {
            match self.directory.resolve_principal(name).await {
                Ok(principal) => filter.principal_id = Some(principal.id),
                Err(e) if e.is_not_found() => {
                    tracing::debug!(principal = name, "Unknown principal, no assignments match");
                    return Ok(Vec::new());
                }
                Err(e) => return Err(e),
            }
        }

        let role_definition_id = match non_empty(&options.role_definition_name) {
            Some(role_name) => match self.filter_role_definitions(role_name).await {
                Ok(definitions) => definitions.into_iter().next().map(|d| d.id),
                Err(e) if e.is_not_found() => {
                    tracing::debug!(role = role_name, "Unknown role definition, no assignments match");
                    return Ok(Vec::new());
                }
                Err(e) => return Err(e),
            },
            None => None,
        };

        let assignments = self.authorization.list_role_assignments(&filter).await?;
        let mut result = Vec::new();
        for assignment in assignments {
            if let Some(id) = &role_definition_id {
                if !assignment
                    .properties
                    .role_definition_id
                    .eq_ignore_ascii_case(id)
                {
                    continue;
                }
            }
            if let Some(scope) = non_empty(&options.scope) {
                if !same_scope(&assignment.scope(), scope) {
                    continue;
                }
            }
            result.push(self.to_view(assignment).await?);
        }

        tracing::debug!(count = result.len(), "Filtered role assignments");
        Ok(result)
    }

    /// Delete the first assignment matching `options`. A principal name is
    /// required; an empty filter never matches.
    pub async fn remove_role_assignment(
        &self,
        options: &FilterRoleAssignmentsOptions,
    ) -> Result<RoleAssignmentView, AuthzError> {
        required(&options.principal_name, "principal name")?;

        let assignment = self
            .filter_role_assignments(options)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AuthzError::not_found("role assignment", describe(options)))?;

        let scope = non_empty(&options.scope).unwrap_or(assignment.scope.as_str());
        tracing::info!(assignment = %assignment.name, scope = %scope, "Removing role assignment");

        self.authorization
            .delete_role_assignment(scope, &assignment.name)
            .await?;
        Ok(assignment)
    }

    async fn to_view(&self, assignment: RoleAssignment) -> Result<RoleAssignmentView, AuthzError> {
        let scope = assignment.scope();
        let properties = assignment.properties;

        let principal_name = self
            .directory
            .get_principal(&properties.principal_id)
            .await?
            .map(|p| p.display_name);

        let role_definition_name = match self
            .authorization
            .get_role_definition(&properties.role_definition_id)
            .await
        {
            Ok(definition) => Some(definition.properties.role_name),
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(e),
        };

        Ok(RoleAssignmentView {
            id: assignment.id,
            name: assignment.name,
            scope,
            principal_id: properties.principal_id,
            principal_name,
            role_definition_id: properties.role_definition_id,
            role_definition_name,
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn required<'a>(value: &'a Option<String>, what: &str) -> Result<&'a str, AuthzError> {
    non_empty(value).ok_or_else(|| AuthzError::InvalidArgument(format!("{} is required", what)))
}

fn describe(options: &FilterRoleAssignmentsOptions) -> String {
    let mut parts = Vec::new();
    if let Some(p) = non_empty(&options.principal_name) {
        parts.push(format!("principal={}", p));
    }
    if let Some(r) = non_empty(&options.role_definition_name) {
        parts.push(format!("role={}", r));
    }
    if let Some(s) = non_empty(&options.scope) {
        parts.push(format!("scope={}", s));
    }
    if parts.is_empty() {
        "<any>".to_string()
    } else {
        parts.join(", ")
    }
}
