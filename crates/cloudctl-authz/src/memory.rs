//! In-process implementations of the remote service seams.
//!
//! They follow the same contracts as the REST clients and back the test
//! suites.

use async_trait::async_trait;
use std::sync::RwLock;

use crate::error::AuthzError;
use crate::management::{AuthorizationManagement, PrincipalDirectory};
use crate::model::{
    AUTHORIZATION_PROVIDER, ListAssignmentsFilter, Principal, RoleAssignment,
    RoleAssignmentCreateParameters, RoleAssignmentProperties, RoleDefinition, same_scope,
};

/// Authorization service holding definitions and assignments in memory.
#[derive(Default)]
pub struct InMemoryAuthorization {
    definitions: RwLock<Vec<RoleDefinition>>,
    assignments: RwLock<Vec<RoleAssignment>>,
}

impl InMemoryAuthorization {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_definitions(definitions: Vec<RoleDefinition>) -> Self {
        Self {
            definitions: RwLock::new(definitions),
            assignments: RwLock::new(Vec::new()),
        }
    }

    /// Snapshot of the stored assignments.
    pub fn assignments(&self) -> Vec<RoleAssignment> {
        self.assignments
            .read()
            .map(|a| a.clone())
            .unwrap_or_default()
    }
}

fn poisoned<T>(_: T) -> AuthzError {
    AuthzError::Remote {
        status: 500,
        body: "in-memory store lock poisoned".to_string(),
    }
}

#[async_trait]
impl AuthorizationManagement for InMemoryAuthorization {
    async fn get_role_definition(&self, id: &str) -> Result<RoleDefinition, AuthzError> {
        let definitions = self.definitions.read().map_err(poisoned)?;
        definitions
            .iter()
            .find(|d| d.matches_id(id))
            .cloned()
            .ok_or_else(|| AuthzError::not_found("role definition", id))
    }

    async fn list_role_definitions(&self) -> Result<Vec<RoleDefinition>, AuthzError> {
        Ok(self.definitions.read().map_err(poisoned)?.clone())
    }

    async fn create_role_assignment(
        &self,
        scope: &str,
        name: &str,
        parameters: &RoleAssignmentCreateParameters,
    ) -> Result<RoleAssignment, AuthzError> {
        let properties = &parameters.properties;
        self.get_role_definition(&properties.role_definition_id)
            .await?;

        let mut assignments = self.assignments.write().map_err(poisoned)?;
        if assignments
            .iter()
            .any(|a| a.name == name && same_scope(&a.scope(), scope))
        {
            return Err(AuthzError::Remote {
                status: 409,
                body: format!("role assignment {} already exists", name),
            });
        }

        let assignment = RoleAssignment {
            id: format!(
                "{}/{}/roleAssignments/{}",
                scope.trim_end_matches('/'),
                AUTHORIZATION_PROVIDER,
                name
            ),
            name: name.to_string(),
            resource_type: Some("Microsoft.Authorization/roleAssignments".to_string()),
            properties: RoleAssignmentProperties {
                principal_id: properties.principal_id.clone(),
                role_definition_id: properties.role_definition_id.clone(),
                scope: Some(scope.to_string()),
            },
        };
        assignments.push(assignment.clone());
        Ok(assignment)
    }

    async fn get_role_assignment(
        &self,
        scope: &str,
        name: &str,
    ) -> Result<RoleAssignment, AuthzError> {
        let assignments = self.assignments.read().map_err(poisoned)?;
        assignments
            .iter()
            .find(|a| a.name == name && same_scope(&a.scope(), scope))
            .cloned()
            .ok_or_else(|| AuthzError::not_found("role assignment", name))
    }

    async fn list_role_assignments(
        &self,
        filter: &ListAssignmentsFilter,
    ) -> Result<Vec<RoleAssignment>, AuthzError> {
        let assignments = self.assignments.read().map_err(poisoned)?;
        Ok(assignments
            .iter()
            .filter(|a| {
                filter
                    .principal_id
                    .as_deref()
                    .is_none_or(|p| a.properties.principal_id == p)
            })
            .cloned()
            .collect())
    }

    async fn delete_role_assignment(&self, scope: &str, name: &str) -> Result<(), AuthzError> {
        let mut assignments = self.assignments.write().map_err(poisoned)?;
        let before = assignments.len();
        assignments.retain(|a| !(a.name == name && same_scope(&a.scope(), scope)));
        if assignments.len() == before {
            return Err(AuthzError::not_found("role assignment", name));
        }
        Ok(())
    }
}

/// Directory backed by a fixed list of principals.
#[derive(Default)]
pub struct InMemoryDirectory {
    principals: Vec<Principal>,
}

impl InMemoryDirectory {
    pub fn new(principals: Vec<Principal>) -> Self {
        Self { principals }
    }
}

#[async_trait]
impl PrincipalDirectory for InMemoryDirectory {
    async fn resolve_principal(&self, name: &str) -> Result<Principal, AuthzError> {
        self.principals
            .iter()
            .find(|p| p.answers_to(name))
            .cloned()
            .ok_or_else(|| AuthzError::not_found("principal", name))
    }

    async fn get_principal(&self, id: &str) -> Result<Option<Principal>, AuthzError> {
        Ok(self.principals.iter().find(|p| p.id == id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Permission;

    fn reader() -> RoleDefinition {
        RoleDefinition::new(
            "/subscriptions/s1",
            "r1",
            "Reader",
            vec![Permission {
                actions: vec!["*/read".to_string()],
                not_actions: vec![],
            }],
        )
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_definition() {
        let store = InMemoryAuthorization::new();
        let params = RoleAssignmentCreateParameters::new("p1", "missing");
        let err = store
            .create_role_assignment("/subscriptions/s1", "a1", &params)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_name() {
        let store = InMemoryAuthorization::with_definitions(vec![reader()]);
        let params = RoleAssignmentCreateParameters::new("p1", reader().id);
        store
            .create_role_assignment("/subscriptions/s1", "a1", &params)
            .await
            .unwrap();
        let err = store
            .create_role_assignment("/subscriptions/s1", "a1", &params)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthzError::Remote { status: 409, .. }));
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let store = InMemoryAuthorization::new();
        let err = store
            .delete_role_assignment("/subscriptions/s1", "a1")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
