//! Seams to the remote services the policies client talks to.

use async_trait::async_trait;

use crate::error::AuthzError;
use crate::model::{
    ListAssignmentsFilter, Principal, RoleAssignment, RoleAssignmentCreateParameters,
    RoleDefinition,
};

/// Role definition and role assignment operations of the authorization
/// service.
#[async_trait]
pub trait AuthorizationManagement: Send + Sync {
    /// Fetch one definition by GUID or full resource id.
    async fn get_role_definition(&self, id: &str) -> Result<RoleDefinition, AuthzError>;

    async fn list_role_definitions(&self) -> Result<Vec<RoleDefinition>, AuthzError>;

    /// Create the assignment `name` at `scope`.
    async fn create_role_assignment(
        &self,
        scope: &str,
        name: &str,
        parameters: &RoleAssignmentCreateParameters,
    ) -> Result<RoleAssignment, AuthzError>;

    async fn get_role_assignment(&self, scope: &str, name: &str)
    -> Result<RoleAssignment, AuthzError>;

    async fn list_role_assignments(
        &self,
        filter: &ListAssignmentsFilter,
    ) -> Result<Vec<RoleAssignment>, AuthzError>;

    async fn delete_role_assignment(&self, scope: &str, name: &str) -> Result<(), AuthzError>;
}

/// Directory lookups for principals.
#[async_trait]
pub trait PrincipalDirectory: Send + Sync {
    /// Resolve a sign-in or display name. Fails with `NotFound` when the
    /// directory has no match.
    async fn resolve_principal(&self, name: &str) -> Result<Principal, AuthzError>;

    /// Reverse lookup by object id.
    async fn get_principal(&self, id: &str) -> Result<Option<Principal>, AuthzError>;
}
