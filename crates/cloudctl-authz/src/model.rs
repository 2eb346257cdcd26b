//! Wire types of the authorization and directory services, and the view
//! objects handed back to callers.

use serde::{Deserialize, Serialize};

/// Resource provider path segment shared by definitions and assignments.
pub const AUTHORIZATION_PROVIDER: &str = "providers/Microsoft.Authorization";

// =============================================================================
// Role definitions
// =============================================================================

/// A role definition as returned by the authorization service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleDefinition {
    /// Fully qualified resource id.
    pub id: String,
    /// Definition identifier (GUID), the last segment of `id`.
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    pub properties: RoleDefinitionProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleDefinitionProperties {
    pub role_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `BuiltInRole` or `CustomRole`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub role_type: Option<String>,
    #[serde(default)]
    pub permissions: Vec<Permission>,
    #[serde(default)]
    pub assignable_scopes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    #[serde(default)]
    pub actions: Vec<String>,
    #[serde(default)]
    pub not_actions: Vec<String>,
}

impl RoleDefinition {
    /// Build a definition rooted under `scope`.
    pub fn new(scope: &str, name: &str, role_name: &str, permissions: Vec<Permission>) -> Self {
        Self {
            id: format!(
                "{}/{}/roleDefinitions/{}",
                scope.trim_end_matches('/'),
                AUTHORIZATION_PROVIDER,
                name
            ),
            name: name.to_string(),
            resource_type: Some("Microsoft.Authorization/roleDefinitions".to_string()),
            properties: RoleDefinitionProperties {
                role_name: role_name.to_string(),
                description: None,
                role_type: Some("BuiltInRole".to_string()),
                permissions,
                assignable_scopes: vec!["/".to_string()],
            },
        }
    }

    /// True when `id` is either the full resource id or the bare GUID.
    pub fn matches_id(&self, id: &str) -> bool {
        self.id.eq_ignore_ascii_case(id) || self.name.eq_ignore_ascii_case(id)
    }
}

// =============================================================================
// Role assignments
// =============================================================================

/// A role assignment as returned by the authorization service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    pub properties: RoleAssignmentProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleAssignmentProperties {
    pub principal_id: String,
    pub role_definition_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl RoleAssignment {
    /// Scope of the assignment, derived from its id when the service omits it.
    pub fn scope(&self) -> String {
        if let Some(scope) = &self.properties.scope {
            return scope.clone();
        }
        let marker = format!("/{}/", AUTHORIZATION_PROVIDER);
        match self.id.find(&marker) {
            Some(0) | None => "/".to_string(),
            Some(idx) => self.id[..idx].to_string(),
        }
    }
}

/// Body of a role assignment create call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleAssignmentCreateParameters {
    pub properties: RoleAssignmentCreateProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleAssignmentCreateProperties {
    pub role_definition_id: String,
    pub principal_id: String,
}

impl RoleAssignmentCreateParameters {
    pub fn new(principal_id: impl Into<String>, role_definition_id: impl Into<String>) -> Self {
        Self {
            properties: RoleAssignmentCreateProperties {
                role_definition_id: role_definition_id.into(),
                principal_id: principal_id.into(),
            },
        }
    }
}

/// Server-side narrowing of a role assignment listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListAssignmentsFilter {
    pub principal_id: Option<String>,
}

/// Envelope of every list response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    #[serde(default)]
    pub next_link: Option<String>,
}

// =============================================================================
// Principals
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrincipalKind {
    User,
    ServicePrincipal,
    Group,
    Unknown,
}

impl PrincipalKind {
    /// Map a directory `objectType` string.
    pub fn from_object_type(object_type: Option<&str>) -> Self {
        match object_type {
            Some(t) if t.eq_ignore_ascii_case("user") => PrincipalKind::User,
            Some(t) if t.eq_ignore_ascii_case("serviceprincipal") => PrincipalKind::ServicePrincipal,
            Some(t) if t.eq_ignore_ascii_case("group") => PrincipalKind::Group,
            _ => PrincipalKind::Unknown,
        }
    }
}

/// An identity known to the directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_principal_name: Option<String>,
    pub kind: PrincipalKind,
}

impl Principal {
    pub fn user(id: &str, display_name: &str, user_principal_name: &str) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            user_principal_name: Some(user_principal_name.to_string()),
            kind: PrincipalKind::User,
        }
    }

    /// Match a lookup name against the sign-in name or the display name.
    pub fn answers_to(&self, name: &str) -> bool {
        self.user_principal_name
            .as_deref()
            .is_some_and(|upn| upn.eq_ignore_ascii_case(name))
            || self.display_name == name
    }
}

// =============================================================================
// Views
// =============================================================================

/// Display-friendly projection of a role definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleDefinitionView {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_type: Option<String>,
    pub actions: Vec<String>,
    pub not_actions: Vec<String>,
    pub assignable_scopes: Vec<String>,
}

impl From<RoleDefinition> for RoleDefinitionView {
    fn from(definition: RoleDefinition) -> Self {
        let properties = definition.properties;
        let (actions, not_actions) = properties.permissions.into_iter().fold(
            (Vec::new(), Vec::new()),
            |(mut actions, mut not_actions), permission| {
                actions.extend(permission.actions);
                not_actions.extend(permission.not_actions);
                (actions, not_actions)
            },
        );

        Self {
            id: definition.id,
            name: properties.role_name,
            description: properties.description,
            role_type: properties.role_type,
            actions,
            not_actions,
            assignable_scopes: properties.assignable_scopes,
        }
    }
}

/// Display-friendly projection of a role assignment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleAssignmentView {
    pub id: String,
    /// Assignment identifier used for get and delete calls.
    pub name: String,
    pub scope: String,
    pub principal_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal_name: Option<String>,
    pub role_definition_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_definition_name: Option<String>,
}

/// Per-call command parameters for creating, filtering and removing role
/// assignments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterRoleAssignmentsOptions {
    pub principal_name: Option<String>,
    pub role_definition_name: Option<String>,
    pub scope: Option<String>,
}

impl FilterRoleAssignmentsOptions {
    pub fn for_principal(principal_name: impl Into<String>) -> Self {
        Self {
            principal_name: Some(principal_name.into()),
            ..Default::default()
        }
    }

    pub fn with_role(mut self, role_definition_name: impl Into<String>) -> Self {
        self.role_definition_name = Some(role_definition_name.into());
        self
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }
}

/// Compare two scopes the way the service does: case-insensitive, ignoring
/// a trailing slash.
pub fn same_scope(a: &str, b: &str) -> bool {
    a.trim_end_matches('/')
        .eq_ignore_ascii_case(b.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_definition_from_wire() {
        let wire = json!({
            "id": "/subscriptions/s1/providers/Microsoft.Authorization/roleDefinitions/acdd72a7",
            "name": "acdd72a7",
            "type": "Microsoft.Authorization/roleDefinitions",
            "properties": {
                "roleName": "Reader",
                "description": "Lets you view everything",
                "type": "BuiltInRole",
                "permissions": [{ "actions": ["*/read"], "notActions": [] }],
                "assignableScopes": ["/"]
            }
        });

        let definition: RoleDefinition = serde_json::from_value(wire).unwrap();
        assert!(definition.matches_id("acdd72a7"));
        assert!(definition.matches_id(&definition.id.clone()));

        let view = RoleDefinitionView::from(definition);
        assert_eq!(view.name, "Reader");
        assert_eq!(view.actions, vec!["*/read".to_string()]);
        assert!(view.not_actions.is_empty());
    }

    #[test]
    fn test_assignment_scope_from_id() {
        let assignment = RoleAssignment {
            id: "/subscriptions/s1/resourceGroups/rg/providers/Microsoft.Authorization/roleAssignments/a1"
                .to_string(),
            name: "a1".to_string(),
            resource_type: None,
            properties: RoleAssignmentProperties {
                principal_id: "p1".to_string(),
                role_definition_id: "r1".to_string(),
                scope: None,
            },
        };
        assert_eq!(assignment.scope(), "/subscriptions/s1/resourceGroups/rg");
    }

    #[test]
    fn test_create_parameters_wire_shape() {
        let params = RoleAssignmentCreateParameters::new("p1", "r1");
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({ "properties": { "roleDefinitionId": "r1", "principalId": "p1" } })
        );
    }

    #[test]
    fn test_principal_lookup_names() {
        let principal = Principal::user("id1", "Alice", "alice@contoso.com");
        assert!(principal.answers_to("ALICE@contoso.com"));
        assert!(principal.answers_to("Alice"));
        assert!(!principal.answers_to("bob@contoso.com"));
    }

    #[test]
    fn test_same_scope() {
        assert!(same_scope("/subscriptions/S1/", "/subscriptions/s1"));
        assert!(!same_scope("/subscriptions/s1", "/subscriptions/s2"));
    }
}
