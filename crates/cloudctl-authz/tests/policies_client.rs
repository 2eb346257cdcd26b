//! Policies client behaviour against the in-memory services.

use std::sync::Arc;

use cloudctl_authz::{
    AuthzError, FilterRoleAssignmentsOptions, InMemoryAuthorization, InMemoryDirectory,
    Permission, PoliciesClient, Principal, RoleDefinition,
};

const SUBSCRIPTION: &str = "/subscriptions/00000000-0000-0000-0000-000000000001";

fn definitions() -> Vec<RoleDefinition> {
    vec![
        RoleDefinition::new(
            SUBSCRIPTION,
            "acdd72a7-3385-48ef-bd42-f606fba81ae7",
            "Reader",
            vec![Permission {
                actions: vec!["*/read".to_string()],
                not_actions: vec![],
            }],
        ),
        RoleDefinition::new(
            SUBSCRIPTION,
            "b24988ac-6180-42a0-ab88-20f7382dd24c",
            "Contributor",
            vec![Permission {
                actions: vec!["*".to_string()],
                not_actions: vec!["Microsoft.Authorization/*/Write".to_string()],
            }],
        ),
        RoleDefinition::new(
            SUBSCRIPTION,
            "8e3af657-a8ff-443c-a75c-2fe8c4bcb635",
            "Owner",
            vec![Permission {
                actions: vec!["*".to_string()],
                not_actions: vec![],
            }],
        ),
    ]
}

fn principals() -> Vec<Principal> {
    vec![
        Principal::user("user-alice", "Alice", "alice@contoso.com"),
        Principal::user("user-bob", "Bob", "bob@contoso.com"),
    ]
}

fn setup() -> (PoliciesClient, Arc<InMemoryAuthorization>) {
    let authorization = Arc::new(InMemoryAuthorization::with_definitions(definitions()));
    let directory = Arc::new(InMemoryDirectory::new(principals()));
    let client = PoliciesClient::new(authorization.clone(), directory);
    (client, authorization)
}

fn assign(principal: &str, role: &str, scope: &str) -> FilterRoleAssignmentsOptions {
    FilterRoleAssignmentsOptions::for_principal(principal)
        .with_role(role)
        .with_scope(scope)
}

// =============================================================================
// Role definitions
// =============================================================================

#[tokio::test]
async fn filter_role_definitions_with_empty_name_returns_all() {
    let (client, _) = setup();
    let all = client.filter_role_definitions("").await.unwrap();
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn filter_role_definitions_with_valid_name_returns_one() {
    let (client, _) = setup();
    let matched = client.filter_role_definitions("Contributor").await.unwrap();
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].name, "Contributor");
    assert_eq!(matched[0].not_actions, vec!["Microsoft.Authorization/*/Write"]);
}

#[tokio::test]
async fn filter_role_definitions_with_unknown_name_fails() {
    let (client, _) = setup();
    let err = client.filter_role_definitions("Janitor").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn get_role_definition_by_guid_and_full_id() {
    let (client, _) = setup();
    let by_guid = client
        .get_role_definition("acdd72a7-3385-48ef-bd42-f606fba81ae7")
        .await
        .unwrap();
    assert_eq!(by_guid.name, "Reader");

    let by_id = client.get_role_definition(&by_guid.id).await.unwrap();
    assert_eq!(by_id, by_guid);
}

#[tokio::test]
async fn get_role_definition_unknown_is_not_found() {
    let (client, _) = setup();
    let err = client.get_role_definition("nope").await.unwrap_err();
    assert!(matches!(err, AuthzError::NotFound { kind: "role definition", .. }));
}

#[tokio::test]
async fn get_role_definition_rejects_empty_id() {
    let (client, _) = setup();
    let err = client.get_role_definition(" ").await.unwrap_err();
    assert!(matches!(err, AuthzError::InvalidArgument(_)));
}

// =============================================================================
// Role assignments
// =============================================================================

#[tokio::test]
async fn create_role_assignment_returns_authoritative_view() {
    let (client, store) = setup();

    let view = client
        .create_role_assignment(&assign("alice@contoso.com", "Reader", SUBSCRIPTION))
        .await
        .unwrap();

    assert_eq!(view.principal_id, "user-alice");
    assert_eq!(view.principal_name.as_deref(), Some("Alice"));
    assert_eq!(view.role_definition_name.as_deref(), Some("Reader"));
    assert_eq!(view.scope, SUBSCRIPTION);
    assert!(uuid::Uuid::parse_str(&view.name).is_ok());

    let stored = store.assignments();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].name, view.name);
}

#[tokio::test]
async fn create_role_assignment_generates_fresh_identifiers() {
    let (client, _) = setup();
    let options = assign("alice@contoso.com", "Reader", SUBSCRIPTION);

    let first = client.create_role_assignment(&options).await.unwrap();
    let second = client.create_role_assignment(&options).await.unwrap();
    assert_ne!(first.name, second.name);
}

#[tokio::test]
async fn create_role_assignment_unknown_principal_mutates_nothing() {
    let (client, store) = setup();

    let err = client
        .create_role_assignment(&assign("mallory@contoso.com", "Reader", SUBSCRIPTION))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthzError::NotFound { kind: "principal", .. }));
    assert!(store.assignments().is_empty());
}

#[tokio::test]
async fn create_role_assignment_unknown_role_mutates_nothing() {
    let (client, store) = setup();

    let err = client
        .create_role_assignment(&assign("alice@contoso.com", "Janitor", SUBSCRIPTION))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(store.assignments().is_empty());
}

#[tokio::test]
async fn create_role_assignment_requires_scope() {
    let (client, _) = setup();
    let options = FilterRoleAssignmentsOptions::for_principal("alice@contoso.com").with_role("Reader");

    let err = client.create_role_assignment(&options).await.unwrap_err();
    assert!(matches!(err, AuthzError::InvalidArgument(msg) if msg.contains("scope")));
}

#[tokio::test]
async fn filter_role_assignments_by_principal() {
    let (client, _) = setup();
    let rg = format!("{}/resourceGroups/web", SUBSCRIPTION);
    client
        .create_role_assignment(&assign("alice@contoso.com", "Reader", SUBSCRIPTION))
        .await
        .unwrap();
    client
        .create_role_assignment(&assign("alice@contoso.com", "Owner", &rg))
        .await
        .unwrap();
    client
        .create_role_assignment(&assign("bob@contoso.com", "Contributor", SUBSCRIPTION))
        .await
        .unwrap();

    let alice = client
        .filter_role_assignments(&FilterRoleAssignmentsOptions::for_principal("alice@contoso.com"))
        .await
        .unwrap();
    let roles: Vec<_> = alice
        .iter()
        .filter_map(|a| a.role_definition_name.as_deref())
        .collect();
    assert_eq!(roles, vec!["Reader", "Owner"]);

    let alice_in_rg = client
        .filter_role_assignments(
            &FilterRoleAssignmentsOptions::for_principal("alice@contoso.com").with_scope(&rg),
        )
        .await
        .unwrap();
    assert_eq!(alice_in_rg.len(), 1);
    assert_eq!(alice_in_rg[0].role_definition_name.as_deref(), Some("Owner"));

    let everyone = client
        .filter_role_assignments(&FilterRoleAssignmentsOptions::default())
        .await
        .unwrap();
    assert_eq!(everyone.len(), 3);
}

#[tokio::test]
async fn filter_role_assignments_without_match_is_empty() {
    let (client, _) = setup();
    let none = client
        .filter_role_assignments(&FilterRoleAssignmentsOptions::for_principal("bob@contoso.com"))
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn remove_role_assignment_deletes_first_match() {
    let (client, store) = setup();
    let created = client
        .create_role_assignment(&assign("bob@contoso.com", "Contributor", SUBSCRIPTION))
        .await
        .unwrap();

    let removed = client
        .remove_role_assignment(&assign("bob@contoso.com", "Contributor", SUBSCRIPTION))
        .await
        .unwrap();

    assert_eq!(removed.name, created.name);
    assert!(store.assignments().is_empty());
}

#[tokio::test]
async fn remove_role_assignment_without_match_is_not_found() {
    let (client, store) = setup();
    client
        .create_role_assignment(&assign("alice@contoso.com", "Reader", SUBSCRIPTION))
        .await
        .unwrap();

    let err = client
        .remove_role_assignment(&assign("bob@contoso.com", "Reader", SUBSCRIPTION))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthzError::NotFound { kind: "role assignment", .. }));
    assert_eq!(store.assignments().len(), 1);
}

#[tokio::test]
async fn filter_role_assignments_unknown_principal_is_empty() {
    let (client, _) = setup();
    client
        .create_role_assignment(&assign("alice@contoso.com", "Reader", SUBSCRIPTION))
        .await
        .unwrap();

    let none = client
        .filter_role_assignments(&FilterRoleAssignmentsOptions::for_principal("ghost@contoso.com"))
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn filter_role_assignments_unknown_role_is_empty() {
    let (client, _) = setup();
    client
        .create_role_assignment(&assign("alice@contoso.com", "Reader", SUBSCRIPTION))
        .await
        .unwrap();

    let none = client
        .filter_role_assignments(
            &FilterRoleAssignmentsOptions::for_principal("alice@contoso.com").with_role("Nobody"),
        )
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn remove_role_assignment_unknown_principal_is_not_found() {
    let (client, store) = setup();
    client
        .create_role_assignment(&assign("alice@contoso.com", "Reader", SUBSCRIPTION))
        .await
        .unwrap();

    let err = client
        .remove_role_assignment(&FilterRoleAssignmentsOptions::for_principal("ghost@contoso.com"))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthzError::NotFound { kind: "role assignment", .. }));
    assert_eq!(store.assignments().len(), 1);
}

#[tokio::test]
async fn remove_role_assignment_requires_principal() {
    let (client, store) = setup();
    client
        .create_role_assignment(&assign("alice@contoso.com", "Reader", SUBSCRIPTION))
        .await
        .unwrap();

    let err = client
        .remove_role_assignment(&FilterRoleAssignmentsOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, AuthzError::InvalidArgument(msg) if msg.contains("principal")));
    assert_eq!(store.assignments().len(), 1);
}
