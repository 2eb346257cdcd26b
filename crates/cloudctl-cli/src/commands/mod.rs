//! Command implementations for the `cloudctl` binary.
//!
//! Every command writes its result to the given writer so that tests can
//! capture it.

pub mod role_assignment;
pub mod role_definition;
pub mod service;

#[cfg(test)]
pub(crate) mod fixtures {
    use cloudctl_authz::{
        InMemoryAuthorization, InMemoryDirectory, Permission, PoliciesClient, Principal,
        RoleDefinition,
    };
    use std::sync::Arc;

    pub const SUBSCRIPTION: &str = "/subscriptions/00000000-0000-0000-0000-000000000001";

    pub fn policies_client() -> PoliciesClient {
        let definitions = vec![
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
                "8e3af657-a8ff-443c-a75c-2fe8c4bcb635",
                "Owner",
                vec![Permission {
                    actions: vec!["*".to_string()],
                    not_actions: vec![],
                }],
            ),
        ];
        let principals = vec![Principal::user("user-alice", "Alice", "alice@contoso.com")];

        PoliciesClient::new(
            Arc::new(InMemoryAuthorization::with_definitions(definitions)),
            Arc::new(InMemoryDirectory::new(principals)),
        )
    }
}
