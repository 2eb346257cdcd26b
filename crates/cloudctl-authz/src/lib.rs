//! cloudctl Authorization
//!
//! Role definitions and role assignments managed through a Resource Manager
//! authorization endpoint. Principal names are resolved through a directory
//! (graph) endpoint.
//!
//! The [`PoliciesClient`] holds two collaborators behind traits:
//!
//! - [`AuthorizationManagement`]: role definition get/list, role assignment
//!   create/get/list/delete. [`ArmAuthorizationClient`] talks REST,
//!   [`InMemoryAuthorization`] keeps everything in process.
//! - [`PrincipalDirectory`]: name → principal and id → principal.
//!   [`GraphDirectoryClient`] talks REST, [`InMemoryDirectory`] serves a
//!   fixed list.

pub mod arm;
pub mod client;
pub mod error;
pub mod graph;
pub mod management;
pub mod memory;
pub mod model;

pub use arm::ArmAuthorizationClient;
pub use client::PoliciesClient;
pub use error::AuthzError;
pub use graph::GraphDirectoryClient;
pub use management::{AuthorizationManagement, PrincipalDirectory};
pub use memory::{InMemoryAuthorization, InMemoryDirectory};
pub use model::{
    FilterRoleAssignmentsOptions, Permission, Principal, PrincipalKind, RoleAssignment,
    RoleAssignmentView, RoleDefinition, RoleDefinitionView,
};
