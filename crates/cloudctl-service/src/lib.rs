//! # cloudctl-service
//!
//! Local cloud service projects: a service definition listing web and worker
//! roles, and two service configurations (cloud and local) holding per-role
//! settings.
//!
//! ## Operations
//!
//! | Operation | Entry point |
//! |-----------|-------------|
//! | Create a project | [`CloudServiceProject::create`] |
//! | Add a web role | [`CloudServiceProject::add_web_role`] |
//! | Add a worker role | [`CloudServiceProject::add_worker_role`] |
//! | Enable remote desktop | [`enable_remote_desktop`] |
//! | Disable remote desktop | [`disable_remote_desktop`] |
//!
//! ## Example
//!
//! ```rust,no_run
//! use cloudctl_service::{CloudServiceProject, RemoteDesktopCredentials, enable_remote_desktop};
//!
//! # fn example() -> Result<(), cloudctl_service::ServiceError> {
//! let mut project = CloudServiceProject::create(".", "NEW_SERVICE")?;
//! project.add_web_role("WebRole", 1)?;
//! enable_remote_desktop(&mut project, &RemoteDesktopCredentials::new("user", "GoodPassword!"))?;
//! # Ok(())
//! # }
//! ```

pub mod certificate;
pub mod configuration;
pub mod definition;
pub mod error;
pub mod project;
pub mod remote_desktop;

pub use certificate::RemoteAccessCertificate;
pub use configuration::{CertificateThumbprint, ConfigurationSetting, RoleSettings, ServiceConfiguration};
pub use definition::{CertificateDeclaration, InputEndpoint, RoleKind, RoleSpec, ServiceDefinition};
pub use error::ServiceError;
pub use project::{CloudServiceProject, find_service_root};
pub use remote_desktop::{
    RemoteDesktopCredentials, disable_remote_desktop, enable_remote_desktop,
};
