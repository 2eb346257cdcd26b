//! Enable and disable remote desktop access for every role of a project.
//!
//! Enabling imports the `RemoteAccess` module into every role, the
//! `RemoteForwarder` module into exactly one role, declares the password
//! encryption certificate and writes the account settings into both
//! configurations. Disabling only flips the enabled setting to `"false"`;
//! imports and certificates stay so that a later enable finds the same
//! layout.

use chrono::{DateTime, Duration, SecondsFormat, Utc};

use crate::certificate::RemoteAccessCertificate;
use crate::configuration::{CertificateThumbprint, RoleSettings};
use crate::definition::CertificateDeclaration;
use crate::error::ServiceError;
use crate::project::CloudServiceProject;

pub const REMOTE_ACCESS_MODULE: &str = "RemoteAccess";
pub const REMOTE_FORWARDER_MODULE: &str = "RemoteForwarder";

pub const REMOTE_ACCESS_ENABLED: &str = "Microsoft.WindowsAzure.Plugins.RemoteAccess.Enabled";
pub const REMOTE_ACCESS_USERNAME: &str =
    "Microsoft.WindowsAzure.Plugins.RemoteAccess.AccountUsername";
pub const REMOTE_ACCESS_PASSWORD: &str =
    "Microsoft.WindowsAzure.Plugins.RemoteAccess.AccountEncryptedPassword";
pub const REMOTE_ACCESS_EXPIRATION: &str =
    "Microsoft.WindowsAzure.Plugins.RemoteAccess.AccountExpiration";
pub const REMOTE_FORWARDER_ENABLED: &str = "Microsoft.WindowsAzure.Plugins.RemoteForwarder.Enabled";
pub const PASSWORD_ENCRYPTION_CERTIFICATE: &str =
    "Microsoft.WindowsAzure.Plugins.RemoteAccess.PasswordEncryption";

const MIN_PASSWORD_LEN: usize = 6;

/// Account settings applied by [`enable_remote_desktop`].
#[derive(Debug, Clone)]
pub struct RemoteDesktopCredentials {
    pub username: String,
    pub password: String,
    /// Defaults to one year from now.
    pub expiration: Option<DateTime<Utc>>,
}

impl RemoteDesktopCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            expiration: None,
        }
    }

    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.username.trim().is_empty() {
            return Err(ServiceError::InvalidCredentials(
                "username must not be empty".to_string(),
            ));
        }
        validate_password(&self.password)
    }
}

/// At least six characters drawn from three of: lower case, upper case,
/// digits, symbols.
pub fn validate_password(password: &str) -> Result<(), ServiceError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ServiceError::InvalidCredentials(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let classes = [
        password.chars().any(|c| c.is_lowercase()),
        password.chars().any(|c| c.is_uppercase()),
        password.chars().any(|c| c.is_numeric()),
        password
            .chars()
            .any(|c| !c.is_alphanumeric() && !c.is_whitespace()),
    ];
    if classes.iter().filter(|present| **present).count() < 3 {
        return Err(ServiceError::InvalidCredentials(
            "password must contain three of: lower case, upper case, digit, symbol".to_string(),
        ));
    }
    Ok(())
}

/// Name of the role that should carry the forwarder: the first worker role,
/// otherwise the first web role.
pub fn forwarder_role(project: &CloudServiceProject) -> Option<String> {
    project.definition.roles().next().map(|r| r.name.clone())
}

pub fn enable_remote_desktop(
    project: &mut CloudServiceProject,
    credentials: &RemoteDesktopCredentials,
) -> Result<(), ServiceError> {
    credentials.validate()?;

    let certificate = RemoteAccessCertificate::load_or_create(project.root())?;
    let encrypted_password = certificate.encrypt(&credentials.password)?;
    let expiration = credentials
        .expiration
        .unwrap_or_else(|| Utc::now() + Duration::days(365))
        .to_rfc3339_opts(SecondsFormat::Secs, true);
    let forwarder = forwarder_role(project);

    for role in project.definition.roles_mut() {
        role.add_import(REMOTE_ACCESS_MODULE);
        if forwarder.as_deref() == Some(role.name.as_str()) {
            role.add_import(REMOTE_FORWARDER_MODULE);
        } else {
            role.remove_import(REMOTE_FORWARDER_MODULE);
        }
        role.declare_certificate(CertificateDeclaration {
            name: PASSWORD_ENCRYPTION_CERTIFICATE.to_string(),
            store_location: "LocalMachine".to_string(),
            store_name: "My".to_string(),
        });
    }

    for config in project.configurations_mut() {
        for role in &mut config.roles {
            role.set_setting(REMOTE_ACCESS_ENABLED, "true");
            role.set_setting(REMOTE_ACCESS_USERNAME, credentials.username.as_str());
            role.set_setting(REMOTE_ACCESS_PASSWORD, encrypted_password.as_str());
            role.set_setting(REMOTE_ACCESS_EXPIRATION, expiration.as_str());
            if is_forwarder(role, forwarder.as_deref()) {
                role.set_setting(REMOTE_FORWARDER_ENABLED, "true");
            } else {
                role.remove_setting(REMOTE_FORWARDER_ENABLED);
            }
            role.set_certificate(CertificateThumbprint {
                name: PASSWORD_ENCRYPTION_CERTIFICATE.to_string(),
                thumbprint: certificate.thumbprint().to_string(),
                thumbprint_algorithm: "sha1".to_string(),
            });
        }
    }

    project.save()?;
    tracing::info!(
        username = %credentials.username,
        forwarder = forwarder.as_deref().unwrap_or("<none>"),
        "Enabled remote desktop"
    );
    Ok(())
}

/// Set the remote access flag to `"false"` on every role of both
/// configurations. Idempotent; a project without roles is left unchanged.
pub fn disable_remote_desktop(project: &mut CloudServiceProject) -> Result<(), ServiceError> {
    let mut roles = 0usize;
    for config in project.configurations_mut() {
        for role in &mut config.roles {
            role.set_setting(REMOTE_ACCESS_ENABLED, "false");
            roles += 1;
        }
    }

    project.save()?;
    tracing::info!(roles, "Disabled remote desktop");
    Ok(())
}

fn is_forwarder(role: &RoleSettings, forwarder: Option<&str>) -> bool {
    forwarder.is_some_and(|f| role.name.eq_ignore_ascii_case(f))
}
