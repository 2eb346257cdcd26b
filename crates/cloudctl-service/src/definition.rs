//! Service definition: which roles a service has and what each role imports,
//! exposes and requires.

use serde::{Deserialize, Serialize};

/// Kind of role hosted by a cloud service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleKind {
    Web,
    Worker,
}

impl std::fmt::Display for RoleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoleKind::Web => write!(f, "web"),
            RoleKind::Worker => write!(f, "worker"),
        }
    }
}

/// Root of `ServiceDefinition.csdef.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceDefinition {
    pub name: String,
    #[serde(default)]
    pub web_roles: Vec<RoleSpec>,
    #[serde(default)]
    pub worker_roles: Vec<RoleSpec>,
}

impl ServiceDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            web_roles: Vec::new(),
            worker_roles: Vec::new(),
        }
    }

    pub fn role(&self, name: &str) -> Option<&RoleSpec> {
        self.roles().find(|r| r.name.eq_ignore_ascii_case(name))
    }

    /// Worker roles first, then web roles.
    pub fn roles(&self) -> impl Iterator<Item = &RoleSpec> {
        self.worker_roles.iter().chain(self.web_roles.iter())
    }

    /// Worker roles first, then web roles.
    pub fn roles_mut(&mut self) -> impl Iterator<Item = &mut RoleSpec> {
        self.worker_roles.iter_mut().chain(self.web_roles.iter_mut())
    }

    /// Input endpoint ports already taken by any role.
    pub fn used_ports(&self) -> Vec<u16> {
        self.roles()
            .flat_map(|r| r.endpoints.iter().map(|e| e.port))
            .collect()
    }
}

/// One web or worker role in the definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleSpec {
    pub name: String,
    #[serde(default = "default_vm_size")]
    pub vm_size: String,
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default)]
    pub endpoints: Vec<InputEndpoint>,
    #[serde(default)]
    pub certificates: Vec<CertificateDeclaration>,
}

impl RoleSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vm_size: default_vm_size(),
            imports: Vec::new(),
            endpoints: Vec::new(),
            certificates: Vec::new(),
        }
    }

    pub fn has_import(&self, module: &str) -> bool {
        self.imports.iter().any(|m| m == module)
    }

    /// Add `module` unless it is already imported.
    pub fn add_import(&mut self, module: &str) {
        if !self.has_import(module) {
            self.imports.push(module.to_string());
        }
    }

    pub fn remove_import(&mut self, module: &str) {
        self.imports.retain(|m| m != module);
    }

    /// Insert or replace the certificate declaration with the same name.
    pub fn declare_certificate(&mut self, certificate: CertificateDeclaration) {
        self.certificates.retain(|c| c.name != certificate.name);
        self.certificates.push(certificate);
    }

    pub fn certificate(&self, name: &str) -> Option<&CertificateDeclaration> {
        self.certificates.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputEndpoint {
    pub name: String,
    pub protocol: String,
    pub port: u16,
}

/// Certificate a role expects to find installed on its instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateDeclaration {
    pub name: String,
    pub store_location: String,
    pub store_name: String,
}

fn default_vm_size() -> String {
    "Small".to_string()
}
