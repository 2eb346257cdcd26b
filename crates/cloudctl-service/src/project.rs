//! Cloud service project on disk.
//!
//! A project is a directory holding:
//!
//! - **ServiceDefinition.csdef.yaml**: roles, imports, endpoints, certificates
//! - **ServiceConfiguration.Cloud.cscfg.yaml**: settings used when deployed
//! - **ServiceConfiguration.Local.cscfg.yaml**: settings used by the emulator
//! - one directory per role

use std::fs;
use std::path::{Path, PathBuf};

use crate::configuration::{RoleSettings, ServiceConfiguration};
use crate::definition::{InputEndpoint, RoleKind, RoleSpec, ServiceDefinition};
use crate::error::ServiceError;

pub const DEFINITION_FILE: &str = "ServiceDefinition.csdef.yaml";
pub const CLOUD_CONFIG_FILE: &str = "ServiceConfiguration.Cloud.cscfg.yaml";
pub const LOCAL_CONFIG_FILE: &str = "ServiceConfiguration.Local.cscfg.yaml";

const FIRST_WEB_PORT: u16 = 80;

/// A loaded service project.
#[derive(Debug, Clone)]
pub struct CloudServiceProject {
    root: PathBuf,
    pub definition: ServiceDefinition,
    pub cloud_config: ServiceConfiguration,
    pub local_config: ServiceConfiguration,
}

impl CloudServiceProject {
    /// Create `parent/name` and write an empty project into it.
    pub fn create(parent: impl AsRef<Path>, name: &str) -> Result<Self, ServiceError> {
        validate_name("service", name)?;
        let root = parent.as_ref().join(name);
        if root.join(DEFINITION_FILE).exists() {
            return Err(ServiceError::AlreadyExists(root));
        }
        fs::create_dir_all(&root)?;

        let project = Self {
            root,
            definition: ServiceDefinition::new(name),
            cloud_config: ServiceConfiguration::new(name),
            local_config: ServiceConfiguration::new(name),
        };
        project.save()?;

        tracing::info!(service = name, root = %project.root.display(), "Created service project");
        Ok(project)
    }

    /// Load the project whose definition file lives directly in `root`.
    pub fn load(root: impl AsRef<Path>) -> Result<Self, ServiceError> {
        let root = root.as_ref().to_path_buf();
        let definition_path = root.join(DEFINITION_FILE);
        if !definition_path.is_file() {
            return Err(ServiceError::NotAServiceProject(root));
        }

        Ok(Self {
            definition: read_yaml(&definition_path)?,
            cloud_config: read_yaml(&root.join(CLOUD_CONFIG_FILE))?,
            local_config: read_yaml(&root.join(LOCAL_CONFIG_FILE))?,
            root,
        })
    }

    /// Load the project containing `start`, walking up its ancestors.
    pub fn discover(start: impl AsRef<Path>) -> Result<Self, ServiceError> {
        let start = start.as_ref();
        let root = find_service_root(start)
            .ok_or_else(|| ServiceError::NotAServiceProject(start.to_path_buf()))?;
        tracing::debug!(root = %root.display(), "Found service project");
        Self::load(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write the definition and both configurations. Every file is staged
    /// next to its target first; targets are only replaced once all three
    /// staged writes succeeded.
    pub fn save(&self) -> Result<(), ServiceError> {
        let files = [
            (DEFINITION_FILE, serde_yaml::to_string(&self.definition)?),
            (CLOUD_CONFIG_FILE, serde_yaml::to_string(&self.cloud_config)?),
            (LOCAL_CONFIG_FILE, serde_yaml::to_string(&self.local_config)?),
        ];

        let mut staged = Vec::with_capacity(files.len());
        for (name, content) in &files {
            let path = staging_path(&self.root.join(name));
            if let Err(e) = fs::write(&path, content) {
                for path in &staged {
                    let _ = fs::remove_file(path);
                }
                return Err(e.into());
            }
            staged.push(path);
        }

        for ((name, _), path) in files.iter().zip(&staged) {
            fs::rename(path, self.root.join(name))?;
        }
        Ok(())
    }

    /// Both configurations, cloud first.
    pub fn configurations(&self) -> [&ServiceConfiguration; 2] {
        [&self.cloud_config, &self.local_config]
    }

    pub fn configurations_mut(&mut self) -> [&mut ServiceConfiguration; 2] {
        [&mut self.cloud_config, &mut self.local_config]
    }

    pub fn add_web_role(&mut self, name: &str, instances: u32) -> Result<&RoleSpec, ServiceError> {
        self.add_role(RoleKind::Web, name, instances)
    }

    pub fn add_worker_role(
        &mut self,
        name: &str,
        instances: u32,
    ) -> Result<&RoleSpec, ServiceError> {
        self.add_role(RoleKind::Worker, name, instances)
    }

    /// Add a role to the definition and to both configurations, create its
    /// directory and save the project.
    pub fn add_role(
        &mut self,
        kind: RoleKind,
        name: &str,
        instances: u32,
    ) -> Result<&RoleSpec, ServiceError> {
        validate_name("role", name)?;
        if instances == 0 {
            return Err(ServiceError::InvalidInstanceCount(instances));
        }
        if self.definition.role(name).is_some() {
            return Err(ServiceError::DuplicateRole(name.to_string()));
        }

        let mut role = RoleSpec::new(name);
        if kind == RoleKind::Web {
            let used = self.definition.used_ports();
            let port = (FIRST_WEB_PORT..=u16::MAX)
                .find(|p| !used.contains(p))
                .unwrap_or(FIRST_WEB_PORT);
            role.endpoints.push(InputEndpoint {
                name: "Endpoint1".to_string(),
                protocol: "http".to_string(),
                port,
            });
        }

        for config in self.configurations_mut() {
            config.roles.push(RoleSettings::new(name, instances));
        }
        fs::create_dir_all(self.root.join(name))?;

        let roles = match kind {
            RoleKind::Web => &mut self.definition.web_roles,
            RoleKind::Worker => &mut self.definition.worker_roles,
        };
        roles.push(role);
        self.save()?;

        tracing::info!(role = name, kind = %kind, instances, "Added role");

        let roles = match kind {
            RoleKind::Web => &self.definition.web_roles,
            RoleKind::Worker => &self.definition.worker_roles,
        };
        Ok(&roles[roles.len() - 1])
    }
}

/// Nearest directory at or above `start` that holds a service definition.
pub fn find_service_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(DEFINITION_FILE).is_file())
        .map(Path::to_path_buf)
}

/// Service and role names: ASCII letters, digits, `-` and `_`, starting with
/// a letter, at most 63 characters.
pub fn validate_name(kind: &'static str, name: &str) -> Result<(), ServiceError> {
    let invalid = |reason| ServiceError::InvalidName {
        kind,
        name: name.to_string(),
        reason,
    };

    if name.is_empty() {
        return Err(invalid("must not be empty"));
    }
    if name.len() > 63 {
        return Err(invalid("must be at most 63 characters"));
    }
    if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return Err(invalid("must start with a letter"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(invalid("may only contain letters, digits, '-' and '_'"));
    }
    Ok(())
}

fn read_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ServiceError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&content)?)
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_create_and_reload() {
        let dir = tempdir().unwrap();
        let project = CloudServiceProject::create(dir.path(), "NEW_SERVICE").unwrap();
        assert!(project.root().join(DEFINITION_FILE).exists());
        assert!(project.root().join(CLOUD_CONFIG_FILE).exists());
        assert!(project.root().join(LOCAL_CONFIG_FILE).exists());

        let loaded = CloudServiceProject::load(project.root()).unwrap();
        assert_eq!(loaded.definition.name, "NEW_SERVICE");
        assert!(loaded.cloud_config.roles.is_empty());
    }

    #[test]
    fn test_create_twice_fails() {
        let dir = tempdir().unwrap();
        CloudServiceProject::create(dir.path(), "svc").unwrap();
        let err = CloudServiceProject::create(dir.path(), "svc").unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyExists(_)));
    }

    #[test]
    fn test_discover_from_role_directory() {
        let dir = tempdir().unwrap();
        let mut project = CloudServiceProject::create(dir.path(), "svc").unwrap();
        project.add_web_role("WebRole", 1).unwrap();

        let found = CloudServiceProject::discover(project.root().join("WebRole")).unwrap();
        assert_eq!(found.root(), project.root());
        assert_eq!(found.definition.web_roles.len(), 1);
    }

    #[test]
    fn test_discover_outside_project() {
        let dir = tempdir().unwrap();
        let err = CloudServiceProject::discover(dir.path()).unwrap_err();
        assert!(matches!(err, ServiceError::NotAServiceProject(_)));
    }

    #[test]
    fn test_add_roles() {
        let dir = tempdir().unwrap();
        let mut project = CloudServiceProject::create(dir.path(), "svc").unwrap();

        let web = project.add_web_role("WebRole", 2).unwrap();
        assert_eq!(web.endpoints[0].port, 80);
        let web2 = project.add_web_role("WebRole2", 1).unwrap();
        assert_eq!(web2.endpoints[0].port, 81);
        let worker = project.add_worker_role("WorkerRole", 3).unwrap();
        assert!(worker.endpoints.is_empty());

        let loaded = CloudServiceProject::load(project.root()).unwrap();
        for config in loaded.configurations() {
            assert_eq!(config.roles.len(), 3);
            assert_eq!(config.role("WebRole").unwrap().instances, 2);
            assert_eq!(config.role("WorkerRole").unwrap().instances, 3);
        }
        assert!(project.root().join("WorkerRole").is_dir());
    }

    #[test]
    fn test_add_role_rejects_duplicates_and_zero_instances() {
        let dir = tempdir().unwrap();
        let mut project = CloudServiceProject::create(dir.path(), "svc").unwrap();
        project.add_web_role("WebRole", 1).unwrap();

        assert!(matches!(
            project.add_worker_role("webrole", 1),
            Err(ServiceError::DuplicateRole(_))
        ));
        assert!(matches!(
            project.add_worker_role("WorkerRole", 0),
            Err(ServiceError::InvalidInstanceCount(0))
        ));
    }

    #[test]
    fn test_failed_save_leaves_files_consistent() {
        let dir = tempdir().unwrap();
        let mut project = CloudServiceProject::create(dir.path(), "svc").unwrap();
        fs::create_dir(staging_path(&project.root().join(LOCAL_CONFIG_FILE))).unwrap();

        let err = project.add_web_role("WebRole", 1).unwrap_err();
        assert!(matches!(err, ServiceError::Io(_)));

        let loaded = CloudServiceProject::load(project.root()).unwrap();
        assert!(loaded.definition.web_roles.is_empty());
        assert!(loaded.cloud_config.roles.is_empty());
        assert!(!staging_path(&project.root().join(DEFINITION_FILE)).exists());
        assert!(!staging_path(&project.root().join(CLOUD_CONFIG_FILE)).exists());
    }

    #[test]
    fn test_save_leaves_no_staging_files() {
        let dir = tempdir().unwrap();
        let project = CloudServiceProject::create(dir.path(), "svc").unwrap();
        project.save().unwrap();

        let leftovers = fs::read_dir(project.root())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("role", "WebRole_1").is_ok());
        assert!(validate_name("role", "").is_err());
        assert!(validate_name("role", "1Role").is_err());
        assert!(validate_name("role", "web role").is_err());
        assert!(validate_name("role", &"a".repeat(64)).is_err());
    }
}
