//! Service project commands.
//!
//! `cloudctl service new` - Create a project.
//! `cloudctl service add-web-role` / `add-worker-role` - Add a role.
//! `cloudctl service enable-remote-desktop` / `disable-remote-desktop` -
//! Toggle remote desktop for every role.
//!
//! All commands except `new` locate the project by walking up from the
//! working directory, then print the project's roles.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use cloudctl_service::remote_desktop::{
    REMOTE_ACCESS_ENABLED, REMOTE_FORWARDER_ENABLED, forwarder_role,
};
use cloudctl_service::{CloudServiceProject, RemoteDesktopCredentials, RoleKind};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::output::{self, OutputFormat, Tabular};

/// One row of the project summary.
#[derive(Debug, Serialize)]
pub struct RoleSummary {
    pub service: String,
    pub role: String,
    pub kind: RoleKind,
    pub instances: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    pub remote_desktop: bool,
    pub forwarder: bool,
}

impl Tabular for RoleSummary {
    fn headers() -> &'static [&'static str] {
        &["ROLE", "KIND", "INSTANCES", "PORT", "REMOTE DESKTOP"]
    }

    fn row(&self) -> Vec<String> {
        let remote_desktop = match (self.remote_desktop, self.forwarder) {
            (true, true) => "enabled (forwarder)",
            (true, false) => "enabled",
            (false, _) => "disabled",
        };
        vec![
            self.role.clone(),
            self.kind.to_string(),
            self.instances.to_string(),
            self.port.map(|p| p.to_string()).unwrap_or_default(),
            remote_desktop.to_string(),
        ]
    }
}

pub fn new_service(
    parent: &Path,
    name: &str,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<()> {
    let project = CloudServiceProject::create(parent, name)
        .with_context(|| format!("Failed to create service {:?} in {}", name, parent.display()))?;
    if format == OutputFormat::Table {
        writeln!(out, "Created service {} at {}", name, project.root().display())?;
    }
    print_summary(&project, format, out)
}

pub fn add_web_role(
    cwd: &Path,
    name: &str,
    instances: u32,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<()> {
    add_role(cwd, RoleKind::Web, name, instances, format, out)
}

pub fn add_worker_role(
    cwd: &Path,
    name: &str,
    instances: u32,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<()> {
    add_role(cwd, RoleKind::Worker, name, instances, format, out)
}

fn add_role(
    cwd: &Path,
    kind: RoleKind,
    name: &str,
    instances: u32,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<()> {
    let mut project = CloudServiceProject::discover(cwd)?;
    project
        .add_role(kind, name, instances)
        .with_context(|| format!("Failed to add {} role {:?}", kind, name))?;
    print_summary(&project, format, out)
}

pub fn enable_remote_desktop(
    cwd: &Path,
    username: &str,
    password: &str,
    expiration: Option<DateTime<Utc>>,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<()> {
    let mut project = CloudServiceProject::discover(cwd)?;
    let mut credentials = RemoteDesktopCredentials::new(username, password);
    credentials.expiration = expiration;

    cloudctl_service::enable_remote_desktop(&mut project, &credentials)
        .context("Failed to enable remote desktop")?;
    print_summary(&project, format, out)
}

pub fn disable_remote_desktop(cwd: &Path, format: OutputFormat, out: &mut impl Write) -> Result<()> {
    let mut project = CloudServiceProject::discover(cwd)?;
    cloudctl_service::disable_remote_desktop(&mut project)
        .context("Failed to disable remote desktop")?;
    print_summary(&project, format, out)
}

fn print_summary(
    project: &CloudServiceProject,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<()> {
    output::render(&summarize(project), format, out)
}

/// Roles in definition order (web roles, then worker roles) with their
/// cloud configuration state.
pub fn summarize(project: &CloudServiceProject) -> Vec<RoleSummary> {
    let forwarder = forwarder_role(project);
    let service = project.definition.name.clone();

    let web = project
        .definition
        .web_roles
        .iter()
        .map(|r| (RoleKind::Web, r));
    let worker = project
        .definition
        .worker_roles
        .iter()
        .map(|r| (RoleKind::Worker, r));

    web.chain(worker)
        .map(|(kind, role)| {
            let settings = project.cloud_config.role(&role.name);
            let enabled = |key: &str| settings.and_then(|s| s.setting(key)) == Some("true");
            RoleSummary {
                service: service.clone(),
                role: role.name.clone(),
                kind,
                instances: settings.map(|s| s.instances).unwrap_or(0),
                port: role.endpoints.first().map(|e| e.port),
                remote_desktop: enabled(REMOTE_ACCESS_ENABLED),
                forwarder: forwarder.as_deref() == Some(role.name.as_str())
                    && enabled(REMOTE_FORWARDER_ENABLED),
            }
        })
        .collect()
}
