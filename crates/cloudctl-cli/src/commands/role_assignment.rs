//! `cloudctl role-assignment new` / `list` / `remove`.

use anyhow::{Context, Result};
use cloudctl_authz::{FilterRoleAssignmentsOptions, PoliciesClient};
use std::io::Write;

use crate::output::{self, OutputFormat};

/// Options from optional command line values.
pub fn options(
    principal: Option<String>,
    role: Option<String>,
    scope: Option<String>,
) -> FilterRoleAssignmentsOptions {
    FilterRoleAssignmentsOptions {
        principal_name: principal,
        role_definition_name: role,
        scope,
    }
}

pub async fn new(
    client: &PoliciesClient,
    principal: &str,
    role: &str,
    scope: &str,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<()> {
    let options = FilterRoleAssignmentsOptions::for_principal(principal)
        .with_role(role)
        .with_scope(scope);
    let assignment = client
        .create_role_assignment(&options)
        .await
        .with_context(|| format!("Failed to assign {} to {} at {}", role, principal, scope))?;
    output::render_one(&assignment, format, out)
}

pub async fn list(
    client: &PoliciesClient,
    options: &FilterRoleAssignmentsOptions,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<()> {
    let assignments = client
        .filter_role_assignments(options)
        .await
        .context("Failed to list role assignments")?;
    output::render(&assignments, format, out)
}

pub async fn remove(
    client: &PoliciesClient,
    options: &FilterRoleAssignmentsOptions,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<()> {
    let removed = client
        .remove_role_assignment(options)
        .await
        .context("Failed to remove role assignment")?;
    if format == OutputFormat::Table {
        writeln!(out, "Removed role assignment {}", removed.name)?;
    }
    output::render_one(&removed, format, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::{SUBSCRIPTION, policies_client};

    #[tokio::test]
    async fn test_new_list_remove() {
        let client = policies_client();

        let mut out = Vec::new();
        new(&client, "alice@contoso.com", "Reader", SUBSCRIPTION, OutputFormat::Json, &mut out)
            .await
            .unwrap();
        let created: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(created["principal_name"], "Alice");
        assert_eq!(created["role_definition_name"], "Reader");
        assert_eq!(created["scope"], SUBSCRIPTION);

        let mut out = Vec::new();
        let filter = options(Some("alice@contoso.com".to_string()), None, None);
        list(&client, &filter, OutputFormat::Table, &mut out).await.unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("Alice"));

        let mut out = Vec::new();
        remove(&client, &filter, OutputFormat::Table, &mut out).await.unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with(&format!("Removed role assignment {}", created["name"].as_str().unwrap())));

        let mut out = Vec::new();
        list(&client, &filter, OutputFormat::Json, &mut out).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert!(value.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_without_match_fails() {
        let client = policies_client();
        let filter = options(Some("alice@contoso.com".to_string()), Some("Owner".to_string()), None);

        let err = remove(&client, &filter, OutputFormat::Table, &mut Vec::new())
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("not found"));
    }
}
