//! `cloudctl role-definition get` / `list`.

use anyhow::{Context, Result};
use cloudctl_authz::PoliciesClient;
use std::io::Write;

use crate::output::{self, OutputFormat};

pub async fn get(
    client: &PoliciesClient,
    id: &str,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<()> {
    let definition = client
        .get_role_definition(id)
        .await
        .with_context(|| format!("Failed to get role definition {}", id))?;
    output::render_one(&definition, format, out)
}

/// Every role definition when `name` is empty, otherwise the one named `name`.
pub async fn list(
    client: &PoliciesClient,
    name: &str,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<()> {
    let definitions = client
        .filter_role_definitions(name)
        .await
        .context("Failed to list role definitions")?;
    output::render(&definitions, format, out)
}
