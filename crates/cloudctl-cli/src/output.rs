//! Rendering of command results as JSON or aligned text tables.

use clap::ValueEnum;
use cloudctl_authz::{RoleAssignmentView, RoleDefinitionView};
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
}

/// A row type that knows its column headers.
pub trait Tabular {
    fn headers() -> &'static [&'static str];
    fn row(&self) -> Vec<String>;
}

/// Write `items` in the requested format. JSON output is always an array.
pub fn render<T, W>(items: &[T], format: OutputFormat, out: &mut W) -> anyhow::Result<()>
where
    T: Serialize + Tabular,
    W: Write,
{
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, items)?;
            writeln!(out)?;
        }
        OutputFormat::Table => write_table(items, out)?,
    }
    Ok(())
}

/// Single-record variant of [`render`]: JSON output is an object.
pub fn render_one<T, W>(item: &T, format: OutputFormat, out: &mut W) -> anyhow::Result<()>
where
    T: Serialize + Tabular,
    W: Write,
{
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, item)?;
            writeln!(out)?;
        }
        OutputFormat::Table => write_table(std::slice::from_ref(item), out)?,
    }
    Ok(())
}

fn write_table<T: Tabular, W: Write>(items: &[T], out: &mut W) -> std::io::Result<()> {
    let headers = T::headers();
    let rows: Vec<Vec<String>> = items.iter().map(Tabular::row).collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    write_row(out, &header_cells, &widths)?;
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    write_row(out, &rule, &widths)?;
    for row in &rows {
        write_row(out, row, &widths)?;
    }
    Ok(())
}

fn write_row<W: Write>(out: &mut W, cells: &[String], widths: &[usize]) -> std::io::Result<()> {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = width))
        .collect::<Vec<_>>()
        .join("  ");
    writeln!(out, "{}", line.trim_end())
}

impl Tabular for RoleDefinitionView {
    fn headers() -> &'static [&'static str] {
        &["NAME", "ID", "TYPE", "ACTIONS"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.id.clone(),
            self.role_type.clone().unwrap_or_default(),
            self.actions.join(","),
        ]
    }
}

impl Tabular for RoleAssignmentView {
    fn headers() -> &'static [&'static str] {
        &["NAME", "PRINCIPAL", "ROLE", "SCOPE"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.principal_name
                .clone()
                .unwrap_or_else(|| self.principal_id.clone()),
            self.role_definition_name
                .clone()
                .unwrap_or_else(|| self.role_definition_id.clone()),
            self.scope.clone(),
        ]
    }
}
