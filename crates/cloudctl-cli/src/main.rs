use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use cloudctl_authz::PoliciesClient;
use cloudctl_core::{CloudctlConfig, ConfigError};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{role_assignment, role_definition, service};
use output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "cloudctl", version, about = "Cloud service projects and role-based access control")]
struct Cli {
    /// Configuration file (defaults to $CLOUDCTL_CONFIG, then ./cloudctl.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Cloud service project operations
    Service {
        #[command(subcommand)]
        cmd: ServiceCommand,
    },

    /// Role definitions of the subscription
    RoleDefinition {
        #[command(subcommand)]
        cmd: RoleDefinitionCommand,
    },

    /// Role assignments
    RoleAssignment {
        #[command(subcommand)]
        cmd: RoleAssignmentCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ServiceCommand {
    /// Create a new service project
    New {
        name: String,
        /// Parent directory (defaults to the working directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// Add a web role to the current project
    AddWebRole {
        #[arg(long)]
        name: String,
        #[arg(long, default_value_t = 1)]
        instances: u32,
    },

    /// Add a worker role to the current project
    AddWorkerRole {
        #[arg(long)]
        name: String,
        #[arg(long, default_value_t = 1)]
        instances: u32,
    },

    /// Enable remote desktop on every role of the current project
    EnableRemoteDesktop {
        #[arg(long)]
        username: String,
        #[arg(long, env = "CLOUDCTL_REMOTE_DESKTOP_PASSWORD", hide_env_values = true)]
        password: String,
        /// Account expiration, RFC 3339 (defaults to one year from now)
        #[arg(long)]
        expiration: Option<DateTime<Utc>>,
    },

    /// Disable remote desktop on every role of the current project
    DisableRemoteDesktop,
}

#[derive(Subcommand, Debug)]
enum RoleDefinitionCommand {
    /// Show one role definition by id
    Get { id: String },

    /// List role definitions, or the one named --name
    List {
        #[arg(long, default_value = "")]
        name: String,
    },
}

#[derive(Subcommand, Debug)]
enum RoleAssignmentCommand {
    /// Assign a role to a principal at a scope
    New {
        #[arg(long)]
        principal: String,
        #[arg(long)]
        role: String,
        #[arg(long)]
        scope: String,
    },

    /// List role assignments
    List {
        #[arg(long)]
        principal: Option<String>,
        #[arg(long)]
        role: Option<String>,
        #[arg(long)]
        scope: Option<String>,
    },

    /// Remove the first role assignment matching the filter
    Remove {
        #[arg(long)]
        principal: String,
        #[arg(long)]
        role: Option<String>,
        #[arg(long)]
        scope: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Only the authorization commands need the configuration; service
    // commands work on local files and run even when it is broken.
    let config = CloudctlConfig::load(cli.config.as_deref());
    init_tracing(log_level(config.as_ref().ok(), cli.verbose));
    if let Err(e) = &config {
        tracing::debug!(error = %e, "Configuration not loaded");
    }

    let mut out = io::stdout().lock();
    run(cli, config, &mut out).await
}

async fn run(
    cli: Cli,
    config: Result<CloudctlConfig, ConfigError>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let format = cli.output;

    match cli.cmd {
        Command::Service { cmd } => run_service(cmd, format, out)?,

        Command::RoleDefinition { cmd } => {
            let client = policies_client(config)?;
            match cmd {
                RoleDefinitionCommand::Get { id } => {
                    tracing::debug!(id = %id, "Getting role definition");
                    role_definition::get(&client, &id, format, out).await?
                }
                RoleDefinitionCommand::List { name } => {
                    tracing::debug!(name = %name, "Listing role definitions");
                    role_definition::list(&client, &name, format, out).await?
                }
            }
        }

        Command::RoleAssignment { cmd } => {
            let client = policies_client(config)?;
            match cmd {
                RoleAssignmentCommand::New {
                    principal,
                    role,
                    scope,
                } => role_assignment::new(&client, &principal, &role, &scope, format, out).await?,
                RoleAssignmentCommand::List {
                    principal,
                    role,
                    scope,
                } => {
                    let options = role_assignment::options(principal, role, scope);
                    tracing::debug!(?options, "Listing role assignments");
                    role_assignment::list(&client, &options, format, out).await?
                }
                RoleAssignmentCommand::Remove {
                    principal,
                    role,
                    scope,
                } => {
                    let options = role_assignment::options(Some(principal), role, scope);
                    tracing::debug!(?options, "Removing role assignment");
                    role_assignment::remove(&client, &options, format, out).await?
                }
            }
        }
    }

    Ok(())
}

fn run_service(cmd: ServiceCommand, format: OutputFormat, out: &mut impl Write) -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("Failed to read working directory")?;
    tracing::debug!(cwd = %cwd.display(), "Running service command");

    match cmd {
        ServiceCommand::New { name, path } => {
            let parent = path.unwrap_or(cwd);
            service::new_service(&parent, &name, format, out)
        }
        ServiceCommand::AddWebRole { name, instances } => {
            service::add_web_role(&cwd, &name, instances, format, out)
        }
        ServiceCommand::AddWorkerRole { name, instances } => {
            service::add_worker_role(&cwd, &name, instances, format, out)
        }
        ServiceCommand::EnableRemoteDesktop {
            username,
            password,
            expiration,
        } => service::enable_remote_desktop(&cwd, &username, &password, expiration, format, out),
        ServiceCommand::DisableRemoteDesktop => service::disable_remote_desktop(&cwd, format, out),
    }
}

/// `-v` forces debug, otherwise the configured level, otherwise info.
fn log_level(config: Option<&CloudctlConfig>, verbose: bool) -> &str {
    if verbose {
        return "debug";
    }
    config.map(|c| c.logging.level.as_str()).unwrap_or("info")
}

/// Logs go to stderr so that JSON output on stdout stays parseable.
/// `RUST_LOG` wins over the computed level.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn policies_client(config: Result<CloudctlConfig, ConfigError>) -> anyhow::Result<PoliciesClient> {
    let config = config.context("Failed to load configuration")?;
    tracing::debug!(
        subscription = config.subscription_id.as_deref().unwrap_or("<unset>"),
        endpoint = %config.resource_manager.endpoint,
        "Configuring authorization client"
    );
    PoliciesClient::from_config(&config).context("Failed to configure the authorization client")
}
