//! Error types for the service project crate.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while creating or editing a service project.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No service definition was found at or above the given directory.
    #[error("not a cloud service project: {}", .0.display())]
    NotAServiceProject(PathBuf),

    /// A project already exists at the target directory.
    #[error("a cloud service project already exists at {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("invalid {kind} name '{name}': {reason}")]
    InvalidName {
        kind: &'static str,
        name: String,
        reason: &'static str,
    },

    #[error("role '{0}' already exists in this service")]
    DuplicateRole(String),

    #[error("instance count must be at least 1, got {0}")]
    InvalidInstanceCount(u32),

    /// Remote desktop username or password rejected.
    #[error("invalid remote desktop credentials: {0}")]
    InvalidCredentials(String),

    #[error("certificate error: {0}")]
    Certificate(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
