use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Exit status used when the launcher's own path or install dir can't be found.
pub const EXIT_RESOLUTION: i32 = 71;
/// Exit status for an invalid child invocation.
pub const EXIT_COMPOSITION: i32 = 65;
/// Exit status for an unreadable or malformed `launcher.toml`.
pub const EXIT_CONFIG: i32 = 78;
/// Exit status when the interpreter does not exist.
pub const EXIT_NOT_FOUND: i32 = 127;
/// Exit status when the interpreter exists but could not be started.
pub const EXIT_CANNOT_EXECUTE: i32 = 126;
/// Exit status when the child started but its status could not be collected.
pub const EXIT_WAIT: i32 = 70;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("failed to resolve launcher location: {0}")]
    Resolution(String),

    #[error("invalid child invocation: {0}")]
    Composition(String),

    #[error("invalid config {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("lost track of {program} while waiting for it: {source}")]
    Wait {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{program} exited with status {code}")]
    ChildFailure { program: PathBuf, code: i32 },
}

impl LaunchError {
    pub fn resolution(message: impl Into<String>) -> Self {
        Self::Resolution(message.into())
    }

    pub fn composition(message: impl Into<String>) -> Self {
        Self::Composition(message.into())
    }

    pub fn spawn(program: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Spawn {
            program: program.into(),
            source,
        }
    }

    pub fn wait(program: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Wait {
            program: program.into(),
            source,
        }
    }

    /// Process exit status the launcher should end with for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            LaunchError::Resolution(_) => EXIT_RESOLUTION,
            LaunchError::Composition(_) => EXIT_COMPOSITION,
            LaunchError::Config { .. } => EXIT_CONFIG,
            LaunchError::Spawn { source, .. } => match source.kind() {
                io::ErrorKind::NotFound => EXIT_NOT_FOUND,
                _ => EXIT_CANNOT_EXECUTE,
            },
            LaunchError::Wait { .. } => EXIT_WAIT,
            LaunchError::ChildFailure { code, .. } => *code,
        }
    }
}
