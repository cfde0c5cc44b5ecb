//! Self-locating launcher for an interpreter bundled next to the binary.
//!
//! The launcher finds its own install directory, composes
//! `<install-dir>/<interpreter> <install-dir>/<script> ARGS...` as an argument
//! vector and runs it, relaying the child's exit status.

pub mod config;
pub mod errors;
pub mod launch;
pub mod paths;
pub mod spawn;

#[cfg(unix)]
pub mod signals;

pub use config::{LaunchMode, LauncherConfig, SignalPolicy};
pub use errors::LaunchError;
pub use launch::{ChildInvocation, Prepared, build_invocation, launch, prepare, run};
pub use paths::{CurrentExe, SelfPathResolver};
pub use spawn::{ExitInfo, OsSpawner, ProcessSpawner};
