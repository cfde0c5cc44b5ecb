use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Component, Path};

use tracing::{debug, info};

use crate::config::{LaunchMode, LauncherConfig};
use crate::errors::LaunchError;
use crate::paths::{SelfPathResolver, resolve_install_dir};
use crate::spawn::{ExitInfo, ProcessSpawner};

mod plan;
pub use plan::{ChildInvocation, requires_quoting, split_command_line};


/// Exported to the child so the companion program can find bundled files.
pub const ENV_INSTALL_DIR: &str = "LAUNCHER_INSTALL_DIR";

/// A fully resolved launch: config plus the invocation it produced.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub config: LauncherConfig,
    pub invocation: ChildInvocation,
}

/// Composes interpreter, script and forwarded arguments under `install_dir`.
pub fn build_invocation(
    install_dir: &Path,
    config: &LauncherConfig,
    forwarded: Vec<OsString>,
) -> Result<ChildInvocation, LaunchError> {
    check_relative("interpreter", &config.interpreter)?;
    check_relative("script", &config.script)?;

    let mut env: BTreeMap<OsString, OsString> = config
        .env
        .iter()
        .map(|(key, value)| (OsString::from(key), OsString::from(value)))
        .collect();
    env.insert(ENV_INSTALL_DIR.into(), install_dir.as_os_str().to_os_string());

    Ok(ChildInvocation {
        interpreter: install_dir.join(&config.interpreter),
        script: install_dir.join(&config.script),
        forwarded,
        env,
    })
}

fn check_relative(what: &str, path: &Path) -> Result<(), LaunchError> {
    if path.as_os_str().is_empty() {
        return Err(LaunchError::composition(format!("{what} path is empty")));
    }
    if path.is_absolute() || path.has_root() {
        return Err(LaunchError::composition(format!(
            "{what} path must be relative to the install dir: {}",
            path.display()
        )));
    }
    if path.components().any(|c| matches!(c, Component::Prefix(_))) {
        return Err(LaunchError::composition(format!(
            "{what} path carries a drive prefix: {}",
            path.display()
        )));
    }
    Ok(())
}

/// Resolves the install dir, loads its config and builds the child invocation.
pub fn prepare(
    resolver: &dyn SelfPathResolver,
    forwarded: Vec<OsString>,
) -> Result<Prepared, LaunchError> {
    let install_dir = resolve_install_dir(resolver)?;
    let config = LauncherConfig::from_install_dir(&install_dir)?;
    prepare_with(&install_dir, config, forwarded)
}

fn prepare_with(
    install_dir: &Path,
    config: LauncherConfig,
    forwarded: Vec<OsString>,
) -> Result<Prepared, LaunchError> {
    let invocation = build_invocation(install_dir, &config, forwarded)?;
    debug!(command = %invocation.render_command_line(), "child invocation");
    Ok(Prepared { config, invocation })
}

/// Runs a prepared launch. A failed child comes back as [`LaunchError::ChildFailure`].
pub fn run(prepared: &Prepared, spawner: &dyn ProcessSpawner) -> Result<ExitInfo, LaunchError> {
    if prepared.config.mode == LaunchMode::Exec {
        #[cfg(unix)]
        return Err(crate::spawn::exec_replace(&prepared.invocation));
        #[cfg(not(unix))]
        tracing::warn!("exec mode is unix only, spawning instead");
    }

    let exit = spawner.run(&prepared.invocation, prepared.config.signals)?;
    if exit.success() {
        return Ok(exit);
    }

    if let Some(signal) = exit.signal {
        info!(signal, "child terminated by signal");
    }
    Err(LaunchError::ChildFailure {
        program: prepared.invocation.interpreter.clone(),
        code: exit.exit_code(),
    })
}

/// Resolve, compose and run in one go.
pub fn launch(
    resolver: &dyn SelfPathResolver,
    spawner: &dyn ProcessSpawner,
    forwarded: Vec<OsString>,
) -> Result<ExitInfo, LaunchError> {
    let prepared = prepare(resolver, forwarded)?;
    run(&prepared, spawner)
}
