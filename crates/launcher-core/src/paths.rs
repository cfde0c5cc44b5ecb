use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::errors::LaunchError;

/// Directory returned when a path has no directory component.
pub const CURRENT_DIR: &str = ".";

/// Source of the running executable's absolute path.
pub trait SelfPathResolver {
    fn executable_path(&self) -> Result<PathBuf, LaunchError>;
}

/// Asks the OS for the running binary (`/proc/self/exe` on Linux).
#[derive(Debug, Default, Clone, Copy)]
pub struct CurrentExe;

impl SelfPathResolver for CurrentExe {
    fn executable_path(&self) -> Result<PathBuf, LaunchError> {
        let exe = std::env::current_exe()
            .map_err(|err| LaunchError::resolution(format!("current_exe failed: {err}")))?;
        if !exe.is_absolute() {
            return Err(LaunchError::resolution(format!(
                "executable path is not absolute: {}",
                exe.display()
            )));
        }
        Ok(exe)
    }
}

/// Drops leading and trailing whitespace and collapses inner runs to one space.
pub fn trim_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text before the last separator, `.` when there is none.
pub fn parent_dir(path: &str) -> &str {
    match path.rfind(std::path::is_separator) {
        Some(0) => &path[..1],
        Some(idx) => &path[..idx],
        None => CURRENT_DIR,
    }
}

/// Resolves the executable and returns the directory it lives in.
pub fn resolve_install_dir(resolver: &dyn SelfPathResolver) -> Result<PathBuf, LaunchError> {
    let exe = resolver.executable_path()?;
    let exe = settle_padding(exe)?;
    let dir = install_dir(&exe);
    debug!(exe = %exe.display(), install_dir = %dir.display(), "resolved install dir");
    Ok(dir)
}

pub fn install_dir(exe: &Path) -> PathBuf {
    match exe.to_str() {
        Some(text) => PathBuf::from(parent_dir(text)),
        None => match exe.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from(CURRENT_DIR),
        },
    }
}

// Exact OS results are used untouched; trimming only rescues a padded result.
fn settle_padding(exe: PathBuf) -> Result<PathBuf, LaunchError> {
    if exe.exists() {
        return Ok(exe);
    }

    if let Some(text) = exe.to_str() {
        let trimmed = trim_whitespace(text);
        if trimmed != text && Path::new(&trimmed).exists() {
            warn!(raw = %text, trimmed = %trimmed, "executable path carried padding");
            return Ok(PathBuf::from(trimmed));
        }
    }

    Err(LaunchError::resolution(format!(
        "executable path does not exist: {}",
        exe.display()
    )))
}
