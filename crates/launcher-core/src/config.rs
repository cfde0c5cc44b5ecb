use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::errors::LaunchError;

/// Config file looked up next to the launcher binary.
pub const CONFIG_FILE_NAME: &str = "launcher.toml";

pub const DEFAULT_INTERPRETER: &str = "venv/bin/python3";
pub const DEFAULT_SCRIPT: &str = "src/main.py";

pub const ENV_INTERPRETER: &str = "LAUNCHER_INTERPRETER";
pub const ENV_SCRIPT: &str = "LAUNCHER_SCRIPT";
pub const ENV_MODE: &str = "LAUNCHER_MODE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaunchMode {
    /// Start the child, wait for it and relay its status.
    #[default]
    Spawn,
    /// Replace the launcher process with the child (unix only).
    Exec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalPolicy {
    /// Relay termination signals to the child while waiting on it.
    #[default]
    Forward,
    /// Leave the OS default disposition in place.
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LauncherConfig {
    #[serde(default = "default_interpreter")]
    pub interpreter: PathBuf,
    #[serde(default = "default_script")]
    pub script: PathBuf,
    #[serde(default)]
    pub mode: LaunchMode,
    #[serde(default)]
    pub signals: SignalPolicy,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            interpreter: default_interpreter(),
            script: default_script(),
            mode: LaunchMode::default(),
            signals: SignalPolicy::default(),
            env: BTreeMap::new(),
        }
    }
}

impl LauncherConfig {
    /// Loads `launcher.toml` from the install dir; a missing file means defaults.
    pub fn load(install_dir: &Path) -> Result<Self, LaunchError> {
        let path = install_dir.join(CONFIG_FILE_NAME);
        let content = match fs::read_to_string(&path) {
            Ok(value) => value,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(LaunchError::Config {
                    path,
                    message: format!("failed to read: {err}"),
                });
            }
        };

        Self::parse(&content).map_err(|message| LaunchError::Config { path, message })
    }

    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|err| err.message().to_string())
    }

    /// Applies `LAUNCHER_*` overrides through the given lookup.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self, LaunchError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_INTERPRETER) {
            self.interpreter = PathBuf::from(value);
        }
        if let Some(value) = lookup(ENV_SCRIPT) {
            self.script = PathBuf::from(value);
        }
        if let Some(value) = lookup(ENV_MODE) {
            self.mode = match value.trim().to_ascii_lowercase().as_str() {
                "spawn" => LaunchMode::Spawn,
                "exec" => LaunchMode::Exec,
                other => {
                    return Err(LaunchError::composition(format!(
                        "{ENV_MODE} must be `spawn` or `exec`, got `{other}`"
                    )));
                }
            };
        }
        Ok(self)
    }

    /// Loads the file and applies overrides from the process environment.
    pub fn from_install_dir(install_dir: &Path) -> Result<Self, LaunchError> {
        Self::load(install_dir)?.with_env_overrides(|key| std::env::var(key).ok())
    }
}

fn default_interpreter() -> PathBuf {
    PathBuf::from(DEFAULT_INTERPRETER)
}

fn default_script() -> PathBuf {
    PathBuf::from(DEFAULT_SCRIPT)
}
