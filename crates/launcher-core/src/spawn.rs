use std::process::{Command, ExitStatus};

use tracing::{debug, info, warn};

use crate::config::SignalPolicy;
use crate::errors::LaunchError;
use crate::launch::ChildInvocation;

/// How the child ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitInfo {
    pub code: Option<i32>,
    pub signal: Option<i32>,
}

impl ExitInfo {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Status the launcher itself should exit with; signal deaths map to 128+N.
    pub fn exit_code(&self) -> i32 {
        match (self.code, self.signal) {
            (Some(code), _) => code,
            (None, Some(signal)) => 128 + signal,
            (None, None) => 1,
        }
    }
}

impl From<ExitStatus> for ExitInfo {
    fn from(status: ExitStatus) -> Self {
        #[cfg(unix)]
        let signal = {
            use std::os::unix::process::ExitStatusExt;
            status.signal()
        };
        #[cfg(not(unix))]
        let signal = None;

        Self {
            code: status.code(),
            signal,
        }
    }
}

pub trait ProcessSpawner {
    /// Runs the child to completion with inherited stdio.
    fn run(&self, invocation: &ChildInvocation, signals: SignalPolicy)
        -> Result<ExitInfo, LaunchError>;
}

/// Spawns a real OS process from the argument vector, no shell involved.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsSpawner;

impl ProcessSpawner for OsSpawner {
    fn run(
        &self,
        invocation: &ChildInvocation,
        signals: SignalPolicy,
    ) -> Result<ExitInfo, LaunchError> {
        #[cfg(not(unix))]
        let _ = signals;
        // Installed before the spawn so a signal arriving meanwhile is held, not fatal.
        #[cfg(unix)]
        let mut forwarding = match signals {
            SignalPolicy::Forward => match crate::signals::ForwardGuard::install() {
                Ok(guard) => Some(guard),
                Err(err) => {
                    warn!(%err, "signal forwarding unavailable");
                    None
                }
            },
            SignalPolicy::Default => None,
        };

        let mut child = command(invocation)
            .spawn()
            .map_err(|err| LaunchError::spawn(&invocation.interpreter, err))?;
        debug!(pid = child.id(), "child started");

        #[cfg(unix)]
        if let Some(Err(err)) = forwarding.as_mut().map(|guard| guard.attach(child.id())) {
            warn!(%err, "signal forwarding unavailable");
            forwarding = None;
        }

        let status = child
            .wait()
            .map_err(|err| LaunchError::wait(&invocation.interpreter, err))?;
        #[cfg(unix)]
        drop(forwarding);
        let exit = ExitInfo::from(status);
        info!(code = ?exit.code, signal = ?exit.signal, "child exited");
        Ok(exit)
    }
}

/// Replaces the current process image with the child. Returns only on failure.
#[cfg(unix)]
pub fn exec_replace(invocation: &ChildInvocation) -> LaunchError {
    use std::os::unix::process::CommandExt;

    let err = command(invocation).exec();
    LaunchError::spawn(&invocation.interpreter, err)
}

fn command(invocation: &ChildInvocation) -> Command {
    let mut cmd = Command::new(&invocation.interpreter);
    cmd.args(invocation.child_args());
    cmd.envs(&invocation.env);
    cmd
}
