use std::io::IsTerminal;

use anyhow::Context;
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use launcher_core::{CurrentExe, LaunchError, OsSpawner};

/// Filter directives for the launcher's own diagnostics.
const LOG_ENV: &str = "LAUNCHER_LOG";

fn main() {
    if let Err(err) = init_tracing() {
        eprintln!("launcher: {err:#}");
    }

    // Everything after argv[0] belongs to the child; the launcher has no flags.
    let forwarded = std::env::args_os().skip(1).collect();

    let code = match launcher_core::launch(&CurrentExe, &OsSpawner, forwarded) {
        Ok(exit) => exit.exit_code(),
        Err(LaunchError::ChildFailure { code, .. }) => {
            debug!(code, "relaying child failure");
            code
        }
        Err(err) => {
            debug!(?err, "launch failed");
            eprintln!("launcher: {err}");
            err.exit_code()
        }
    };

    std::process::exit(code);
}

fn init_tracing() -> anyhow::Result<()> {
    let filter = match std::env::var(LOG_ENV) {
        Ok(directives) => EnvFilter::try_new(&directives)
            .with_context(|| format!("invalid {LOG_ENV} directives `{directives}`"))?,
        Err(_) => EnvFilter::new("warn"),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal())
                .with_target(false),
        )
        .with(filter)
        .try_init()
        .context("failed to install tracing subscriber")
}
