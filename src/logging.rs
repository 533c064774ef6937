use std::env;

use tracing::Level;

use crate::flags::Flags;

/// Environment variable naming a log level when `--debug` is not given.
pub const LOG_ENV: &str = "JOBSH_LOG";

/// Installs a stderr subscriber when debugging was asked for. Without one,
/// tracing calls are no-ops and stdout carries only the shell protocol.
pub fn init(flags: &Flags) {
    let Some(level) = level_from(flags.is_set("debug"), env::var(LOG_ENV).ok().as_deref()) else {
        return;
    };

    let installed = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    if let Err(e) = installed {
        eprintln!("Warning: Couldn't initialise logging: {}", e);
    }
}

fn level_from(debug: bool, env_level: Option<&str>) -> Option<Level> {
    if debug {
        return Some(Level::DEBUG);
    }
    env_level.and_then(|value| value.trim().parse().ok())
}
