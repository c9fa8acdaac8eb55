#![allow(clippy::module_name_repetitions)]
//! Docker runtime discovery and environment-driven settings.

use std::env;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use which::which;

/// Explicit path to the docker client; skips PATH lookup.
pub const DOCKER_ENV: &str = "TOOLCHAIN_RUNNER_DOCKER";
/// Per-invocation timeout for docker commands, e.g. `90s` or `5m`.
pub const EXEC_TIMEOUT_ENV: &str = "TOOLCHAIN_RUNNER_EXEC_TIMEOUT";
/// Set to `1` to make runtime discovery fail.
pub const DISABLE_DOCKER_ENV: &str = "TOOLCHAIN_RUNNER_DISABLE_DOCKER";

pub fn container_runtime_path() -> io::Result<PathBuf> {
    if env::var(DISABLE_DOCKER_ENV).ok().as_deref() == Some("1") {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            "Docker disabled by environment override.",
        ));
    }

    if let Some(p) = env::var_os(DOCKER_ENV).filter(|s| !s.is_empty()) {
        let p = PathBuf::from(p);
        if p.is_file() {
            return Ok(p);
        }
        // Allow bare names like `podman` to go through PATH lookup.
        if let Ok(found) = which(&p) {
            return Ok(found);
        }
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!(
                "{DOCKER_ENV}={} does not point to an executable.",
                p.display()
            ),
        ));
    }

    if let Ok(p) = which("docker") {
        return Ok(p);
    }
    Err(io::Error::new(
        io::ErrorKind::NotFound,
        "Docker is required but was not found in PATH.",
    ))
}

/// Timeout for each docker invocation; unset or unparsable means wait forever.
pub fn exec_timeout_from_env() -> Option<Duration> {
    let raw = env::var(EXEC_TIMEOUT_ENV).ok()?;
    parse_timeout(&raw)
}

fn parse_timeout(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match humantime::parse_duration(raw) {
        Ok(d) if !d.is_zero() => Some(d),
        Ok(_) => None,
        Err(e) => {
            tracing::warn!("ignoring {EXEC_TIMEOUT_ENV}={raw:?}: {e}");
            None
        }
    }
}
