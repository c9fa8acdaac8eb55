use std::env;

use once_cell::sync::OnceCell;
use tracing_subscriber::prelude::*;

static INIT: OnceCell<()> = OnceCell::new();

/// Filter applied when neither `TOOLCHAIN_RUNNER_LOG` nor `RUST_LOG` is set.
pub const DEFAULT_FILTER: &str = "warn";

fn filter_from_env() -> String {
    env::var("TOOLCHAIN_RUNNER_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .or_else(|| env::var("RUST_LOG").ok().filter(|s| !s.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

/// Install a stderr fmt subscriber. Returns false if a global subscriber was already set.
pub fn init_logging(verbose: bool) -> bool {
    if INIT.get().is_some() {
        return true;
    }
    let filter = if verbose {
        "toolchain_runner=debug".to_string()
    } else {
        filter_from_env()
    };
    let env_filter = tracing_subscriber::EnvFilter::try_new(&filter)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_FILTER));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    if tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        return false;
    }
    let _ = INIT.set(());
    true
}
