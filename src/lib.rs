//! Drive a single toolchain container through the docker CLI.
//!
//! A [`ContainerRunner`] pulls an image, pins it by digest, starts a long-lived container
//! and prepares a working directory. Callers then run commands, copy files and read the
//! image's declared environment through the [`Runner`] trait, and finally call
//! [`Runner::cleanup`].

pub mod errors;
pub mod invoker;
pub mod runner;
pub mod runtime;
pub mod telemetry;
pub mod util;

pub use errors::{exit_code_for_runner_error, InvokeError, Phase, RunnerError};
pub use invoker::{DockerCli, ProcessInvoker};
pub use runner::{
    parse_env_listing, ContainerRunner, ExecConfig, Runner, TargetOs, CONTAINER_ID_LEN,
};
pub use runtime::container_runtime_path;
pub use util::{shell_escape, shell_join};
