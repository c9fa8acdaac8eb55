/*!
Toolchain container lifecycle.

- ContainerRunner: pull, pin by digest, create, start and prepare a workdir; then exec/copy/inspect
- Runner: the surface config generation programs against
- ExecConfig: per-call workdir/env snapshot
*/
use std::collections::BTreeMap;

use crate::errors::{InvokeError, Phase, RunnerError};
use crate::invoker::{DockerCli, ProcessInvoker};

mod env;
mod exec;
mod os;

pub use env::parse_env_listing;
pub use exec::ExecConfig;
pub use os::TargetOs;

use env::IMAGE_ENV_FORMAT;
use exec::build_exec_args;

/// Length of the full container ID printed by `docker create`.
pub const CONTAINER_ID_LEN: usize = 64;

const REPO_DIGESTS_FORMAT: &str = "--format={{range .RepoDigests}}{{println .}}{{end}}";

/// Operations available on a provisioned toolchain container.
pub trait Runner {
    /// Run `cmd args...` in the container and return trimmed stdout.
    fn exec_cmd(&self, cmd: &str, args: &[&str]) -> Result<String, RunnerError>;
    /// Copy a host path into the container. Not affected by the workdir.
    fn copy_to(&self, src: &str, dst: &str) -> Result<(), RunnerError>;
    /// Copy a container path to the host. Not affected by the workdir.
    fn copy_from(&self, src: &str, dst: &str) -> Result<(), RunnerError>;
    /// Environment declared by the image config.
    fn get_env(&self) -> Result<BTreeMap<String, String>, RunnerError>;
    fn workdir(&self) -> Option<&str>;
    fn set_workdir(&mut self, workdir: &str);
    fn additional_env(&self) -> &BTreeMap<String, String>;
    fn set_additional_env(&mut self, env: BTreeMap<String, String>);
    /// Release the container. Never fails; problems are logged.
    fn cleanup(&mut self);
}

/// A single running container of a toolchain image, driven through the docker CLI.
///
/// Construction either returns a ready runner (image pulled and pinned, container
/// started, workdir created) or an error with nothing left running. Call
/// [`Runner::cleanup`] once when done.
#[derive(Debug)]
pub struct ContainerRunner<I: ProcessInvoker = DockerCli> {
    invoker: I,
    image: String,
    resolved_image: String,
    container_id: String,
    workdir: Option<String>,
    additional_env: BTreeMap<String, String>,
    stop_on_cleanup: bool,
}

impl ContainerRunner<DockerCli> {
    /// Provision a container using the docker client found on this host.
    pub fn new(image: &str, stop_on_cleanup: bool, os: TargetOs) -> Result<Self, RunnerError> {
        validate_image(image)?;
        let docker = DockerCli::from_env()?;
        Self::provision(docker, image, stop_on_cleanup, os)
    }

    /// Like [`ContainerRunner::new`], taking the OS as a name such as `linux` or `windows`.
    pub fn for_os_name(image: &str, stop_on_cleanup: bool, os: &str) -> Result<Self, RunnerError> {
        validate_image(image)?;
        let os: TargetOs = os.parse()?;
        let docker = DockerCli::from_env()?;
        Self::provision(docker, image, stop_on_cleanup, os)
    }
}

impl<I: ProcessInvoker> ContainerRunner<I> {
    pub fn with_invoker(
        invoker: I,
        image: &str,
        stop_on_cleanup: bool,
        os: TargetOs,
    ) -> Result<Self, RunnerError> {
        validate_image(image)?;
        Self::provision(invoker, image, stop_on_cleanup, os)
    }

    /// Run every construction phase in order; the image reference is already validated.
    fn provision(
        invoker: I,
        image: &str,
        stop_on_cleanup: bool,
        os: TargetOs,
    ) -> Result<Self, RunnerError> {
        let mut runner = Self {
            invoker,
            image: image.to_string(),
            resolved_image: String::new(),
            container_id: String::new(),
            workdir: None,
            additional_env: BTreeMap::new(),
            stop_on_cleanup,
        };

        let mut needs_cleanup = false;
        for phase in Phase::ALL {
            if let Err(e) = runner.provision_step(phase, os) {
                tracing::debug!(
                    phase = phase.as_str(),
                    image = %runner.image,
                    "provisioning failed"
                );
                if needs_cleanup {
                    runner.cleanup();
                }
                return Err(e);
            }
            if phase == Phase::Start {
                needs_cleanup = true;
            }
        }
        Ok(runner)
    }

    fn provision_step(&mut self, phase: Phase, os: TargetOs) -> Result<(), RunnerError> {
        match phase {
            Phase::Pull => {
                self.docker(&["pull", self.image.as_str()])
                    .map_err(|source| RunnerError::Pull {
                        image: self.image.clone(),
                        source,
                    })?;
            }
            Phase::Resolve => {
                let out = self
                    .docker(&["inspect", REPO_DIGESTS_FORMAT, self.image.as_str()])
                    .map_err(|source| RunnerError::Resolve {
                        image: self.image.clone(),
                        source,
                    })?;
                let digest = out
                    .lines()
                    .map(str::trim)
                    .find(|l| !l.is_empty())
                    .filter(|l| l.contains('@'))
                    .ok_or_else(|| RunnerError::NoDigest {
                        image: self.image.clone(),
                    })?;
                tracing::info!(
                    "Resolved toolchain image {:?} to fully qualified reference {:?}.",
                    self.image,
                    digest
                );
                self.resolved_image = digest.to_string();
            }
            Phase::Create => {
                let out = self
                    .docker(&[
                        "create",
                        "--rm",
                        self.resolved_image.as_str(),
                        "sleep",
                        "infinity",
                    ])
                    .map_err(|source| RunnerError::Create {
                        image: self.resolved_image.clone(),
                        source,
                    })?;
                let id = out.trim();
                if id.len() != CONTAINER_ID_LEN {
                    return Err(RunnerError::MalformedHandle { id: id.to_string() });
                }
                self.container_id = id.to_string();
                tracing::info!(
                    "Created container ID {} for toolchain container image {}.",
                    self.container_id,
                    self.resolved_image
                );
            }
            Phase::Start => {
                self.docker(&["start", self.container_id.as_str()])
                    .map_err(|source| RunnerError::Start {
                        id: self.container_id.clone(),
                        source,
                    })?;
            }
            Phase::InitWorkdir => {
                let wd = os.workdir();
                self.exec_cmd("mkdir", &[wd])
                    .map_err(|e| RunnerError::WorkdirInit {
                        workdir: wd.to_string(),
                        source: Box::new(e),
                    })?;
                self.workdir = Some(wd.to_string());
            }
        }
        Ok(())
    }

    fn docker(&self, args: &[&str]) -> Result<String, InvokeError> {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        self.invoker.run(&args)
    }

    /// Caller-supplied image reference.
    pub fn image(&self) -> &str {
        &self.image
    }

    /// Image reference pinned by digest, e.g. `repo@sha256:...`.
    pub fn resolved_image(&self) -> &str {
        &self.resolved_image
    }

    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    pub fn stop_on_cleanup(&self) -> bool {
        self.stop_on_cleanup
    }

    /// Snapshot of the current workdir and additional environment.
    pub fn exec_config(&self) -> ExecConfig {
        ExecConfig {
            workdir: self.workdir.clone(),
            env: self.additional_env.clone(),
        }
    }

    /// Run a command with an explicit per-call configuration instead of the runner's own.
    pub fn exec_with(
        &self,
        config: &ExecConfig,
        cmd: &str,
        args: &[&str],
    ) -> Result<String, RunnerError> {
        let argv = build_exec_args(&self.container_id, config, cmd, args);
        let out = self
            .invoker
            .run(&argv)
            .map_err(|source| RunnerError::Exec {
                command: cmd.to_string(),
                source,
            })?;
        Ok(out.trim().to_string())
    }
}

impl<I: ProcessInvoker> Runner for ContainerRunner<I> {
    fn exec_cmd(&self, cmd: &str, args: &[&str]) -> Result<String, RunnerError> {
        self.exec_with(&self.exec_config(), cmd, args)
    }

    fn copy_to(&self, src: &str, dst: &str) -> Result<(), RunnerError> {
        let target = format!("{}:{}", self.container_id, dst);
        self.docker(&["cp", src, target.as_str()])
            .map(|_| ())
            .map_err(RunnerError::Copy)
    }

    fn copy_from(&self, src: &str, dst: &str) -> Result<(), RunnerError> {
        let source = format!("{}:{}", self.container_id, src);
        self.docker(&["cp", source.as_str(), dst])
            .map(|_| ())
            .map_err(RunnerError::Copy)
    }

    fn get_env(&self) -> Result<BTreeMap<String, String>, RunnerError> {
        let image = self.resolved_image.as_str();
        let out = self
            .docker(&["inspect", "-f", IMAGE_ENV_FORMAT, image])
            .map_err(RunnerError::Inspect)?;
        Ok(parse_env_listing(&out))
    }

    fn workdir(&self) -> Option<&str> {
        self.workdir.as_deref()
    }

    fn set_workdir(&mut self, workdir: &str) {
        self.workdir = Some(workdir.to_string());
    }

    fn additional_env(&self) -> &BTreeMap<String, String> {
        &self.additional_env
    }

    fn set_additional_env(&mut self, env: BTreeMap<String, String>) {
        self.additional_env = env;
    }

    fn cleanup(&mut self) {
        if !self.stop_on_cleanup {
            tracing::info!(
                "Not stopping container {} of image {} because the cleanup option was set to false.",
                self.container_id,
                self.resolved_image
            );
            return;
        }
        if let Err(e) = self.docker(&["stop", "-t", "0", self.container_id.as_str()]) {
            tracing::warn!(
                error = %e,
                "Failed to stop container {} of toolchain image {} but it's ok to ignore this error if config generation & extraction succeeded.",
                self.container_id,
                self.resolved_image
            );
        }
    }
}

fn validate_image(image: &str) -> Result<(), RunnerError> {
    if image.is_empty() {
        return Err(RunnerError::InvalidInput);
    }
    Ok(())
}
