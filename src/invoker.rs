/*!
Process invoker: the only channel through which the runner reaches the container control plane.

- ProcessInvoker: run the control-plane client with arguments, return stdout
- DockerCli: production invoker backed by the docker executable
*/
use std::path::PathBuf;

use crate::errors::{InvokeError, RunnerError};
use crate::runtime::{container_runtime_path, exec_timeout_from_env};
use crate::util::{shell_join, ExecRequest, ExecService};

/// Runs the container control-plane client to completion.
///
/// Implementations return untrimmed standard output on success. A non-zero exit is an
/// error carrying the captured stderr.
pub trait ProcessInvoker {
    fn run(&self, args: &[String]) -> Result<String, InvokeError>;
}

impl<T: ProcessInvoker + ?Sized> ProcessInvoker for &T {
    fn run(&self, args: &[String]) -> Result<String, InvokeError> {
        (**self).run(args)
    }
}

impl<T: ProcessInvoker + ?Sized> ProcessInvoker for Box<T> {
    fn run(&self, args: &[String]) -> Result<String, InvokeError> {
        (**self).run(args)
    }
}

#[derive(Debug, Clone)]
pub struct DockerCli {
    path: PathBuf,
    service: ExecService,
}

impl DockerCli {
    pub fn new(path: impl Into<PathBuf>, service: ExecService) -> Self {
        Self {
            path: path.into(),
            service,
        }
    }

    /// Locate docker and read the invocation timeout from the environment.
    pub fn from_env() -> Result<Self, RunnerError> {
        let path = container_runtime_path().map_err(RunnerError::RuntimeNotFound)?;
        Ok(Self::new(path, ExecService::new(exec_timeout_from_env())))
    }

    fn preview(&self, args: &[String]) -> String {
        let mut all = Vec::with_capacity(args.len() + 1);
        all.push(self.path.display().to_string());
        all.extend(args.iter().cloned());
        shell_join(&all)
    }
}

impl ProcessInvoker for DockerCli {
    fn run(&self, args: &[String]) -> Result<String, InvokeError> {
        let command = self.preview(args);
        tracing::debug!(%command, "docker");
        let out = self
            .service
            .run(ExecRequest::new(&self.path).args(args))
            .map_err(|cause| InvokeError::Dispatch {
                command: command.clone(),
                cause,
            })?;
        if !out.status.success() {
            return Err(InvokeError::NonZeroExit {
                command,
                code: out.status.code(),
                stderr: out.stderr,
            });
        }
        tracing::trace!(elapsed = ?out.duration, bytes = out.stdout.len(), "docker done");
        Ok(out.stdout)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_nonzero_exit_carries_stderr() {
        let cli = DockerCli::new("sh", ExecService::default());
        let err = cli
            .run(&["-c".to_string(), "echo boom >&2; exit 2".to_string()])
            .unwrap_err();
        match err {
            InvokeError::NonZeroExit { code, stderr, .. } => {
                assert_eq!(code, Some(2));
                assert_eq!(stderr.trim(), "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_success_returns_raw_stdout() {
        let cli = DockerCli::new("sh", ExecService::default());
        let out = cli
            .run(&["-c".to_string(), "echo '  padded  '".to_string()])
            .expect("sh runs");
        assert_eq!(out, "  padded  \n");
    }

    #[test]
    fn test_missing_binary_is_dispatch_error() {
        let cli = DockerCli::new("/nonexistent/docker-tr", ExecService::default());
        let err = cli.run(&["version".to_string()]).unwrap_err();
        assert!(matches!(err, InvokeError::Dispatch { .. }), "{err:?}");
    }
}
