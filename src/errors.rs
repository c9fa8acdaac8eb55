//! Error mapping guide:
//! - `InvokeError` describes a single docker CLI invocation that could not be dispatched or exited non-zero.
//! - `RunnerError` wraps it with the lifecycle phase or operation that failed.
//! - Map a missing docker runtime to exit code 127; all others to 1.
use std::io;

use thiserror::Error;

/// Failure of one invocation of the container control plane.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// The process could not be spawned, waited on, or timed out.
    #[error("failed to run `{command}`: {cause:#}")]
    Dispatch {
        command: String,
        cause: anyhow::Error,
    },

    /// The process ran but reported failure.
    #[error("`{command}` exited with {}: {}", display_code(.code), .stderr.trim())]
    NonZeroExit {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

fn display_code(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {c}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

/// Construction phases of a toolchain container, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Pull,
    Resolve,
    Create,
    Start,
    InitWorkdir,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::Pull,
        Phase::Resolve,
        Phase::Create,
        Phase::Start,
        Phase::InitWorkdir,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Pull => "pull",
            Phase::Resolve => "resolve",
            Phase::Create => "create",
            Phase::Start => "start",
            Phase::InitWorkdir => "init-workdir",
        }
    }
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("container image was not specified")]
    InvalidInput,

    #[error("invalid OS: {0:?}")]
    UnsupportedOs(String),

    #[error("docker runtime not available")]
    RuntimeNotFound(#[source] io::Error),

    #[error("docker was unable to pull the toolchain container image {image:?}")]
    Pull {
        image: String,
        #[source]
        source: InvokeError,
    },

    #[error("failed to convert toolchain container image {image:?} into a fully qualified image name by digest")]
    Resolve {
        image: String,
        #[source]
        source: InvokeError,
    },

    #[error("toolchain container image {image:?} has no repository digest")]
    NoDigest { image: String },

    #[error("failed to create a container with the toolchain container image {image:?}")]
    Create {
        image: String,
        #[source]
        source: InvokeError,
    },

    #[error("container ID {id:?} extracted from the stdout of the container create command had unexpected length, got {}, want 64", .id.len())]
    MalformedHandle { id: String },

    #[error("failed to run the toolchain container {id}")]
    Start {
        id: String,
        #[source]
        source: InvokeError,
    },

    #[error("failed to create workdir {workdir} in toolchain container")]
    WorkdirInit {
        workdir: String,
        #[source]
        source: Box<RunnerError>,
    },

    #[error("command `{command}` failed in toolchain container")]
    Exec {
        command: String,
        #[source]
        source: InvokeError,
    },

    #[error(transparent)]
    Copy(InvokeError),

    #[error("failed to inspect the docker image to get environment variables")]
    Inspect(#[source] InvokeError),
}

impl RunnerError {
    /// Construction phase this error aborted, if it came from provisioning.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            RunnerError::Pull { .. } => Some(Phase::Pull),
            RunnerError::Resolve { .. } | RunnerError::NoDigest { .. } => Some(Phase::Resolve),
            RunnerError::Create { .. } | RunnerError::MalformedHandle { .. } => Some(Phase::Create),
            RunnerError::Start { .. } => Some(Phase::Start),
            RunnerError::WorkdirInit { .. } => Some(Phase::InitWorkdir),
            _ => None,
        }
    }
}

/// Map an io::Error to a process exit code:
/// - 127 for NotFound (command not found)
/// - 1 for all other errors
pub fn exit_code_for_io_error(e: &io::Error) -> u8 {
    if e.kind() == io::ErrorKind::NotFound {
        127
    } else {
        1
    }
}

/// Convert RunnerError to exit code (parity with io::Error mapping).
pub fn exit_code_for_runner_error(e: &RunnerError) -> u8 {
    match e {
        RunnerError::RuntimeNotFound(ioe) => exit_code_for_io_error(ioe),
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_of_construction_errors() {
        let e = RunnerError::NoDigest {
            image: "alpine".into(),
        };
        assert_eq!(e.phase(), Some(Phase::Resolve));
        let e = RunnerError::MalformedHandle { id: "abc".into() };
        assert_eq!(e.phase(), Some(Phase::Create));
        assert_eq!(RunnerError::InvalidInput.phase(), None);
    }

    #[test]
    fn test_malformed_handle_reports_length() {
        let e = RunnerError::MalformedHandle { id: "abc".into() };
        assert!(e.to_string().contains("got 3, want 64"), "{}", e);
    }

    #[test]
    fn test_copy_error_is_transparent() {
        let inner = InvokeError::NonZeroExit {
            command: "docker cp a b".into(),
            code: Some(1),
            stderr: "no such file\n".into(),
        };
        let msg = inner.to_string();
        let e = RunnerError::Copy(inner);
        assert_eq!(e.to_string(), msg);
        assert!(msg.ends_with("status 1: no such file"), "{}", msg);
    }

    #[test]
    fn test_exit_codes() {
        let nf = io::Error::new(io::ErrorKind::NotFound, "x");
        assert_eq!(exit_code_for_runner_error(&RunnerError::RuntimeNotFound(nf)), 127);
        assert_eq!(exit_code_for_runner_error(&RunnerError::InvalidInput), 1);
    }
}
