use std::fmt;
use std::str::FromStr;

use crate::errors::RunnerError;

/// OS family of the toolchain container (not of the host).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum TargetOs {
    Linux,
    Windows,
}

impl TargetOs {
    pub fn as_str(self) -> &'static str {
        match self {
            TargetOs::Linux => "linux",
            TargetOs::Windows => "windows",
        }
    }

    /// Root working directory created inside the container.
    pub fn workdir(self) -> &'static str {
        match self {
            TargetOs::Linux => "/workdir",
            TargetOs::Windows => "C:/workdir",
        }
    }
}

impl fmt::Display for TargetOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetOs {
    type Err = RunnerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linux" => Ok(TargetOs::Linux),
            "windows" => Ok(TargetOs::Windows),
            _ => Err(RunnerError::UnsupportedOs(s.to_string())),
        }
    }
}
