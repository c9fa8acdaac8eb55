use std::collections::BTreeMap;

/// Settings applied to a single `docker exec`.
///
/// Taken by value per call so a command always sees one consistent workdir/env pair,
/// regardless of later changes on the runner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecConfig {
    pub workdir: Option<String>,
    pub env: BTreeMap<String, String>,
}

impl ExecConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_workdir(mut self, workdir: impl Into<String>) -> Self {
        self.workdir = Some(workdir.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }
}

/// Build the argument vector for `docker exec` (without the docker program itself).
pub(crate) fn build_exec_args(
    container_id: &str,
    config: &ExecConfig,
    cmd: &str,
    args: &[&str],
) -> Vec<String> {
    let mut out: Vec<String> = vec!["exec".to_string()];
    if let Some(wd) = config.workdir.as_deref().filter(|w| !w.is_empty()) {
        out.push("-w".to_string());
        out.push(wd.to_string());
    }
    for (k, v) in &config.env {
        out.push("-e".to_string());
        out.push(format!("{k}={v}"));
    }
    out.push(container_id.to_string());
    out.push(cmd.to_string());
    out.extend(args.iter().map(|a| a.to_string()));
    out
}
