#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;

use toolchain_runner::{ContainerRunner, InvokeError, ProcessInvoker, RunnerError, TargetOs};

pub const CID: &str = "3f4e5d6c7b8a99887766554433221100ffeeddccbbaa00112233445566778899";
pub const DIGEST: &str =
    "reg.example/tc@sha256:0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

/// Scripted stand-in for the docker CLI that records every invocation.
///
/// Replies are keyed by subcommand; `inspect` is split into `inspect-digest` and
/// `inspect-env` by its format flag.
#[derive(Debug)]
pub struct FakeDocker {
    calls: RefCell<Vec<Vec<String>>>,
    replies: HashMap<&'static str, String>,
    failures: RefCell<HashMap<&'static str, String>>,
}

impl FakeDocker {
    pub fn new() -> Self {
        let mut replies = HashMap::new();
        replies.insert("pull", "Status: Image is up to date\n".to_string());
        replies.insert("inspect-digest", format!("{DIGEST}\n"));
        replies.insert("create", format!("{CID}\n"));
        replies.insert("start", format!("{CID}\n"));
        replies.insert("exec", String::new());
        replies.insert("cp", String::new());
        replies.insert("stop", format!("{CID}\n"));
        replies.insert("inspect-env", "PATH=/usr/local/bin:/usr/bin\n".to_string());
        Self {
            calls: RefCell::new(Vec::new()),
            replies,
            failures: RefCell::new(HashMap::new()),
        }
    }

    pub fn reply(mut self, key: &'static str, out: impl Into<String>) -> Self {
        self.replies.insert(key, out.into());
        self
    }

    pub fn fail_on(self, key: &'static str, stderr: impl Into<String>) -> Self {
        self.set_failure(key, stderr);
        self
    }

    /// Make later calls for `key` fail, e.g. once construction has finished.
    pub fn set_failure(&self, key: &'static str, stderr: impl Into<String>) {
        self.failures.borrow_mut().insert(key, stderr.into());
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.borrow().clone()
    }

    pub fn keys(&self) -> Vec<&'static str> {
        self.calls.borrow().iter().map(|a| key_of(a)).collect()
    }

    pub fn count(&self, key: &str) -> usize {
        self.keys().iter().filter(|k| **k == key).count()
    }

    /// Calls issued after construction finished.
    pub fn calls_after(&self, n: usize) -> Vec<Vec<String>> {
        self.calls.borrow().iter().skip(n).cloned().collect()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }
}

fn key_of(args: &[String]) -> &'static str {
    match args.first().map(String::as_str) {
        Some("inspect") if args.get(1).map(String::as_str) == Some("-f") => "inspect-env",
        Some("inspect") => "inspect-digest",
        Some("pull") => "pull",
        Some("create") => "create",
        Some("start") => "start",
        Some("exec") => "exec",
        Some("cp") => "cp",
        Some("stop") => "stop",
        _ => "other",
    }
}

impl ProcessInvoker for FakeDocker {
    fn run(&self, args: &[String]) -> Result<String, InvokeError> {
        self.calls.borrow_mut().push(args.to_vec());
        let key = key_of(args);
        if let Some(stderr) = self.failures.borrow().get(key) {
            return Err(InvokeError::NonZeroExit {
                command: format!("docker {}", args.join(" ")),
                code: Some(1),
                stderr: stderr.clone(),
            });
        }
        Ok(self.replies.get(key).cloned().unwrap_or_default())
    }
}

pub fn strings(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

/// Split a space-separated command line into an argv; no quoting is supported.
pub fn argv(line: &str) -> Vec<String> {
    line.split_whitespace().map(String::from).collect()
}

/// Construct a Linux runner on top of `docker`.
pub fn provision<'a>(
    docker: &'a FakeDocker,
    image: &str,
    stop_on_cleanup: bool,
) -> Result<ContainerRunner<&'a FakeDocker>, RunnerError> {
    ContainerRunner::with_invoker(docker, image, stop_on_cleanup, TargetOs::Linux)
}
