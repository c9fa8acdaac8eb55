use std::collections::BTreeMap;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use toolchain_runner::{exit_code_for_runner_error, ContainerRunner, Runner, RunnerError, TargetOs};

#[derive(Parser, Debug)]
#[command(
    name = "toolchain-runner",
    version,
    about = "Start a toolchain container and inspect it through docker."
)]
struct Cli {
    /// Log every docker invocation
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Clone)]
struct ContainerArgs {
    /// Toolchain image reference (tag or digest)
    #[arg(long)]
    image: String,

    /// OS family of the toolchain container
    #[arg(long, value_enum, default_value_t = TargetOs::Linux)]
    os: TargetOs,

    /// Leave the container running after the command finishes
    #[arg(long)]
    keep: bool,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Print the resolved image and the environment declared by its config
    Env {
        #[command(flatten)]
        container: ContainerArgs,
    },
    /// Run a command inside the toolchain container and print its output
    Exec {
        #[command(flatten)]
        container: ContainerArgs,

        /// Working directory inside the container (defaults to the runner workdir)
        #[arg(long)]
        workdir: Option<String>,

        /// Extra environment for the command, KEY=VALUE (repeatable)
        #[arg(short = 'e', long = "env", value_parser = parse_env_flag)]
        env: Vec<(String, String)>,

        /// Command and arguments
        #[arg(trailing_var_arg = true, required = true)]
        args: Vec<String>,
    },
}

fn parse_env_flag(s: &str) -> Result<(String, String), String> {
    let (k, v) = toolchain_runner::util::split_assignment(s);
    if k.is_empty() {
        return Err(format!("invalid KEY=VALUE: {s:?}"));
    }
    Ok((k.to_string(), v.to_string()))
}

fn with_runner<T>(
    args: &ContainerArgs,
    f: impl FnOnce(&mut ContainerRunner) -> Result<T, RunnerError>,
) -> Result<T, RunnerError> {
    let mut runner = ContainerRunner::new(&args.image, !args.keep, args.os)?;
    let res = f(&mut runner);
    runner.cleanup();
    res
}

fn run(cli: Cli) -> Result<(), RunnerError> {
    match cli.command {
        Command::Env { container } => with_runner(&container, |runner| {
            let env = runner.get_env()?;
            println!("# {}", runner.resolved_image());
            for (k, v) in env {
                println!("{k}={v}");
            }
            Ok(())
        }),
        Command::Exec {
            container,
            workdir,
            env,
            args,
        } => with_runner(&container, |runner| {
            if let Some(wd) = workdir.as_deref() {
                runner.set_workdir(wd);
            }
            runner.set_additional_env(env.into_iter().collect::<BTreeMap<_, _>>());
            let (cmd, rest) = match args.split_first() {
                Some(split) => split,
                None => return Ok(()),
            };
            let rest: Vec<&str> = rest.iter().map(String::as_str).collect();
            let out = runner.exec_cmd(cmd, &rest)?;
            if !out.is_empty() {
                println!("{out}");
            }
            Ok(())
        }),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if !toolchain_runner::telemetry::init_logging(cli.verbose) {
        eprintln!("toolchain-runner: logging init skipped (global subscriber already set)");
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let code = exit_code_for_runner_error(&e);
            eprintln!("toolchain-runner: {:#}", anyhow::Error::new(e));
            ExitCode::from(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_flag() {
        assert_eq!(
            parse_env_flag("CC=clang").unwrap(),
            ("CC".to_string(), "clang".to_string())
        );
        assert_eq!(
            parse_env_flag("EMPTY").unwrap(),
            ("EMPTY".to_string(), String::new())
        );
        assert!(parse_env_flag("=x").is_err());
    }

    #[test]
    fn test_cli_parses_exec_with_trailing_args() {
        let cli = Cli::try_parse_from([
            "toolchain-runner",
            "exec",
            "--image",
            "gcc:13",
            "-e",
            "A=1",
            "--",
            "gcc",
            "--version",
        ])
        .expect("parse");
        match cli.command {
            Command::Exec {
                container,
                env,
                args,
                workdir,
            } => {
                assert_eq!(container.image, "gcc:13");
                assert_eq!(container.os, TargetOs::Linux);
                assert!(!container.keep);
                assert_eq!(env, vec![("A".to_string(), "1".to_string())]);
                assert_eq!(args, vec!["gcc", "--version"]);
                assert!(workdir.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
