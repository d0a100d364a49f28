//! External tool invocation for the release pipeline.
//!
//! All operations use `std::process::Command` to shell out to the
//! operator's Python toolchain, inheriting their environment, PyPI
//! config, and credential store.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::ToolError;

/// Trait for running external tools.
///
/// This abstraction allows faking the subprocesses in tests.
#[cfg_attr(test, mockall::automock)]
pub trait ToolRunner {
    /// Whether `program` resolves to an executable.
    fn available(&self, program: &str) -> bool;

    /// Run a tool with stdout/stderr attached to the operator's terminal.
    ///
    /// Returns the exit code, or `None` when the process died to a signal.
    fn run(&self, program: &str, args: &[String], dir: &Path) -> Result<Option<i32>, ToolError>;

    /// Run a tool with captured output.
    ///
    /// For probes whose output must stay off the terminal, such as the
    /// keyring credential check.
    fn run_quiet(
        &self,
        program: &str,
        args: &[String],
        dir: &Path,
    ) -> Result<Option<i32>, ToolError>;
}

/// Runner that spawns real processes.
#[derive(Default)]
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn available(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }

    fn run(&self, program: &str, args: &[String], dir: &Path) -> Result<Option<i32>, ToolError> {
        let status = Command::new(program)
            .args(args)
            .current_dir(dir)
            .status()
            .map_err(|e| ToolError::SpawnFailed {
                tool: program.to_string(),
                source: e,
            })?;
        Ok(status.code())
    }

    fn run_quiet(
        &self,
        program: &str,
        args: &[String],
        dir: &Path,
    ) -> Result<Option<i32>, ToolError> {
        let output = Command::new(program)
            .args(args)
            .current_dir(dir)
            .output()
            .map_err(|e| ToolError::SpawnFailed {
                tool: program.to_string(),
                source: e,
            })?;
        Ok(output.status.code())
    }
}

/// Run `python -m build` in the project root.
pub fn build_distributions<R: ToolRunner>(
    runner: &R,
    python: &str,
    root: &Path,
) -> Result<(), ToolError> {
    let args = vec!["-m".to_string(), "build".to_string()];
    run_checked(runner, python, &args, root, &format!("{python} -m build"))
}

/// Run `twine check` against the collected artifacts.
pub fn check_artifacts<R: ToolRunner>(
    runner: &R,
    twine: &str,
    artifacts: &[PathBuf],
    root: &Path,
) -> Result<(), ToolError> {
    let args = artifact_args("check", artifacts);
    run_checked(runner, twine, &args, root, &format!("{twine} check"))
}

/// Run `twine upload` against the collected artifacts.
pub fn upload_artifacts<R: ToolRunner>(
    runner: &R,
    twine: &str,
    artifacts: &[PathBuf],
    root: &Path,
) -> Result<(), ToolError> {
    let args = artifact_args("upload", artifacts);
    run_checked(runner, twine, &args, root, &format!("{twine} upload"))
}

/// Artifact paths are passed explicitly, never as a shell glob.
fn artifact_args(subcommand: &str, artifacts: &[PathBuf]) -> Vec<String> {
    let mut args = vec![subcommand.to_string()];
    args.extend(artifacts.iter().map(|p| p.to_string_lossy().into_owned()));
    args
}

/// Run a tool and map a non-zero exit to a descriptive error.
fn run_checked<R: ToolRunner>(
    runner: &R,
    program: &str,
    args: &[String],
    dir: &Path,
    label: &str,
) -> Result<(), ToolError> {
    match runner.run(program, args, dir)? {
        Some(0) => Ok(()),
        code => Err(ToolError::Failed {
            tool: label.to_string(),
            code,
        }),
    }
}
