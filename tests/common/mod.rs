//! Shared test utilities for integration tests.
//!
//! Not all items are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use slipway::error::{ReleaseError, ToolError};
use slipway::release::executor::ToolRunner;
use slipway::release::ReleaseConfig;
use slipway::ui::PublishGate;
use slipway::version::BumpKind;

/// A Python project laid out in a temp directory.
pub struct TestProject {
    pub dir: tempfile::TempDir,
}

impl TestProject {
    /// Create a project named `demo` with a PEP 621 manifest at `version`.
    pub fn new(version: &str) -> Self {
        Self::with_name("demo", version)
    }

    /// Create a project with an arbitrary distribution name.
    pub fn with_name(name: &str, version: &str) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let manifest = format!(
            "[project]\nname = \"{}\"\nversion = \"{}\"\nrequires-python = \">=3.9\"\n",
            name, version
        );
        fs::write(dir.path().join("pyproject.toml"), manifest)
            .expect("Failed to write pyproject.toml");
        Self { dir }
    }

    /// Create a project whose manifest only has a `[tool.poetry]` table.
    pub fn poetry(name: &str, version: &str) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let manifest = format!(
            "[tool.poetry]\nname = \"{}\"\nversion = \"{}\"\n",
            name, version
        );
        fs::write(dir.path().join("pyproject.toml"), manifest)
            .expect("Failed to write pyproject.toml");
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Add a src-layout `__init__.py` carrying `version`.
    pub fn with_init_py(self, module: &str, version: &str) -> Self {
        let module_dir = self.dir.path().join("src").join(module);
        fs::create_dir_all(&module_dir).expect("Failed to create module dir");
        fs::write(
            module_dir.join("__init__.py"),
            format!("\"\"\"Test package.\"\"\"\n\n__version__ = \"{}\"\n", version),
        )
        .expect("Failed to write __init__.py");
        self
    }

    /// Add a flat-layout `__init__.py` carrying `version`.
    pub fn with_flat_init_py(self, module: &str, version: &str) -> Self {
        let module_dir = self.dir.path().join(module);
        fs::create_dir_all(&module_dir).expect("Failed to create module dir");
        fs::write(
            module_dir.join("__init__.py"),
            format!("__version__ = \"{}\"\n", version),
        )
        .expect("Failed to write __init__.py");
        self
    }

    pub fn pyproject(&self) -> String {
        fs::read_to_string(self.dir.path().join("pyproject.toml"))
            .expect("Failed to read pyproject.toml")
    }

    pub fn init_py(&self, module: &str) -> String {
        fs::read_to_string(
            self.dir
                .path()
                .join("src")
                .join(module)
                .join("__init__.py"),
        )
        .expect("Failed to read __init__.py")
    }
}

/// Build a release config for a test project.
pub fn release_config(project: &TestProject, bump: BumpKind) -> ReleaseConfig {
    ReleaseConfig {
        bump,
        project_dir: project.root().to_path_buf(),
        assume_yes: false,
        dry_run: false,
    }
}

/// One recorded tool invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub program: String,
    pub args: Vec<String>,
    pub quiet: bool,
}

/// Scriptable tool runner for pipeline tests.
///
/// Records every invocation. A successful build really writes the
/// configured `dist_files` so the artifact scan has something to find.
pub struct FakeRunner {
    pub calls: RefCell<Vec<ToolCall>>,
    pub programs: Vec<String>,
    pub build_exit: Option<i32>,
    pub check_exit: Option<i32>,
    pub upload_exit: Option<i32>,
    pub dist_files: Vec<String>,
}

impl FakeRunner {
    /// Runner where python and twine exist and every step exits 0.
    pub fn new() -> Self {
        FakeRunner {
            calls: RefCell::new(Vec::new()),
            programs: vec!["python".to_string(), "twine".to_string()],
            build_exit: Some(0),
            check_exit: Some(0),
            upload_exit: Some(0),
            dist_files: vec![
                "demo-0.0.0-py3-none-any.whl".to_string(),
                "demo-0.0.0.tar.gz".to_string(),
            ],
        }
    }

    /// First argument of every non-quiet call, e.g. `["-m", "check", "upload"]`.
    pub fn subcommands(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| !c.quiet)
            .filter_map(|c| c.args.first().cloned())
            .collect()
    }

    pub fn uploaded(&self) -> bool {
        self.subcommands().iter().any(|s| s == "upload")
    }

    pub fn build_program(&self) -> Option<String> {
        self.calls
            .borrow()
            .iter()
            .find(|c| c.args.first().map(String::as_str) == Some("-m"))
            .map(|c| c.program.clone())
    }
}

impl ToolRunner for FakeRunner {
    fn available(&self, program: &str) -> bool {
        self.programs.iter().any(|p| p == program)
    }

    fn run(&self, program: &str, args: &[String], dir: &Path) -> Result<Option<i32>, ToolError> {
        self.calls.borrow_mut().push(ToolCall {
            program: program.to_string(),
            args: args.to_vec(),
            quiet: false,
        });

        match args.first().map(String::as_str) {
            Some("-m") => {
                if self.build_exit == Some(0) {
                    let dist = dir.join("dist");
                    fs::create_dir_all(&dist).expect("Failed to create dist");
                    for name in &self.dist_files {
                        fs::write(dist.join(name), b"artifact")
                            .expect("Failed to write artifact");
                    }
                }
                Ok(self.build_exit)
            }
            Some("check") => Ok(self.check_exit),
            Some("upload") => Ok(self.upload_exit),
            _ => Ok(Some(0)),
        }
    }

    fn run_quiet(
        &self,
        program: &str,
        args: &[String],
        _dir: &Path,
    ) -> Result<Option<i32>, ToolError> {
        self.calls.borrow_mut().push(ToolCall {
            program: program.to_string(),
            args: args.to_vec(),
            quiet: true,
        });
        // No token in the keyring unless a test says otherwise
        Ok(Some(1))
    }
}

/// Scriptable confirmation gate.
pub struct FakeGate {
    answer: Option<bool>,
    pub prompts: RefCell<Vec<String>>,
}

impl FakeGate {
    pub fn yes() -> Self {
        FakeGate {
            answer: Some(true),
            prompts: RefCell::new(Vec::new()),
        }
    }

    pub fn no() -> Self {
        FakeGate {
            answer: Some(false),
            prompts: RefCell::new(Vec::new()),
        }
    }

    /// Gate whose prompt cannot be read, as when stdin is not a terminal.
    pub fn broken() -> Self {
        FakeGate {
            answer: None,
            prompts: RefCell::new(Vec::new()),
        }
    }

    pub fn prompt_count(&self) -> usize {
        self.prompts.borrow().len()
    }
}

impl PublishGate for FakeGate {
    fn confirm_upload(&self, prompt: &str) -> Result<bool, ReleaseError> {
        self.prompts.borrow_mut().push(prompt.to_string());
        match self.answer {
            Some(answer) => Ok(answer),
            None => Err(ReleaseError::PromptFailed(
                "stdin is not a terminal".to_string(),
            )),
        }
    }
}

/// Read any file under the project root.
pub fn read_project_file(project: &TestProject, rel: &str) -> String {
    let path: PathBuf = project.root().join(rel);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read {:?}: {}", path, e))
}
