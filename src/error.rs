//! Error types for slipway modules using thiserror.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from version parsing and bumping.
#[derive(Error, Debug)]
pub enum VersionError {
    #[error("Failed to parse version '{0}': {1}")]
    ParseFailed(String, #[source] semver::Error),

    #[error("Version '{0}' is not a plain MAJOR.MINOR.PATCH triple (pre-release and build metadata are not supported)")]
    NotPlainTriple(String),
}

/// Errors from reading and rewriting version sites.
#[derive(Error, Debug)]
pub enum SiteError {
    #[error("No pyproject.toml found in {}", .0.display())]
    ManifestNotFound(PathBuf),

    #[error("Failed to parse {path}: {reason}", path = .path.display())]
    ManifestParse { path: PathBuf, reason: String },

    #[error(
        "No version found in {path}. Expected [project].version or [tool.poetry].version to be a string.",
        path = .path.display()
    )]
    VersionMissing { path: PathBuf },

    #[error(
        "No __version__ assignment found in {path}. The file contained one when the release started; refusing to guess where to write.",
        path = .path.display()
    )]
    VersionPatternNotFound { path: PathBuf },

    #[error("Version '{value}' in {path} is invalid: {source}", path = .path.display())]
    InvalidVersion {
        path: PathBuf,
        value: String,
        #[source]
        source: VersionError,
    },

    #[error("Failed to read {path}: {source}", path = .path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}", path = .path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from invoking external tools.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error(
        "Python interpreter not found (tried 'python' and 'python3').\n\n\
             Install Python 3 or point SLIPWAY_PYTHON at an interpreter."
    )]
    PythonNotInstalled,

    #[error(
        "twine not found on PATH.\n\n\
             Install with: pip install twine\n\
             Or point SLIPWAY_TWINE at the executable."
    )]
    TwineNotInstalled,

    #[error("Failed to spawn {tool}: {source}")]
    SpawnFailed {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} exited with {}",
             .code.map_or("unknown status".to_string(), |c| format!("code {c}")))]
    Failed { tool: String, code: Option<i32> },
}

/// Errors from the release pipeline.
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error(transparent)]
    Version(#[from] VersionError),

    #[error(transparent)]
    Site(#[from] SiteError),

    #[error("Preflight check failed: {0}")]
    MissingTool(#[source] ToolError),

    #[error("Build failed: {0}")]
    BuildFailed(#[source] ToolError),

    #[error("Artifact check failed: {0}")]
    CheckFailed(#[source] ToolError),

    #[error("Upload failed: {0}")]
    UploadFailed(#[source] ToolError),

    #[error("No distribution artifacts found in {}", .0.display())]
    NoArtifacts(PathBuf),

    #[error("Failed to read confirmation: {0}")]
    PromptFailed(String),

    #[error("Version rollback failed: {0}")]
    RollbackFailed(String),

    #[error("I/O error at {path}: {source}", path = .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ReleaseError {
    /// Exit status for the process. Failing external tools propagate their
    /// own exit code; everything else maps to 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            ReleaseError::BuildFailed(tool)
            | ReleaseError::CheckFailed(tool)
            | ReleaseError::UploadFailed(tool) => match tool {
                ToolError::Failed { code: Some(c), .. } => *c,
                _ => 1,
            },
            _ => 1,
        }
    }
}
