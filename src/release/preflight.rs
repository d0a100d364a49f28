//! Preflight checks for the release pipeline.
//!
//! Resolves the Python interpreter and twine executable, and probes the
//! OS keyring for PyPI credentials, before anything on disk is touched.

use std::env;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::ToolError;
use crate::release::executor::ToolRunner;

/// Environment variable naming the Python interpreter to use.
pub const PYTHON_ENV_VAR: &str = "SLIPWAY_PYTHON";

/// Environment variable naming the twine executable to use.
pub const TWINE_ENV_VAR: &str = "SLIPWAY_TWINE";

const PYTHON_CANDIDATES: &[&str] = &["python", "python3"];
const TWINE_CANDIDATES: &[&str] = &["twine"];

/// The PyPI upload endpoint twine authenticates against.
const KEYRING_SERVICE: &str = "https://upload.pypi.org/legacy/";
const KEYRING_USER: &str = "__token__";

/// Tool executables resolved by preflight.
pub struct ResolvedTools {
    pub python: String,
    pub twine: String,
}

/// Resolve the external tools the pipeline needs.
///
/// Resolution order for each tool: the override environment variable if
/// set and non-empty, then the well-known names on PATH. An override
/// pointing at something unavailable is an error, not a fallthrough.
pub fn resolve_tools<R: ToolRunner>(runner: &R) -> Result<ResolvedTools, ToolError> {
    let python = resolve_tool(
        runner,
        PYTHON_ENV_VAR,
        PYTHON_CANDIDATES,
        ToolError::PythonNotInstalled,
    )?;
    let twine = resolve_tool(
        runner,
        TWINE_ENV_VAR,
        TWINE_CANDIDATES,
        ToolError::TwineNotInstalled,
    )?;

    Ok(ResolvedTools { python, twine })
}

fn resolve_tool<R: ToolRunner>(
    runner: &R,
    env_var: &str,
    candidates: &[&str],
    missing: ToolError,
) -> Result<String, ToolError> {
    match env::var(env_var) {
        Ok(v) if !v.trim().is_empty() => {
            let value = v.trim();
            if runner.available(value) {
                debug!("Using '{}' from {}", value, env_var);
                return Ok(value.to_string());
            }
            return Err(missing);
        }
        Ok(_) => {
            warn!("{} is set but empty, falling back to PATH lookup", env_var);
        }
        Err(_) => {}
    }

    for candidate in candidates {
        if runner.available(candidate) {
            return Ok((*candidate).to_string());
        }
    }

    Err(missing)
}

/// Probe the OS keyring for a PyPI upload token. Advisory only.
///
/// `keyring get` prints the credential on success, so the probe runs
/// with captured output that is then discarded. A missing keyring CLI
/// or missing entry is not fatal; twine can still authenticate through
/// ~/.pypirc or an interactive prompt.
pub fn probe_credentials<R: ToolRunner>(runner: &R, root: &Path) -> bool {
    if !runner.available("keyring") {
        debug!("keyring CLI not found, skipping credential probe");
        return false;
    }

    let args = vec![
        "get".to_string(),
        KEYRING_SERVICE.to_string(),
        KEYRING_USER.to_string(),
    ];

    match runner.run_quiet("keyring", &args, root) {
        Ok(Some(0)) => true,
        Ok(_) => false,
        Err(e) => {
            debug!("keyring probe failed: {}", e);
            false
        }
    }
}
