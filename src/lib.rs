//! slipway - A CLI tool that releases a Python package behind a confirmation gate.
//!
//! # Overview
//!
//! slipway bumps the version recorded in pyproject.toml (and the package
//! `__init__.py` when present), builds sdist and wheel with `python -m build`,
//! verifies them with `twine check`, and uploads with `twine upload` only
//! after the operator confirms. Any exit without an upload puts the original
//! version strings back.

pub mod error;
pub mod release;
pub mod ui;
pub mod version;

// Re-export commonly used types
pub use error::{ReleaseError, SiteError, ToolError, VersionError};
pub use release::{ReleaseAttempt, ReleaseConfig};
pub use version::BumpKind;
