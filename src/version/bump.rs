//! Plain MAJOR.MINOR.PATCH parsing and bump arithmetic.

use std::fmt;

use clap::ValueEnum;
use semver::Version;

use crate::error::VersionError;

/// Which component of the version to increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BumpKind {
    Patch,
    Minor,
    Major,
}

impl fmt::Display for BumpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BumpKind::Patch => write!(f, "patch"),
            BumpKind::Minor => write!(f, "minor"),
            BumpKind::Major => write!(f, "major"),
        }
    }
}

/// Parse a version string into a plain three-part version.
///
/// Surrounding whitespace is tolerated. Pre-release and build metadata
/// are rejected; the release flow only manages plain triples.
pub fn parse_version(input: &str) -> Result<Version, VersionError> {
    let trimmed = input.trim();

    let version = Version::parse(trimmed)
        .map_err(|e| VersionError::ParseFailed(trimmed.to_string(), e))?;

    if !version.pre.is_empty() || !version.build.is_empty() {
        return Err(VersionError::NotPlainTriple(trimmed.to_string()));
    }

    Ok(version)
}

/// Apply a bump to a version.
///
/// Lower components reset to zero: a minor bump of 1.2.3 yields 1.3.0,
/// a major bump yields 2.0.0.
pub fn apply_bump(current: &Version, kind: BumpKind) -> Version {
    match kind {
        BumpKind::Major => Version::new(current.major + 1, 0, 0),
        BumpKind::Minor => Version::new(current.major, current.minor + 1, 0),
        BumpKind::Patch => Version::new(current.major, current.minor, current.patch + 1),
    }
}
