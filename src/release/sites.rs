//! Version site discovery and rewriting.
//!
//! A site is a file carrying the package version: pyproject.toml
//! (PEP 621 `[project].version`, with `[tool.poetry].version` as a
//! fallback) and, when the package has one, the `__version__`
//! assignment in its `__init__.py`.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use regex_lite::Regex;
use semver::Version;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::SiteError;
use crate::version::parse_version;

/// Matches a `__version__ = "..."` assignment. Tolerates either quote
/// style and whitespace around the `=`; only the first match is rewritten.
const VERSION_ASSIGN_PATTERN: &str =
    r#"(?m)^(?P<lead>\s*__version__\s*=\s*)(?P<quote>["'])(?P<value>[^"'\n]*)["']"#;

/// The kind of version site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteKind {
    Pyproject,
    InitPy,
}

impl fmt::Display for SiteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SiteKind::Pyproject => write!(f, "pyproject.toml"),
            SiteKind::InitPy => write!(f, "__init__.py"),
        }
    }
}

/// A file that carries the package version.
#[derive(Debug, Clone)]
pub struct VersionSite {
    pub path: PathBuf,
    pub kind: SiteKind,
}

/// The sites of a project together with the version they currently carry.
///
/// pyproject.toml is authoritative for `current`; a disagreeing
/// `__init__.py` is warned about and overwritten on the next rewrite.
#[derive(Debug, Clone)]
pub struct ProjectVersions {
    pub sites: Vec<VersionSite>,
    pub current: Version,
    pub package: String,
}

/// Discover the version sites of the project at `root`.
///
/// pyproject.toml must exist and carry a parseable version, otherwise
/// this fails loudly. The `__init__.py` site is optional: it is only
/// included when the file exists and contains a `__version__` assignment.
pub fn discover_sites(root: &Path) -> Result<ProjectVersions, SiteError> {
    let pyproject_path = root.join("pyproject.toml");
    if !pyproject_path.exists() {
        return Err(SiteError::ManifestNotFound(root.to_path_buf()));
    }

    let content = read_file(&pyproject_path)?;
    let doc = parse_toml(&pyproject_path, &content)?;

    let version_str = manifest_version(&doc).ok_or_else(|| SiteError::VersionMissing {
        path: pyproject_path.clone(),
    })?;

    let current = parse_version(version_str).map_err(|source| SiteError::InvalidVersion {
        path: pyproject_path.clone(),
        value: version_str.to_string(),
        source,
    })?;

    let package = package_name(&doc).unwrap_or_default();

    let mut sites = vec![VersionSite {
        path: pyproject_path,
        kind: SiteKind::Pyproject,
    }];

    if let Some(init_site) = find_init_py(root, &package, &current)? {
        sites.push(init_site);
    }

    Ok(ProjectVersions {
        sites,
        current,
        package,
    })
}

/// Write `version` into a site, preserving the rest of the file.
pub fn write_site_version(site: &VersionSite, version: &Version) -> Result<(), SiteError> {
    match site.kind {
        SiteKind::Pyproject => update_pyproject(&site.path, version),
        SiteKind::InitPy => update_init_py(&site.path, version),
    }
}

// --- pyproject.toml ---

/// Read the version string from a parsed pyproject document.
///
/// PEP 621 `[project].version` wins; `[tool.poetry].version` is only
/// consulted when the former is absent.
fn manifest_version(doc: &toml_edit::DocumentMut) -> Option<&str> {
    doc.get("project")
        .and_then(|p| p.get("version"))
        .and_then(|v| v.as_str())
        .or_else(|| {
            doc.get("tool")
                .and_then(|t| t.get("poetry"))
                .and_then(|p| p.get("version"))
                .and_then(|v| v.as_str())
        })
}

fn package_name(doc: &toml_edit::DocumentMut) -> Option<String> {
    doc.get("project")
        .and_then(|p| p.get("name"))
        .and_then(|n| n.as_str())
        .or_else(|| {
            doc.get("tool")
                .and_then(|t| t.get("poetry"))
                .and_then(|p| p.get("name"))
                .and_then(|n| n.as_str())
        })
        .map(str::to_string)
}

fn update_pyproject(path: &Path, version: &Version) -> Result<(), SiteError> {
    let content = read_file(path)?;
    let mut doc = parse_toml(path, &content)?;

    // PEP 621 first, Poetry only as fallback
    if doc.get("project").and_then(|p| p.get("version")).is_some() {
        doc["project"]["version"] = toml_edit::value(version.to_string());
    } else if doc
        .get("tool")
        .and_then(|t| t.get("poetry"))
        .and_then(|p| p.get("version"))
        .is_some()
    {
        doc["tool"]["poetry"]["version"] = toml_edit::value(version.to_string());
    } else {
        return Err(SiteError::VersionMissing {
            path: path.to_path_buf(),
        });
    }

    write_file(path, &doc.to_string())
}

// --- __init__.py ---

/// Locate the package's `__init__.py`, if it qualifies as a version site.
///
/// The import name is the distribution name lowercased with dashes and
/// dots mapped to underscores. Both src and flat layouts are checked.
/// A file without a `__version__` assignment is not a site.
fn find_init_py(
    root: &Path,
    package: &str,
    manifest_version: &Version,
) -> Result<Option<VersionSite>, SiteError> {
    if package.is_empty() {
        debug!("No package name in pyproject.toml, skipping __init__.py lookup");
        return Ok(None);
    }

    let module = package
        .trim()
        .to_lowercase()
        .replace('-', "_")
        .replace('.', "_");

    let candidates = [
        root.join("src").join(&module).join("__init__.py"),
        root.join(&module).join("__init__.py"),
    ];

    for path in candidates {
        if !path.exists() {
            continue;
        }

        let content = read_file(&path)?;
        let assign_re = Regex::new(VERSION_ASSIGN_PATTERN).expect("Invalid regex");

        let caps = match assign_re.captures(&content) {
            Some(caps) => caps,
            None => {
                debug!(
                    "{} has no __version__ assignment, not treating it as a version site",
                    path.display()
                );
                return Ok(None);
            }
        };

        if let Some(value) = caps.name("value") {
            match parse_version(value.as_str()) {
                Ok(init_version) if init_version != *manifest_version => {
                    warn!(
                        "{} carries {} but pyproject.toml carries {}; the manifest wins",
                        path.display(),
                        init_version,
                        manifest_version
                    );
                }
                Ok(_) => {}
                Err(_) => {
                    warn!(
                        "{} carries unparseable version '{}'; it will be overwritten",
                        path.display(),
                        value.as_str()
                    );
                }
            }
        }

        return Ok(Some(VersionSite {
            path,
            kind: SiteKind::InitPy,
        }));
    }

    debug!("No __init__.py found for module '{}'", module);
    Ok(None)
}

fn update_init_py(path: &Path, version: &Version) -> Result<(), SiteError> {
    let content = read_file(path)?;
    let assign_re = Regex::new(VERSION_ASSIGN_PATTERN).expect("Invalid regex");

    // The file qualified as a site at discovery time. If the assignment
    // has vanished since, refuse rather than append somewhere arbitrary.
    let caps = assign_re
        .captures(&content)
        .ok_or_else(|| SiteError::VersionPatternNotFound {
            path: path.to_path_buf(),
        })?;

    let value = match caps.name("value") {
        Some(value) => value,
        None => {
            return Err(SiteError::VersionPatternNotFound {
                path: path.to_path_buf(),
            })
        }
    };

    let mut updated = String::with_capacity(content.len() + 8);
    updated.push_str(&content[..value.start()]);
    updated.push_str(&version.to_string());
    updated.push_str(&content[value.end()..]);

    write_file(path, &updated)
}

// --- Shared helpers ---

fn parse_toml(path: &Path, content: &str) -> Result<toml_edit::DocumentMut, SiteError> {
    content
        .parse::<toml_edit::DocumentMut>()
        .map_err(|e| SiteError::ManifestParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

fn read_file(path: &Path) -> Result<String, SiteError> {
    std::fs::read_to_string(path).map_err(|e| SiteError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Write through a temp file in the same directory, then persist over
/// the target. The site is never observable half-written.
fn write_file(path: &Path, content: &str) -> Result<(), SiteError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| SiteError::WriteFailed {
        path: path.to_path_buf(),
        source: e,
    })?;
    tmp.write_all(content.as_bytes())
        .map_err(|e| SiteError::WriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
    tmp.persist(path).map_err(|e| SiteError::WriteFailed {
        path: path.to_path_buf(),
        source: e.error,
    })?;

    Ok(())
}
