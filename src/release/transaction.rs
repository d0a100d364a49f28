//! Snapshot-based rollback for version sites.
//!
//! The pipeline snapshots every site before rewriting any of them.
//! Until `commit` is called the original bytes can always be put back,
//! so an aborted release never leaves a half-bumped tree behind.

use std::path::PathBuf;

use crate::error::SiteError;
use crate::release::sites::VersionSite;

struct Snapshot {
    path: PathBuf,
    contents: String,
}

/// Holds the pre-rewrite contents of every version site.
pub struct VersionTransaction {
    snapshots: Vec<Snapshot>,
}

impl VersionTransaction {
    /// Snapshot the current contents of `sites`.
    ///
    /// Must be called before any site is rewritten.
    pub fn begin(sites: &[VersionSite]) -> Result<Self, SiteError> {
        let mut snapshots = Vec::with_capacity(sites.len());

        for site in sites {
            let contents =
                std::fs::read_to_string(&site.path).map_err(|e| SiteError::ReadFailed {
                    path: site.path.clone(),
                    source: e,
                })?;
            snapshots.push(Snapshot {
                path: site.path.clone(),
                contents,
            });
        }

        Ok(VersionTransaction { snapshots })
    }

    /// Restore every snapshot. Returns the restored paths.
    ///
    /// Best-effort: a failing restore does not stop the remaining ones,
    /// and the first failure is reported afterwards.
    pub fn rollback(self) -> Result<Vec<PathBuf>, SiteError> {
        let mut restored = Vec::with_capacity(self.snapshots.len());
        let mut first_error = None;

        for snapshot in self.snapshots {
            match std::fs::write(&snapshot.path, &snapshot.contents) {
                Ok(()) => restored.push(snapshot.path),
                Err(e) => {
                    if first_error.is_none() {
                        first_error = Some(SiteError::WriteFailed {
                            path: snapshot.path,
                            source: e,
                        });
                    }
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(restored),
        }
    }

    /// Keep the rewritten contents. The snapshots are discarded.
    pub fn commit(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    use crate::release::sites::SiteKind;

    fn site(path: &Path) -> VersionSite {
        VersionSite {
            path: path.to_path_buf(),
            kind: SiteKind::Pyproject,
        }
    }

    #[test]
    fn test_rollback_restores_original_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pyproject.toml");
        fs::write(&path, "version = \"1.0.0\"  # keep me\n").unwrap();

        let tx = VersionTransaction::begin(&[site(&path)]).unwrap();
        fs::write(&path, "version = \"1.1.0\"\n").unwrap();

        let restored = tx.rollback().unwrap();
        assert_eq!(restored, vec![path.clone()]);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "version = \"1.0.0\"  # keep me\n"
        );
    }

    #[test]
    fn test_commit_keeps_mutations() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pyproject.toml");
        fs::write(&path, "version = \"1.0.0\"\n").unwrap();

        let tx = VersionTransaction::begin(&[site(&path)]).unwrap();
        fs::write(&path, "version = \"1.1.0\"\n").unwrap();
        tx.commit();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "version = \"1.1.0\"\n"
        );
    }

    #[test]
    fn test_begin_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pyproject.toml");

        let result = VersionTransaction::begin(&[site(&path)]);
        assert!(matches!(result, Err(SiteError::ReadFailed { .. })));
    }

    #[test]
    fn test_rollback_is_best_effort() {
        let dir = tempfile::tempdir().unwrap();
        let gone_dir = dir.path().join("gone");
        fs::create_dir(&gone_dir).unwrap();
        let doomed = gone_dir.join("__init__.py");
        fs::write(&doomed, "__version__ = \"1.0.0\"\n").unwrap();
        let survivor = dir.path().join("pyproject.toml");
        fs::write(&survivor, "version = \"1.0.0\"\n").unwrap();

        let tx = VersionTransaction::begin(&[site(&doomed), site(&survivor)]).unwrap();
        fs::write(&survivor, "version = \"1.1.0\"\n").unwrap();
        fs::remove_dir_all(&gone_dir).unwrap();

        // The doomed restore fails, the survivor is still restored.
        let result = tx.rollback();
        assert!(matches!(result, Err(SiteError::WriteFailed { .. })));
        assert_eq!(
            fs::read_to_string(&survivor).unwrap(),
            "version = \"1.0.0\"\n"
        );
    }
}
