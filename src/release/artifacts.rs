//! Distribution artifact handling around `python -m build`.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ReleaseError;

/// Remove stale build output so the upload set is exactly what this
/// release produced.
///
/// Clears `dist/`, `build/`, and any `*.egg-info` under the root or
/// `src/`. Missing directories are fine.
pub fn clean_build_dirs(root: &Path) -> Result<(), ReleaseError> {
    for name in ["dist", "build"] {
        remove_if_present(&root.join(name))?;
    }

    remove_egg_info(root)?;
    let src = root.join("src");
    if src.is_dir() {
        remove_egg_info(&src)?;
    }

    Ok(())
}

/// Collect the regular files in `dist/`, sorted by name.
///
/// An absent or empty `dist/` after a build means the build tool did
/// not produce anything; that aborts the release.
pub fn collect_artifacts(root: &Path) -> Result<Vec<PathBuf>, ReleaseError> {
    let dist = root.join("dist");
    if !dist.is_dir() {
        return Err(ReleaseError::NoArtifacts(dist));
    }

    let entries = std::fs::read_dir(&dist).map_err(|e| ReleaseError::Io {
        path: dist.clone(),
        source: e,
    })?;

    let mut artifacts = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ReleaseError::Io {
            path: dist.clone(),
            source: e,
        })?;
        let path = entry.path();
        if path.is_file() {
            artifacts.push(path);
        }
    }

    if artifacts.is_empty() {
        return Err(ReleaseError::NoArtifacts(dist));
    }

    artifacts.sort();
    Ok(artifacts)
}

fn remove_egg_info(dir: &Path) -> Result<(), ReleaseError> {
    let entries = std::fs::read_dir(dir).map_err(|e| ReleaseError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| ReleaseError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        let is_egg_info = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.ends_with(".egg-info"))
            .unwrap_or(false);

        if is_egg_info {
            remove_if_present(&path)?;
        }
    }

    Ok(())
}

fn remove_if_present(path: &Path) -> Result<(), ReleaseError> {
    let result = if path.is_dir() {
        std::fs::remove_dir_all(path)
    } else if path.is_file() {
        std::fs::remove_file(path)
    } else {
        return Ok(());
    };

    match result {
        Ok(()) => {
            debug!("Removed {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ReleaseError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}
