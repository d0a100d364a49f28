//! Release pipeline: bump, rewrite, build, verify, gate, upload.
//!
//! Orchestrates version site discovery, the version rewrite, the
//! distribution build, artifact checks, the confirmation gate, and the
//! upload. Version strings only stay bumped when the upload succeeds;
//! every other way out of the pipeline restores them.

pub mod artifacts;
pub mod executor;
pub mod preflight;
pub mod sites;
pub mod transaction;

use std::path::PathBuf;

use semver::Version;

use crate::error::{ReleaseError, SiteError};
use crate::ui::{self, PublishGate, TerminalGate};
use crate::version::{apply_bump, BumpKind};

use self::artifacts::{clean_build_dirs, collect_artifacts};
use self::executor::{
    build_distributions, check_artifacts, upload_artifacts, SystemRunner, ToolRunner,
};
use self::preflight::{probe_credentials, resolve_tools};
use self::sites::{discover_sites, write_site_version, VersionSite};
use self::transaction::VersionTransaction;

/// Configuration for the release command, derived from CLI flags.
pub struct ReleaseConfig {
    pub bump: BumpKind,
    pub project_dir: PathBuf,
    pub assume_yes: bool,
    pub dry_run: bool,
}

/// Record of what a release run did.
#[derive(Debug, Clone)]
pub struct ReleaseAttempt {
    pub old_version: Version,
    pub new_version: Version,
    pub bump_kind: BumpKind,
    pub build_succeeded: bool,
    pub user_confirmed: bool,
    pub upload_succeeded: bool,
}

/// Run the full release pipeline against the real toolchain and terminal.
pub fn run_release(config: &ReleaseConfig) -> Result<ReleaseAttempt, ReleaseError> {
    run_release_impl(config, &SystemRunner, &TerminalGate)
}

/// Internal implementation that accepts any runner and gate (for testing).
pub fn run_release_impl<R: ToolRunner, G: PublishGate>(
    config: &ReleaseConfig,
    runner: &R,
    gate: &G,
) -> Result<ReleaseAttempt, ReleaseError> {
    let root = config.project_dir.as_path();

    // ── Stage 1: Preflight ──
    println!("Preflight checks:");

    let tools = resolve_tools(runner).map_err(ReleaseError::MissingTool)?;
    ui::pass(&format!("Python interpreter: {}", tools.python));
    ui::pass(&format!("twine: {}", tools.twine));

    if probe_credentials(runner, root) {
        ui::pass("PyPI token found in keyring");
    } else {
        ui::warn("No PyPI token in keyring; twine will use ~/.pypirc or prompt");
    }

    // ── Stage 2: Version sites ──
    let project = discover_sites(root)?;
    let new_version = apply_bump(&project.current, config.bump);

    println!();
    println!("Version sites:");
    for site in &project.sites {
        println!(
            "  [UPDATE] {}: {} -> {}",
            site.kind, project.current, new_version
        );
    }

    println!();
    println!(
        "Version: {} -> {} ({} bump)",
        project.current, new_version, config.bump
    );

    let mut attempt = ReleaseAttempt {
        old_version: project.current.clone(),
        new_version: new_version.clone(),
        bump_kind: config.bump,
        build_succeeded: false,
        user_confirmed: false,
        upload_succeeded: false,
    };

    // ── Stage 3: Dry run stops before any mutation ──
    if config.dry_run {
        println!();
        ui::skip(&format!(
            "Would release {}",
            release_label(&project.package, &new_version)
        ));
        ui::skip(&format!("Would build with {} -m build", tools.python));
        ui::skip(&format!("Would verify with {} check", tools.twine));
        ui::skip("Would ask before uploading");
        println!();
        println!("Dry run complete. No changes made.");
        return Ok(attempt);
    }

    // ── Stage 4: Version rewrite ──
    let tx = VersionTransaction::begin(&project.sites)?;

    println!();
    if let Err(e) = rewrite_sites(&project.sites, &new_version) {
        let _ = rollback_sites(tx, &project.sites, &project.current);
        return Err(ReleaseError::Site(e));
    }

    // ── Stage 5: Build ──
    println!();
    println!("Building distributions:");

    if let Err(e) = clean_build_dirs(root) {
        let _ = rollback_sites(tx, &project.sites, &project.current);
        return Err(e);
    }

    if let Err(e) = build_distributions(runner, &tools.python, root) {
        ui::fail(&e.to_string());
        let _ = rollback_sites(tx, &project.sites, &project.current);
        return Err(ReleaseError::BuildFailed(e));
    }
    attempt.build_succeeded = true;

    // ── Stage 6: Artifact checks ──
    let artifact_paths = match collect_artifacts(root) {
        Ok(paths) => paths,
        Err(e) => {
            ui::fail(&e.to_string());
            let _ = rollback_sites(tx, &project.sites, &project.current);
            return Err(e);
        }
    };

    for path in &artifact_paths {
        match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => ui::done(&format!("Built {}", name)),
            None => ui::done(&format!("Built {}", path.display())),
        }
    }

    if let Err(e) = check_artifacts(runner, &tools.twine, &artifact_paths, root) {
        ui::fail(&e.to_string());
        let _ = rollback_sites(tx, &project.sites, &project.current);
        return Err(ReleaseError::CheckFailed(e));
    }
    ui::done("twine check passed");

    // ── Stage 7: Confirmation gate ──
    println!();
    println!("Summary:");
    println!("  Version:   {} -> {}", project.current, new_version);
    println!("  Artifacts: {} file(s) in dist/", artifact_paths.len());
    println!("  Upload to: PyPI ({} upload)", tools.twine);

    let confirmed = if config.assume_yes {
        println!();
        ui::skip("Confirmation skipped (--yes)");
        true
    } else {
        println!();
        let prompt = format!(
            "Upload {} to PyPI?",
            release_label(&project.package, &new_version)
        );
        match gate.confirm_upload(&prompt) {
            Ok(answer) => answer,
            Err(e) => {
                // An unreadable answer fails the run; it never counts as a yes
                ui::fail("Could not read confirmation");
                let _ = rollback_sites(tx, &project.sites, &project.current);
                return Err(e);
            }
        }
    };
    attempt.user_confirmed = confirmed;

    if !confirmed {
        rollback_sites(tx, &project.sites, &project.current)?;
        println!();
        println!("Release aborted. No artifacts were uploaded.");
        return Ok(attempt);
    }

    // ── Stage 8: Upload ──
    match upload_artifacts(runner, &tools.twine, &artifact_paths, root) {
        Ok(()) => {
            tx.commit();
            attempt.upload_succeeded = true;
            ui::done(&format!("Uploaded {} file(s)", artifact_paths.len()));
            println!();
            println!("Released {}!", release_label(&project.package, &new_version));
            Ok(attempt)
        }
        Err(e) => {
            ui::fail(&e.to_string());
            let _ = rollback_sites(tx, &project.sites, &project.current);
            Err(ReleaseError::UploadFailed(e))
        }
    }
}

/// Write the new version into every site, narrating each one.
fn rewrite_sites(sites: &[VersionSite], new_version: &Version) -> Result<(), SiteError> {
    for site in sites {
        write_site_version(site, new_version)?;
        ui::done(&format!("Updated {}", site.kind));
    }
    Ok(())
}

/// Restore the pre-bump version strings.
///
/// When the restore itself fails the operator is told which files to
/// fix by hand and which version they should carry.
fn rollback_sites(
    tx: VersionTransaction,
    sites: &[VersionSite],
    old_version: &Version,
) -> Result<(), ReleaseError> {
    println!();
    println!("Rolling back version changes...");

    match tx.rollback() {
        Ok(restored) => {
            for path in &restored {
                ui::done(&format!("Restored {}", path.display()));
            }
            Ok(())
        }
        Err(e) => {
            ui::fail(&format!("Rollback failed: {}", e));
            eprint!("{}", recovery_instructions(sites, old_version));
            Err(ReleaseError::RollbackFailed(e.to_string()))
        }
    }
}

/// Manual cleanup text for a failed rollback.
fn recovery_instructions(sites: &[VersionSite], old_version: &Version) -> String {
    let mut text = format!(
        "Restore these files to version {} by hand before the next release:\n",
        old_version
    );
    for site in sites {
        text.push_str(&format!("  {}\n", site.path.display()));
    }
    text
}

fn release_label(package: &str, version: &Version) -> String {
    if package.is_empty() {
        format!("version {}", version)
    } else {
        format!("{} {}", package, version)
    }
}
