//! slipway - CLI entry point.

use std::path::PathBuf;

use clap::Parser;

use slipway::release::{run_release, ReleaseConfig};
use slipway::ui;
use slipway::version::BumpKind;

/// Release a Python package to PyPI behind a confirmation gate.
#[derive(Parser, Debug)]
#[command(name = "slipway")]
#[command(about = "Bump, build, verify, and upload a Python package behind a y/N gate")]
#[command(version)]
struct Cli {
    /// Version component to bump
    #[arg(value_enum, default_value_t = BumpKind::Minor)]
    bump: BumpKind,

    /// Project directory containing pyproject.toml
    #[arg(short = 'C', long = "project-dir", default_value = ".")]
    project_dir: PathBuf,

    /// Skip the confirmation prompt and upload
    #[arg(short = 'y', long = "yes")]
    yes: bool,

    /// Show what would happen without changing anything
    #[arg(long)]
    dry_run: bool,

    /// Verbose diagnostics
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let config = ReleaseConfig {
        bump: cli.bump,
        project_dir: cli.project_dir,
        assume_yes: cli.yes,
        dry_run: cli.dry_run,
    };

    if let Err(err) = run_release(&config) {
        let code = err.exit_code();
        ui::error(&format!("{:#}", anyhow::Error::new(err)));
        std::process::exit(code);
    }
}

/// Diagnostics go to stderr; stdout carries the pipeline narration.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "slipway=debug" } else { "slipway=warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
