//! Plan execution
//!
//! Runs a plan's actions strictly in order. The first failing action
//! aborts the run with that command's output attached; there is no retry
//! and no rollback of OS package state.

use crate::apt;
use crate::config::Manifest;
use crate::error::Result;
use crate::exec::CommandRunner;
use crate::pip;
use crate::plan::{Action, Plan};
use crate::progress::ProgressDisplay;
use crate::stamp;
use crate::ui::display;
use crate::venv;

/// Execute every action of the plan in order
pub fn execute(
    runner: &dyn CommandRunner,
    manifest: &Manifest,
    plan: &Plan,
    verbose: bool,
) -> Result<()> {
    let progress = ProgressDisplay::new(plan.len() as u64);

    for action in &plan.actions {
        progress.start_step(&action.summary());
        if let Err(err) = run_action(runner, manifest, action, verbose) {
            progress.abandon();
            return Err(err);
        }
        progress.inc();
    }

    progress.finish("converged");
    Ok(())
}

fn run_action(
    runner: &dyn CommandRunner,
    manifest: &Manifest,
    action: &Action,
    verbose: bool,
) -> Result<()> {
    match action {
        Action::RefreshPackageIndex => apt::update(runner, verbose),
        Action::InstallOsPackages { packages } => apt::install(runner, packages, verbose),
        Action::CreateVenv { recreate } => {
            if *recreate {
                venv::remove(&manifest.venv)?;
            }
            venv::create(runner, manifest)
        }
        Action::UpgradeBootstrap { pins } => {
            pip::install_pins(runner, &manifest.venv, pins, verbose)
        }
        Action::InstallRequirements { path } => {
            pip::install_requirements(runner, &manifest.venv, path, verbose)
        }
        Action::InstallIsolated { package } => {
            pip::install_isolated(runner, &manifest.venv, package)
        }
        Action::CleanCaches => clean_caches(runner, manifest),
        Action::WriteStamp { digest } => stamp::write(&manifest.venv, digest),
    }
}

fn clean_caches(runner: &dyn CommandRunner, manifest: &Manifest) -> Result<()> {
    let before = pip::cache_size_bytes();
    apt::clean(runner)?;
    pip::cache_purge(runner, &manifest.venv)?;
    let after = pip::cache_size_bytes();

    let freed = before.saturating_sub(after);
    if freed > 0 {
        println!("  freed {} of pip cache", display::format_size(freed));
    }
    Ok(())
}
