//! Apply command: converge the host to the manifest state

use std::path::PathBuf;

use crate::cli::ApplyArgs;
use crate::commands::helpers::load_manifest;
use crate::error::{ProvenvError, Result};
use crate::exec::SystemRunner;
use crate::executor;
use crate::probe;
use crate::ui::display;
use crate::venv;
use crate::verify;

pub fn run(manifest_path: Option<PathBuf>, args: ApplyArgs, verbose: bool) -> Result<()> {
    let manifest = load_manifest(manifest_path)?;
    let runner = SystemRunner::new(&manifest.env_pairs());

    if args.recreate && venv::exists(&manifest.venv) && !args.yes {
        confirm_recreate(&manifest.venv)?;
    }

    let observed = probe::observe(&runner, &manifest)?;
    let plan = crate::plan::compute(&manifest, &observed, args.recreate)?;

    if plan.is_converged() {
        println!("Environment already converged.");
        return Ok(());
    }

    display::print_plan(&plan, false);
    println!();
    executor::execute(&runner, &manifest, &plan, verbose)?;

    if args.skip_verify {
        return Ok(());
    }

    println!();
    let report = verify::run(&runner, &manifest)?;
    display::print_report(&report);
    if !report.passed() {
        return Err(ProvenvError::VerificationFailed {
            failed: report.failed_count(),
            total: report.total(),
        });
    }
    Ok(())
}

fn confirm_recreate(venv_path: &std::path::Path) -> Result<()> {
    let prompt = format!(
        "Recreate {}? The existing environment will be deleted.",
        venv_path.display()
    );
    let confirmed = inquire::Confirm::new(&prompt)
        .with_default(false)
        .prompt()
        .map_err(|e| ProvenvError::PromptFailed {
            reason: e.to_string(),
        })?;

    if !confirmed {
        return Err(ProvenvError::Aborted);
    }
    Ok(())
}
