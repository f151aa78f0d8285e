//! Verify command: check the environment and report pass/fail

use std::path::PathBuf;

use crate::cli::{ReportFormat, VerifyArgs};
use crate::commands::helpers::load_manifest;
use crate::error::{ProvenvError, Result};
use crate::exec::SystemRunner;
use crate::ui::display;
use crate::verify;

pub fn run(manifest_path: Option<PathBuf>, args: VerifyArgs) -> Result<()> {
    let manifest = load_manifest(manifest_path)?;
    let runner = SystemRunner::new(&manifest.env_pairs());

    let report = verify::run(&runner, &manifest)?;

    match args.format {
        ReportFormat::Text => display::print_report(&report),
        ReportFormat::Json => println!("{}", report.to_json()?),
    }

    if !report.passed() {
        return Err(ProvenvError::VerificationFailed {
            failed: report.failed_count(),
            total: report.total(),
        });
    }
    Ok(())
}
