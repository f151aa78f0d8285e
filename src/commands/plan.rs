//! Plan command: preview the converge without executing

use std::path::PathBuf;

use crate::cli::PlanArgs;
use crate::commands::helpers::load_manifest;
use crate::error::Result;
use crate::exec::SystemRunner;
use crate::probe;
use crate::ui::display;

pub fn run(manifest_path: Option<PathBuf>, args: PlanArgs) -> Result<()> {
    let manifest = load_manifest(manifest_path)?;
    let runner = SystemRunner::new(&manifest.env_pairs());

    let observed = probe::observe(&runner, &manifest)?;
    let plan = crate::plan::compute(&manifest, &observed, false)?;

    display::print_plan(&plan, args.detailed);
    Ok(())
}
