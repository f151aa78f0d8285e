//! Show command: print the resolved manifest

use std::path::PathBuf;

use crate::commands::helpers::load_manifest;
use crate::error::Result;
use crate::ui::display;

pub fn run(manifest_path: Option<PathBuf>) -> Result<()> {
    let manifest = load_manifest(manifest_path)?;
    display::print_manifest(&manifest);
    Ok(())
}
