//! Init command: write the starter manifest

use std::fs;
use std::path::PathBuf;

use crate::cli::InitArgs;
use crate::commands::helpers::resolve_manifest_path;
use crate::config::Manifest;
use crate::error::{ProvenvError, Result};

pub fn run(manifest_path: Option<PathBuf>, args: InitArgs) -> Result<()> {
    let path = resolve_manifest_path(manifest_path);

    if path.exists() && !args.force {
        return Err(ProvenvError::ManifestExists {
            path: path.display().to_string(),
        });
    }

    let manifest = Manifest::default_manifest();
    let yaml = manifest.to_yaml()?;
    fs::write(&path, yaml).map_err(|e| ProvenvError::FileWriteFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    // The stock manifest points at requirements.txt; give it a seed so
    // a fresh checkout applies without editing anything first.
    if let Some(requirements) = &manifest.requirements {
        let requirements_path = path
            .parent()
            .map(|parent| parent.join(requirements))
            .unwrap_or_else(|| requirements.clone());
        if !requirements_path.exists() {
            fs::write(&requirements_path, "# application dependencies\n").map_err(|e| {
                ProvenvError::FileWriteFailed {
                    path: requirements_path.display().to_string(),
                    reason: e.to_string(),
                }
            })?;
        }
    }

    println!("Wrote {}", path.display());
    println!("Edit the manifest, then run 'provenv plan' to preview the converge.");
    Ok(())
}
