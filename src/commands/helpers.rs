//! Command helper utilities

use std::path::PathBuf;

use crate::config::Manifest;
use crate::error::Result;

/// Default manifest file name in the working directory
pub const DEFAULT_MANIFEST: &str = "provenv.yaml";

/// Resolve the manifest path from the optional global flag
pub fn resolve_manifest_path(manifest: Option<PathBuf>) -> PathBuf {
    manifest.unwrap_or_else(|| PathBuf::from(DEFAULT_MANIFEST))
}

/// Load and validate the manifest the command operates on
pub fn load_manifest(manifest: Option<PathBuf>) -> Result<Manifest> {
    Manifest::load(&resolve_manifest_path(manifest))
}
