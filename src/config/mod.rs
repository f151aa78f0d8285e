//! Manifest configuration for provenv

pub mod manifest;
pub mod pin;

pub use manifest::{IsolatedPackage, Manifest};
pub use pin::Pin;
