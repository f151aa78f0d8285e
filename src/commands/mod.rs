//! Command implementations for the provenv CLI

pub mod apply;
pub mod completions;
pub mod helpers;
pub mod init;
pub mod plan;
pub mod show;
pub mod verify;
pub mod version;
