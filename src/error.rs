//! Error types and handling for provenv
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for provenv operations
#[derive(Error, Diagnostic, Debug)]
pub enum ProvenvError {
    // Manifest errors
    #[error("Manifest not found: {path}")]
    #[diagnostic(
        code(provenv::manifest::not_found),
        help("Run 'provenv init' to create one, or pass --manifest <path>")
    )]
    ManifestNotFound { path: String },

    #[error("Manifest already exists: {path}")]
    #[diagnostic(
        code(provenv::manifest::already_exists),
        help("Pass --force to overwrite the existing manifest")
    )]
    ManifestExists { path: String },

    #[error("Failed to parse manifest: {path}")]
    #[diagnostic(code(provenv::manifest::parse_failed))]
    ManifestParseFailed { path: String, reason: String },

    #[error("Invalid manifest: {message}")]
    #[diagnostic(code(provenv::manifest::invalid))]
    ManifestInvalid { message: String },

    #[error("Invalid pin '{input}': {reason}")]
    #[diagnostic(
        code(provenv::manifest::invalid_pin),
        help("Pins use the exact form name==version, e.g. lxml==4.9.4")
    )]
    InvalidPin { input: String, reason: String },

    // Subprocess errors
    #[error("Failed to spawn '{program}': {reason}")]
    #[diagnostic(
        code(provenv::exec::spawn_failed),
        help("Check that the program is installed and on PATH")
    )]
    SpawnFailed { program: String, reason: String },

    #[error("Command failed ({status}): {command}\n{stderr}")]
    #[diagnostic(code(provenv::exec::command_failed))]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Unexpected output from '{command}': {reason}")]
    #[diagnostic(code(provenv::exec::unexpected_output))]
    UnexpectedOutput { command: String, reason: String },

    // Virtual environment errors
    #[error("Virtual environment python not found at: {path}")]
    #[diagnostic(
        code(provenv::venv::python_missing),
        help("Run 'provenv apply' to create the environment")
    )]
    VenvPythonMissing { path: String },

    #[error("Refusing to remove '{path}': not a virtual environment")]
    #[diagnostic(
        code(provenv::venv::not_a_venv),
        help("Only directories containing pyvenv.cfg are removed by --recreate")
    )]
    NotAVenv { path: String },

    // Verification errors
    #[error("Verification failed: {failed} of {total} checks did not pass")]
    #[diagnostic(
        code(provenv::verify::failed),
        help("Run 'provenv verify --format json' for machine-readable detail")
    )]
    VerificationFailed { failed: usize, total: usize },

    // Filesystem errors
    #[error("Failed to read {path}")]
    #[diagnostic(code(provenv::io::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write {path}")]
    #[diagnostic(code(provenv::io::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("{message}")]
    #[diagnostic(code(provenv::io::error))]
    IoError { message: String },

    // Operator interaction
    #[error("Aborted by operator")]
    #[diagnostic(code(provenv::prompt::aborted))]
    Aborted,

    #[error("Prompt failed: {reason}")]
    #[diagnostic(code(provenv::prompt::failed))]
    PromptFailed { reason: String },

    // Serialization errors
    #[error("Serialization failed: {reason}")]
    #[diagnostic(code(provenv::serialize::failed))]
    SerializeFailed { reason: String },
}

impl From<std::io::Error> for ProvenvError {
    fn from(err: std::io::Error) -> Self {
        ProvenvError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for ProvenvError {
    fn from(err: serde_yaml::Error) -> Self {
        ProvenvError::SerializeFailed {
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ProvenvError {
    fn from(err: serde_json::Error) -> Self {
        ProvenvError::SerializeFailed {
            reason: err.to_string(),
        }
    }
}

/// Convenience result type for provenv operations
pub type Result<T> = std::result::Result<T, ProvenvError>;
