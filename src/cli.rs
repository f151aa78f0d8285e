//! CLI definitions using clap derive API

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// provenv - declarative environment provisioner
///
/// Converge a Debian host to a declared Python application environment
/// (apt packages, virtualenv, pinned dependencies) and verify the result.
#[derive(Parser, Debug)]
#[command(
    name = "provenv",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Declarative provisioner for Python application environments",
    long_about = "provenv converges a Debian-based host to a declared environment state: \
                  a fixed set of apt packages, a Python virtual environment, and an exact \
                  set of pinned dependencies, described by a single provenv.yaml manifest. \
                  Reruns are idempotent: an already-converged host produces an empty plan.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n    \
                  provenv init\n    \
                  provenv plan --detailed\n    \
                  provenv apply\n    \
                  provenv apply --recreate --yes\n    \
                  provenv verify --format json\n\n\
                  \x1b[1m\x1b[32mManifest:\x1b[0m\n    \
                  ./provenv.yaml by default, or --manifest <path>"
)]
pub struct Cli {
    /// Manifest file (defaults to ./provenv.yaml)
    #[arg(long, short = 'm', global = true, value_name = "PATH")]
    pub manifest: Option<PathBuf>,

    /// Stream subprocess output instead of capturing it
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a starter manifest for the stock application environment
    Init(InitArgs),

    /// Show the actions a converge run would take, without executing
    Plan(PlanArgs),

    /// Converge the host to the manifest state
    Apply(ApplyArgs),

    /// Check the environment against the manifest and report pass/fail
    Verify(VerifyArgs),

    /// Print the resolved manifest
    Show,

    /// Show version information
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the init command
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Overwrite an existing manifest
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the plan command
#[derive(Parser, Debug)]
pub struct PlanArgs {
    /// List the packages and pins behind each step
    #[arg(long)]
    pub detailed: bool,
}

/// Arguments for the apply command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                   Converge the host:\n    provenv apply\n\n\
                   Rebuild the venv from scratch:\n    provenv apply --recreate\n\n\
                   Non-interactive rebuild (CI):\n    provenv apply --recreate --yes\n\n\
                   Converge without the closing verification:\n    provenv apply --skip-verify")]
pub struct ApplyArgs {
    /// Destroy and recreate the virtual environment
    #[arg(long)]
    pub recreate: bool,

    /// Skip the confirmation prompt for --recreate
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Do not run verification after converging
    #[arg(long)]
    pub skip_verify: bool,
}

/// Output format for verification reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}

/// Arguments for the verify command
#[derive(Parser, Debug)]
pub struct VerifyArgs {
    /// Report format
    #[arg(long, value_enum, default_value = "text")]
    pub format: ReportFormat,
}

/// Arguments for the completions command
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for (bash, elvish, fish, powershell, zsh)
    pub shell: String,
}
