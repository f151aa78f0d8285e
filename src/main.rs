//! provenv - declarative environment provisioner
//!
//! Converges a Debian-based host to a declared Python application
//! environment (apt packages, virtualenv, pinned dependencies) from a
//! single provenv.yaml manifest, then verifies the result.

use clap::Parser;

mod apt;
mod cli;
mod commands;
mod config;
mod error;
mod exec;
mod executor;
mod pip;
mod plan;
mod probe;
mod progress;
mod stamp;
mod ui;
mod venv;
mod verify;

#[cfg(test)]
mod test_fixtures;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init(args) => commands::init::run(cli.manifest, args),
        Commands::Plan(args) => commands::plan::run(cli.manifest, args),
        Commands::Apply(args) => commands::apply::run(cli.manifest, args, cli.verbose),
        Commands::Verify(args) => commands::verify::run(cli.manifest, args),
        Commands::Show => commands::show::run(cli.manifest),
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
