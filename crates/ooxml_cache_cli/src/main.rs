//! ooxml-cache CLI
//!
//! Command-line access to the three-tier part cache of an OOXML package.

use std::process::ExitCode;

use clap::Parser;
use miette::Result;
use tracing::error;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(has_errors) => {
            if has_errors {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            error!("{:?}", e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<bool> {
    let cache = commands::open_cache(&cli)?;

    match cli.command {
        Commands::Path { logical_path, tier } => {
            commands::paths::run_path(&cache, &logical_path, tier.into())
        }
        Commands::Resolve { path } => commands::paths::run_resolve(&cache, &path),
        Commands::Create {
            logical_path,
            source,
            empty_compare,
        } => commands::parts::run_create(&cache, &logical_path, &source, empty_compare),
        Commands::Update {
            logical_path,
            source,
            no_compare,
        } => commands::parts::run_update(&cache, &logical_path, &source, no_compare),
        Commands::Pin {
            logical_path,
            source,
        } => commands::parts::run_pin(&cache, &logical_path, &source),
        Commands::Show { logical_path, tier } => {
            commands::parts::run_show(&cache, &logical_path, tier.into())
        }
        Commands::Delete { logical_path } => commands::parts::run_delete(&cache, &logical_path),
        Commands::List => commands::session::run_list(&cache),
        Commands::Reset => commands::session::run_reset(&cache),
    }
}
