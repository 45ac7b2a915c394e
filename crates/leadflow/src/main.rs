// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Leadflow - CRM lead enrichment pipeline.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod adapters;
mod check;
mod process;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use leadflow_config::LeadflowConfig;

/// Leadflow - CRM lead enrichment pipeline.
#[derive(Parser, Debug)]
#[command(name = "leadflow", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Consume the delivery queue until interrupted.
    Serve,
    /// Run one delivery body through the engine and print the report.
    ///
    /// Exits non-zero when the delivery must be redelivered.
    Process {
        /// Read the body from a file instead of stdin.
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,
    },
    /// Store a CRM webhook payload as a raw object.
    Ingest {
        /// Read the payload from a file instead of stdin.
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,
    },
    /// Validate configuration and probe every collaborator.
    Check,
}

fn load_config(path: Option<&PathBuf>) -> LeadflowConfig {
    let loaded = match path {
        Some(path) => leadflow_config::load_and_validate_path(path),
        None => leadflow_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            leadflow_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref());
    init_tracing(&config.log.level);

    let result = match cli.command {
        Commands::Serve => serve::run_serve(config).await,
        Commands::Process { file } => process::run_process(config, file.as_deref()).await,
        Commands::Ingest { file } => process::run_ingest(config, file.as_deref()).await,
        Commands::Check => check::run_check(config).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Logs go to stderr so `process` and `ingest` keep stdout for JSON.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("leadflow={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::try_parse_from(["leadflow", "process", "--config", "lf.toml", "--file", "body.json"])
            .expect("parse");
        assert_eq!(cli.config, Some(PathBuf::from("lf.toml")));
        match cli.command {
            Commands::Process { file } => assert_eq!(file, Some(PathBuf::from("body.json"))),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["leadflow"]).is_err());
    }
}
