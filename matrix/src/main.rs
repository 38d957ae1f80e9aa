//! Compatibility-matrix integration test for the `blogger` client.
//!
//! Replays list/post/tag/delete against one blog for every installed version
//! of the client's data-access library and asserts post counts in between.

use std::path::PathBuf;

use anyhow::Result;
use blogger_matrix::cli::{self, RunOptions};
use blogger_matrix::{exit_codes, logging};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "blogger-matrix",
    version,
    about = "Run the blogger client against every library version"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Authenticate once, then post, tag and delete against every version.
    Run {
        /// Account used for the one-time forced auth.
        username: Option<String>,
        /// Blog every invocation targets.
        blog_name: Option<String>,
        /// Config file (default: `blogger-matrix.toml` if present).
        #[arg(long)]
        config: Option<PathBuf>,
        /// Write `meta.json` and `versions.json` under this directory.
        #[arg(long)]
        results_dir: Option<PathBuf>,
    },
    /// Print each version and its library path.
    Versions {
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the steps replayed for each version.
    Plan {
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Aggregate runs captured with `--results-dir`.
    Report { results_dir: PathBuf },
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let base_dir = std::env::current_dir()?;
    match cli.command {
        Command::Run {
            username,
            blog_name,
            config,
            results_dir,
        } => cli::run_command(
            &base_dir,
            &RunOptions {
                username,
                blog_name,
                config_path: config,
                results_dir,
            },
        ),
        Command::Versions { config } => {
            cli::list_versions(&base_dir, config.as_deref())?;
            Ok(exit_codes::OK)
        }
        Command::Plan { config } => {
            cli::show_plan(&base_dir, config.as_deref())?;
            Ok(exit_codes::OK)
        }
        Command::Report { results_dir } => {
            cli::report_results(&base_dir.join(results_dir))?;
            Ok(exit_codes::OK)
        }
    }
}
