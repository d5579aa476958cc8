//! player-ci CLI
//!
//! Entry point for the `player-ci` command-line tool.

use clap::{Parser, Subcommand};
use player_ci::commands::changelog::{ChangelogArgs, ChangelogRequest};
use player_ci::commands::summarize::{self, SummarizeArgs};
use player_ci::{CiConfig, CiEnvironment};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (e.g. "debug")
const LOG_ENV_VAR: &str = "PLAYER_CI_LOG";

#[derive(Parser)]
#[command(name = "player-ci")]
#[command(about = "CI helpers for the player SDK", version)]
struct Cli {
    /// Path to repo config file (default: .github/player-ci.toml)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize integration test results into the job summary
    Summarize {
        /// Android JUnit results file
        #[arg(long)]
        android: Option<PathBuf>,

        /// iOS JUnit results file
        #[arg(long)]
        ios: Option<PathBuf>,

        /// Test source directory used to locate failing tests
        #[arg(long)]
        test_root: Option<PathBuf>,
    },

    /// Add or update the native SDK version entry in the changelog
    Changelog {
        /// SemVer version, e.g. 1.2.3 or 1.2.3-beta.1
        #[arg(value_name = "VERSION")]
        sdk_version: String,

        /// Platform: android or ios
        platform: String,

        /// Changelog file (default: CHANGELOG.md)
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

fn main() {
    init_logging();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            process::exit(code);
        }
    };

    let config = match CiConfig::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            process::exit(1);
        }
    };

    match cli.command {
        Commands::Summarize { android, ios, test_root } => {
            run_summarize(
                SummarizeArgs {
                    android,
                    ios,
                    test_root,
                },
                &config,
            );
        }
        Commands::Changelog {
            sdk_version,
            platform,
            file,
        } => {
            run_changelog(
                ChangelogArgs {
                    version: sdk_version,
                    platform,
                    file,
                },
                &config,
            );
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_summarize(args: SummarizeArgs, config: &CiConfig) {
    let env = CiEnvironment::from_env();

    let outcome = match summarize::run(&args, &config.summary, &env) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Error summarizing results: {}", e);
            process::exit(1);
        }
    };

    for annotation in &outcome.annotations {
        println!("{}", annotation);
    }

    // Exit with appropriate code
    if outcome.failed {
        process::exit(1);
    }
}

fn run_changelog(args: ChangelogArgs, config: &CiConfig) {
    let request = match ChangelogRequest::validate(&args, &config.changelog) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    println!(
        "Adding entry for platform '{}' with version '{}' to {}",
        request.platform.key(),
        request.version,
        request.path.display()
    );

    match request.apply() {
        Ok(_) => println!("Changelog updated successfully."),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
