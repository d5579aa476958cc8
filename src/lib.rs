//! player-ci - CI helpers for the player SDK
//!
//! Two independent commands run by the CI pipeline:
//! - `summarize`: turns per-platform JUnit results into a Markdown job
//!   summary with inline failure annotations
//! - `changelog`: records a native SDK version bump in CHANGELOG.md

pub mod commands;
pub mod config;

pub use commands::CommandError;
pub use config::{CiConfig, CiEnvironment, ConfigError};
