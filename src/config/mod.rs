//! Configuration for the CI helpers
//!
//! Two layers, resolved once at process start:
//! 1. Repo config file (.github/player-ci.toml), falling back to built-in defaults
//! 2. Process environment set by the CI runner (step statuses, job summary path)

mod environment;
mod repo;

pub use environment::{CiEnvironment, ANDROID_STATUS_VAR, IOS_STATUS_VAR, STEP_SUMMARY_VAR};
pub use repo::{ChangelogSettings, CiConfig, ConfigError, SummarySettings, DEFAULT_CONFIG_PATH};
