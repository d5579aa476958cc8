//! Command implementations behind the `player-ci` binary
//!
//! Commands return outcomes and errors; printing and exit codes are left to
//! the binary.

pub mod changelog;
pub mod summarize;

use std::path::PathBuf;

use changelog_bump::ChangelogError;
use junit_summary::SummaryError;

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Summary(#[from] SummaryError),

    #[error(transparent)]
    Changelog(#[from] ChangelogError),

    #[error("Failed to append job summary to {path}: {source}")]
    SummaryWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
