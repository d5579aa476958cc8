//! Native SDK version entries for Keep-a-Changelog files.
//!
//! Inserts or replaces a single `Update <Platform> SDK version` line in the
//! `## [Unreleased]` / `### Changed` section, creating the sections when they
//! are missing. Applying the same entry twice leaves the file unchanged.

mod document;
mod update;
mod version;

pub use document::{ChangelogDocument, EntryChange, Section};
pub use update::{update_changelog_file, UpdateOutcome, DEFAULT_CHANGELOG_FILE};
pub use version::{EntryTemplate, Platform, Version, DEFAULT_ENTRY_TEMPLATE, SEMVER_PATTERN};

use std::path::PathBuf;

/// Errors for changelog updates
#[derive(Debug, thiserror::Error)]
pub enum ChangelogError {
    #[error("Invalid platform '{0}'. Must be 'android' or 'ios'.")]
    InvalidPlatform(String),

    #[error("Invalid version '{0}'. Must be SemVer, e.g. 1.2.3, 1.2.3-beta.1, or 1.2.3+build.")]
    InvalidVersion(String),

    #[error("Invalid entry template '{template}': {reason}")]
    InvalidTemplate { template: String, reason: String },

    #[error("{0} not found")]
    NotFound(PathBuf),

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
