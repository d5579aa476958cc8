//! `player-ci changelog`

use std::path::PathBuf;

use changelog_bump::{update_changelog_file, EntryTemplate, Platform, UpdateOutcome, Version};

use super::CommandError;
use crate::config::ChangelogSettings;

/// Command-line inputs for the changelog updater
#[derive(Debug, Clone)]
pub struct ChangelogArgs {
    pub version: String,
    pub platform: String,
    /// Overrides the configured changelog path
    pub file: Option<PathBuf>,
}

/// Validated update, ready to apply
#[derive(Debug, Clone)]
pub struct ChangelogRequest {
    pub platform: Platform,
    pub version: Version,
    pub path: PathBuf,
    pub template: EntryTemplate,
}

impl ChangelogRequest {
    /// Validate arguments without touching the changelog file.
    ///
    /// The platform is checked before the version.
    pub fn validate(args: &ChangelogArgs, settings: &ChangelogSettings) -> Result<Self, CommandError> {
        let platform = Platform::from_key(&args.platform)?;
        let version = Version::parse(&args.version)?;
        let template = settings.template()?;

        Ok(Self {
            platform,
            version,
            path: args.file.clone().unwrap_or_else(|| settings.file.clone()),
            template,
        })
    }

    pub fn apply(&self) -> Result<UpdateOutcome, CommandError> {
        let outcome = update_changelog_file(&self.path, self.platform, &self.version, &self.template)?;
        tracing::info!(
            path = %self.path.display(),
            platform = self.platform.key(),
            version = %self.version,
            change = ?outcome.change,
            "changelog entry applied"
        );
        Ok(outcome)
    }
}
