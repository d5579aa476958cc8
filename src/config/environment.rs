//! Process environment captured at startup
//!
//! The CI runner passes per-platform step statuses and the job summary path
//! through environment variables. They are read once into [`CiEnvironment`]
//! and handed to the commands explicitly.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use junit_summary::PlatformInput;

/// Exit status of the Android test step
pub const ANDROID_STATUS_VAR: &str = "ANDROID_STATUS";
/// Exit status of the iOS test step
pub const IOS_STATUS_VAR: &str = "IOS_STATUS";
/// File the job summary Markdown is appended to
pub const STEP_SUMMARY_VAR: &str = "GITHUB_STEP_SUMMARY";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CiEnvironment {
    pub android_status: Option<String>,
    pub ios_status: Option<String>,
    pub step_summary_path: Option<PathBuf>,
}

impl CiEnvironment {
    /// Read from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read through an arbitrary lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            android_status: lookup(ANDROID_STATUS_VAR),
            ios_status: lookup(IOS_STATUS_VAR),
            step_summary_path: lookup(STEP_SUMMARY_VAR)
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        }
    }

    /// Summarizer inputs in platform order (Android, then iOS)
    pub fn platform_inputs(&self, android: Option<PathBuf>, ios: Option<PathBuf>) -> Vec<PlatformInput> {
        vec![
            PlatformInput::new("Android", android, self.android_status.clone()),
            PlatformInput::new("iOS", ios, self.ios_status.clone()),
        ]
    }

    /// Append Markdown to the job summary file, if one is configured.
    ///
    /// Returns the path written to.
    pub fn append_step_summary(&self, markdown: &str) -> io::Result<Option<&Path>> {
        let Some(path) = self.step_summary_path.as_deref() else {
            return Ok(None);
        };

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(markdown.as_bytes())?;
        if !markdown.ends_with('\n') {
            file.write_all(b"\n")?;
        }

        Ok(Some(path))
    }
}
