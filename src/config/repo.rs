//! Repo configuration (.github/player-ci.toml)
//!
//! Every key is optional; a missing file means built-in defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use changelog_bump::{EntryTemplate, DEFAULT_CHANGELOG_FILE, DEFAULT_ENTRY_TEMPLATE};
use junit_summary::{IndexOptions, SummaryOptions, DEFAULT_TITLE};

/// Default location of the repo config file
pub const DEFAULT_CONFIG_PATH: &str = ".github/player-ci.toml";

/// Error types for config operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Settings for `player-ci summarize`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarySettings {
    /// Top-level heading of the job summary
    #[serde(default = "default_title")]
    pub title: String,

    /// Call prefixes that declare a test in the test sources (e.g. "spec.it")
    #[serde(default = "default_call_prefixes")]
    pub call_prefixes: Vec<String>,

    /// Extensions of test source files to scan
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

fn default_call_prefixes() -> Vec<String> {
    IndexOptions::default().call_prefixes
}

fn default_extensions() -> Vec<String> {
    IndexOptions::default().extensions
}

impl Default for SummarySettings {
    fn default() -> Self {
        Self {
            title: default_title(),
            call_prefixes: default_call_prefixes(),
            extensions: default_extensions(),
        }
    }
}

impl SummarySettings {
    pub fn index_options(&self) -> IndexOptions {
        IndexOptions {
            call_prefixes: self.call_prefixes.clone(),
            extensions: self.extensions.clone(),
        }
    }

    pub fn summary_options(&self) -> SummaryOptions {
        SummaryOptions {
            title: self.title.clone(),
        }
    }
}

/// Settings for `player-ci changelog`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogSettings {
    /// Changelog path, relative to the working directory
    #[serde(default = "default_changelog_file")]
    pub file: PathBuf,

    /// Entry line with `{platform}` and `{version}` placeholders
    #[serde(default = "default_entry_template")]
    pub entry_template: String,
}

fn default_changelog_file() -> PathBuf {
    PathBuf::from(DEFAULT_CHANGELOG_FILE)
}

fn default_entry_template() -> String {
    DEFAULT_ENTRY_TEMPLATE.to_string()
}

impl Default for ChangelogSettings {
    fn default() -> Self {
        Self {
            file: default_changelog_file(),
            entry_template: default_entry_template(),
        }
    }
}

impl ChangelogSettings {
    /// Parsed entry template
    pub fn template(&self) -> Result<EntryTemplate, ConfigError> {
        EntryTemplate::new(&self.entry_template)
            .map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

/// Configuration from .github/player-ci.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CiConfig {
    #[serde(default)]
    pub summary: SummarySettings,

    #[serde(default)]
    pub changelog: ChangelogSettings,
}

impl CiConfig {
    /// Load the config for this run.
    ///
    /// An explicitly given path must exist. Without one, the default path is
    /// used when present and built-in defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) if !path.exists() => Err(ConfigError::NotFound(path.to_path_buf())),
            Some(path) => Self::from_file(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_PATH);
                if path.exists() {
                    Self::from_file(path)
                } else {
                    tracing::debug!(path = DEFAULT_CONFIG_PATH, "no config file, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load and parse config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = Self::parse(&contents)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Parse config from a TOML string
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let config: CiConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.summary.title.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "'summary.title' cannot be empty".to_string(),
            ));
        }

        if self.summary.call_prefixes.is_empty() {
            return Err(ConfigError::ValidationError(
                "At least one call prefix must be defined in 'summary.call_prefixes'".to_string(),
            ));
        }
        if self.summary.call_prefixes.iter().any(|p| p.trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "'summary.call_prefixes' cannot contain empty prefixes".to_string(),
            ));
        }

        if self.summary.extensions.is_empty() {
            return Err(ConfigError::ValidationError(
                "At least one extension must be defined in 'summary.extensions'".to_string(),
            ));
        }

        if self.changelog.file.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "'changelog.file' cannot be empty".to_string(),
            ));
        }

        self.changelog.template()?;

        Ok(())
    }
}
