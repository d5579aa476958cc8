//! Platform keys, SemVer validation and the entry line template.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex_lite::Regex;

use crate::ChangelogError;

/// MAJOR.MINOR.PATCH with optional `-prerelease` and `+build` metadata
pub const SEMVER_PATTERN: &str = r"[0-9]+\.[0-9]+\.[0-9]+(?:-[0-9A-Za-z.-]+)?(?:\+[0-9A-Za-z.-]+)?";

/// Entry line written into the Changed list
pub const DEFAULT_ENTRY_TEMPLATE: &str = "- Update {platform} SDK version to `{version}`";

const PLATFORM_PLACEHOLDER: &str = "{platform}";
const VERSION_PLACEHOLDER: &str = "{version}";

fn semver_regex() -> &'static Regex {
    static SEMVER: OnceLock<Regex> = OnceLock::new();
    SEMVER.get_or_init(|| Regex::new(&format!("^{}$", SEMVER_PATTERN)).expect("semver pattern compiles"))
}

/// Native SDK platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Android,
    Ios,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::Android, Platform::Ios];

    /// Parse a platform key, ignoring case and surrounding whitespace
    pub fn from_key(key: &str) -> Result<Self, ChangelogError> {
        match key.trim().to_ascii_lowercase().as_str() {
            "android" => Ok(Platform::Android),
            "ios" => Ok(Platform::Ios),
            _ => Err(ChangelogError::InvalidPlatform(key.to_string())),
        }
    }

    /// Lowercase command-line key
    pub fn key(&self) -> &'static str {
        match self {
            Platform::Android => "android",
            Platform::Ios => "ios",
        }
    }

    /// Label used in changelog entries
    pub fn label(&self) -> &'static str {
        match self {
            Platform::Android => "Android",
            Platform::Ios => "iOS",
        }
    }
}

impl FromStr for Platform {
    type Err = ChangelogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A validated SemVer string
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version(String);

impl Version {
    /// Validate a version; surrounding whitespace is ignored
    pub fn parse(s: &str) -> Result<Self, ChangelogError> {
        let trimmed = s.trim();
        if semver_regex().is_match(trimmed) {
            Ok(Version(trimmed.to_string()))
        } else {
            Err(ChangelogError::InvalidVersion(s.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Version {
    type Err = ChangelogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Entry line template with `{platform}` and `{version}` placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryTemplate {
    prefix: String,
    suffix: String,
}

impl Default for EntryTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_ENTRY_TEMPLATE).expect("default entry template is valid")
    }
}

impl EntryTemplate {
    /// Parse a template. It must contain `{version}` exactly once.
    pub fn new(template: &str) -> Result<Self, ChangelogError> {
        let invalid = |reason: &str| ChangelogError::InvalidTemplate {
            template: template.to_string(),
            reason: reason.to_string(),
        };

        if template.contains('\n') || template.contains('\r') {
            return Err(invalid("must be a single line"));
        }
        if template.trim().is_empty() {
            return Err(invalid("must not be empty"));
        }

        let mut parts = template.split(VERSION_PLACEHOLDER);
        let prefix = parts.next().unwrap_or_default();
        let Some(suffix) = parts.next() else {
            return Err(invalid("missing {version} placeholder"));
        };
        if parts.next().is_some() {
            return Err(invalid("{version} must appear exactly once"));
        }

        Ok(Self {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
        })
    }

    /// Canonical entry line for a platform and version
    pub fn render(&self, platform: Platform, version: &Version) -> String {
        format!(
            "{}{}{}",
            self.prefix.replace(PLATFORM_PLACEHOLDER, platform.label()),
            version,
            self.suffix.replace(PLATFORM_PLACEHOLDER, platform.label())
        )
    }

    /// Full-line matcher for this platform's entry with any valid version
    pub fn matcher(&self, platform: Platform) -> Regex {
        let pattern = format!(
            "^{}{}{}$",
            regex_lite::escape(&self.prefix.replace(PLATFORM_PLACEHOLDER, platform.label())),
            SEMVER_PATTERN,
            regex_lite::escape(&self.suffix.replace(PLATFORM_PLACEHOLDER, platform.label()))
        );
        Regex::new(&pattern).expect("escaped entry pattern compiles")
    }
}
