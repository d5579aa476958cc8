//! Inline failure annotations (GitHub Actions workflow commands).

use std::fmt;
use std::path::{Path, PathBuf};

use crate::index::TestIndex;
use crate::junit::TestCase;

/// An `::error` annotation attached to a file and line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub file: PathBuf,
    pub line: u32,
    pub message: String,
}

impl Annotation {
    /// Build the annotation for a failing case.
    ///
    /// The location is the test's declaration site when the index knows the
    /// name, otherwise line 1 of the results file.
    pub fn for_failure(platform: &str, case: &TestCase, results_path: &Path, index: &TestIndex) -> Self {
        let (file, line) = match index.lookup(&case.name) {
            Some(location) => (location.file.clone(), location.line),
            None => (results_path.to_path_buf(), 1),
        };

        Self {
            file,
            line,
            message: format!(
                "{} {}: {}",
                platform,
                case.display_name(),
                case.failure.as_deref().unwrap_or_default()
            ),
        }
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "::error file={},line={},col=0::{}",
            escape_property(&self.file.to_string_lossy()),
            self.line,
            escape_data(&self.message)
        )
    }
}

fn escape_data(s: &str) -> String {
    s.replace('%', "%25").replace('\r', "%0D").replace('\n', "%0A")
}

fn escape_property(s: &str) -> String {
    escape_data(s).replace(':', "%3A").replace(',', "%2C")
}
