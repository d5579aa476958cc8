//! Test declaration index
//!
//! Maps test names to the file and line where they are declared, so failure
//! annotations can point at the test source instead of the results file.
//! This is a line-oriented scan for a known call prefix, not a parser.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use regex_lite::Regex;
use walkdir::WalkDir;

use crate::SummaryError;

/// Where a test is declared
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestLocation {
    /// Source file path (as reached from the scan root)
    pub file: PathBuf,
    /// 1-based line number
    pub line: u32,
}

/// Options controlling which files are scanned and what counts as a test declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexOptions {
    /// Call prefixes introducing a test, e.g. `spec.it`
    pub call_prefixes: Vec<String>,
    /// File extensions to scan (without the dot)
    pub extensions: Vec<String>,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            call_prefixes: vec!["spec.it".to_string()],
            extensions: ["ts", "tsx", "js", "jsx"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Test name to declaration site
#[derive(Debug, Default)]
pub struct TestIndex {
    entries: HashMap<String, TestLocation>,
    pattern: Option<Regex>,
}

impl TestIndex {
    /// Create an empty index that recognises the given options' call prefixes
    pub fn new(options: &IndexOptions) -> Result<Self, SummaryError> {
        Ok(Self {
            entries: HashMap::new(),
            pattern: Some(declaration_pattern(&options.call_prefixes)?),
        })
    }

    /// Scan every matching source file below `root`.
    ///
    /// A missing root yields an empty index.
    pub fn scan(root: &Path, options: &IndexOptions) -> Result<Self, SummaryError> {
        let mut index = Self::new(options)?;

        if !root.exists() {
            tracing::warn!(root = %root.display(), "test source root does not exist, annotations will point at results files");
            return Ok(index);
        }

        for entry in WalkDir::new(root)
            .follow_links(false)
            .sort_by(|a, b| a.file_name().cmp(b.file_name()))
        {
            let entry = entry?;
            if !entry.file_type().is_file() || !has_extension(entry.path(), &options.extensions) {
                continue;
            }

            let content = match fs::read_to_string(entry.path()) {
                Ok(content) => content,
                Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                    tracing::debug!(path = %entry.path().display(), "skipping non UTF-8 source file");
                    continue;
                }
                Err(source) => {
                    return Err(SummaryError::Io {
                        path: entry.path().to_path_buf(),
                        source,
                    })
                }
            };
            index.index_source(entry.path(), &content);
        }

        tracing::debug!(root = %root.display(), tests = index.len(), "indexed test declarations");
        Ok(index)
    }

    /// Index the declarations found in one file's content.
    ///
    /// Later declarations of the same name replace earlier ones.
    pub fn index_source(&mut self, path: &Path, content: &str) {
        let Some(pattern) = &self.pattern else {
            return;
        };

        for (idx, line) in content.lines().enumerate() {
            let Some(caps) = pattern.captures(line) else {
                continue;
            };
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();

            self.entries.insert(
                name,
                TestLocation {
                    file: path.to_path_buf(),
                    line: idx as u32 + 1,
                },
            );
        }
    }

    /// Look up where a test is declared
    pub fn lookup(&self, name: &str) -> Option<&TestLocation> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `<prefix>(` followed by a single- or double-quoted literal
fn declaration_pattern(prefixes: &[String]) -> Result<Regex, SummaryError> {
    if let Some(bad) = prefixes.iter().find(|p| p.trim().is_empty()) {
        return Err(SummaryError::InvalidPrefix(bad.clone()));
    }
    if prefixes.is_empty() {
        return Err(SummaryError::InvalidPrefix(String::new()));
    }

    let alternation = prefixes
        .iter()
        .map(|p| regex_lite::escape(p.trim()))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = format!(r#"(?:^|[^\w.])(?:{})\s*\(\s*(?:'([^']*)'|"([^"]*)")"#, alternation);

    Regex::new(&pattern).map_err(|_| SummaryError::InvalidPrefix(alternation))
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}
