//! Integration test result summaries for CI.
//!
//! Reads per-platform JUnit XML result files, renders a Markdown job summary
//! and produces inline failure annotations that point at the declaration site
//! of each failing test.

mod annotation;
mod index;
mod junit;
mod report;
mod summarize;

pub use annotation::Annotation;
pub use index::{IndexOptions, TestIndex, TestLocation};
pub use junit::{load_results, parse_results, PlatformResult, TestCase};
pub use report::{SummaryReport, DEFAULT_TITLE};
pub use summarize::{summarize, PlatformInput, SummaryOptions, SummaryOutcome};

use std::path::PathBuf;

/// Errors raised while reading results or scanning test sources.
#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Invalid '{attribute}' count on results root: {value:?}")]
    InvalidCount { attribute: String, value: String },

    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Invalid test call prefix '{0}'")]
    InvalidPrefix(String),
}
