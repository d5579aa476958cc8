//! Summary orchestration and overall pass/fail policy.

use std::path::PathBuf;

use crate::annotation::Annotation;
use crate::index::TestIndex;
use crate::junit::load_results;
use crate::report::{SummaryReport, DEFAULT_TITLE};
use crate::SummaryError;

/// One platform's inputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformInput {
    /// Label used in headings and annotations, e.g. "Android"
    pub platform: String,
    /// Results file; `None` means the platform was not run
    pub results_path: Option<PathBuf>,
    /// External status signal of the job step that produced the results
    pub status: Option<String>,
}

impl PlatformInput {
    pub fn new(platform: impl Into<String>, results_path: Option<PathBuf>, status: Option<String>) -> Self {
        Self {
            platform: platform.into(),
            results_path,
            status,
        }
    }

    /// Any non-empty value counts, whitespace included
    fn has_status(&self) -> bool {
        self.status.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// A non-empty status other than a literal "0" marks the platform failed
    fn status_failed(&self) -> bool {
        self.status.as_deref().is_some_and(|s| !s.is_empty() && s != "0")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryOptions {
    /// Top-level heading of the rendered summary
    pub title: String,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

/// Result of summarizing all platforms
#[derive(Debug, Clone)]
pub struct SummaryOutcome {
    /// Rendered Markdown, newline terminated
    pub markdown: String,
    /// One annotation per failing case, in platform then document order
    pub annotations: Vec<Annotation>,
    /// Overall failure
    pub failed: bool,
}

/// Summarize the given platforms in order.
///
/// A platform fails when its results contain failures, when its status is a
/// non-empty value other than "0", or when it has such a status and no
/// results file. Platforms without a results path, and missing files without
/// a status, are skipped.
pub fn summarize(
    inputs: &[PlatformInput],
    index: &TestIndex,
    options: &SummaryOptions,
) -> Result<SummaryOutcome, SummaryError> {
    let mut report = SummaryReport::new(options.title.clone());
    let mut annotations = Vec::new();
    let mut failed = false;

    for input in inputs {
        let Some(path) = &input.results_path else {
            continue;
        };

        let Some(result) = load_results(path)? else {
            if !input.has_status() {
                tracing::debug!(platform = %input.platform, path = %path.display(), "no results file and no status, skipping");
                continue;
            }
            tracing::warn!(platform = %input.platform, path = %path.display(), "no results file found");
            report.add_missing(&input.platform);
            failed |= input.status_failed();
            continue;
        };

        tracing::info!(
            platform = %input.platform,
            tests = result.tests,
            passed = result.passed(),
            failures = result.failures,
            "parsed results"
        );

        for case in result.cases.iter().filter(|c| c.is_failed()) {
            annotations.push(Annotation::for_failure(&input.platform, case, path, index));
        }
        report.add_results(&input.platform, &result);

        failed |= result.failures > 0 || input.status_failed();
    }

    Ok(SummaryOutcome {
        markdown: report.render(),
        annotations,
        failed,
    })
}
