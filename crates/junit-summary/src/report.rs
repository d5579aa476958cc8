//! Markdown job summary rendering.

use crate::junit::PlatformResult;

/// Default top-level heading of the summary
pub const DEFAULT_TITLE: &str = "Integration Test Results";

const COUNTS_HEADER: &str = "| Tests | Passed | Failed |";
const COUNTS_SEPARATOR: &str = "| --- | --- | --- |";

#[derive(Debug, Clone)]
enum PlatformSection {
    /// Results were expected but no file was found
    Missing { platform: String },
    Results { platform: String, result: PlatformResult },
}

/// Markdown summary assembled platform by platform, in declaration order
#[derive(Debug, Clone)]
pub struct SummaryReport {
    title: String,
    sections: Vec<PlatformSection>,
}

impl SummaryReport {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            sections: Vec::new(),
        }
    }

    /// Record a platform whose results file was expected but missing
    pub fn add_missing(&mut self, platform: &str) {
        self.sections.push(PlatformSection::Missing {
            platform: platform.to_string(),
        });
    }

    /// Record a platform's parsed results
    pub fn add_results(&mut self, platform: &str, result: &PlatformResult) {
        self.sections.push(PlatformSection::Results {
            platform: platform.to_string(),
            result: result.clone(),
        });
    }

    /// Whether any platform produced parsed data
    pub fn has_results(&self) -> bool {
        self.sections
            .iter()
            .any(|s| matches!(s, PlatformSection::Results { .. }))
    }

    /// Summed (tests, passed, failures) over all parsed platforms
    pub fn totals(&self) -> (u64, u64, u64) {
        self.sections
            .iter()
            .filter_map(|s| match s {
                PlatformSection::Results { result, .. } => Some(result),
                PlatformSection::Missing { .. } => None,
            })
            .fold((0, 0, 0), |(tests, passed, failures), r| {
                (
                    tests + u64::from(r.tests),
                    passed + u64::from(r.passed()),
                    failures + u64::from(r.failures),
                )
            })
    }

    /// Render the summary; the overall table is only present when some
    /// platform produced parsed data.
    pub fn render(&self) -> String {
        let mut lines: Vec<String> = vec![format!("## {}", self.title)];

        if self.has_results() {
            let (tests, passed, failures) = self.totals();
            lines.push("### Overall Summary".to_string());
            push_counts_table(&mut lines, tests, passed, failures);
        }

        for section in &self.sections {
            match section {
                PlatformSection::Missing { platform } => {
                    lines.push(format!("- {}: no results file found", platform));
                }
                PlatformSection::Results { platform, result } => {
                    lines.push(format!("### {} Summary", platform));
                    push_counts_table(
                        &mut lines,
                        result.tests.into(),
                        result.passed().into(),
                        result.failures.into(),
                    );

                    lines.push(format!("### {} Tests", platform));
                    lines.push("| Test | Result |".to_string());
                    lines.push("| --- | --- |".to_string());
                    for case in &result.cases {
                        let marker = if case.is_failed() {
                            "❌ Failed"
                        } else {
                            "✅ Passed"
                        };
                        lines.push(format!("| {} | {} |", escape_cell(&case.display_name()), marker));
                    }
                    lines.push(String::new());
                }
            }
        }

        let mut markdown = lines.join("\n");
        markdown.push('\n');
        markdown
    }
}

fn push_counts_table(lines: &mut Vec<String>, tests: u64, passed: u64, failures: u64) {
    lines.push(COUNTS_HEADER.to_string());
    lines.push(COUNTS_SEPARATOR.to_string());
    lines.push(format!("| {} | {} | {} |", tests, passed, failures));
    lines.push(String::new());
}

fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::junit::TestCase;

    fn result(cases: &[(&str, Option<&str>)]) -> PlatformResult {
        let cases: Vec<TestCase> = cases
            .iter()
            .map(|(name, failure)| TestCase {
                classname: String::new(),
                name: name.to_string(),
                failure: failure.map(|f| f.to_string()),
            })
            .collect();
        PlatformResult {
            tests: cases.len() as u32,
            failures: cases.iter().filter(|c| c.is_failed()).count() as u32,
            cases,
        }
    }

    #[test]
    fn test_render_single_platform() {
        let mut report = SummaryReport::new(DEFAULT_TITLE);
        report.add_results("Android", &result(&[("a", None), ("b", Some("boom")), ("c", None)]));

        let expected = "\
## Integration Test Results
### Overall Summary
| Tests | Passed | Failed |
| --- | --- | --- |
| 3 | 2 | 1 |

### Android Summary
| Tests | Passed | Failed |
| --- | --- | --- |
| 3 | 2 | 1 |

### Android Tests
| Test | Result |
| --- | --- |
| a | ✅ Passed |
| b | ❌ Failed |
| c | ✅ Passed |

";
        assert_eq!(report.render(), expected);
    }

    #[test]
    fn test_overall_sums_platforms() {
        let mut report = SummaryReport::new(DEFAULT_TITLE);
        report.add_results("Android", &result(&[("a", None), ("b", Some("x"))]));
        report.add_results("iOS", &result(&[("c", None)]));

        assert_eq!(report.totals(), (3, 2, 1));
        let markdown = report.render();
        let android = markdown.find("### Android Summary").unwrap();
        let ios = markdown.find("### iOS Summary").unwrap();
        let overall = markdown.find("### Overall Summary").unwrap();
        assert!(overall < android && android < ios);
    }

    #[test]
    fn test_overall_counts_do_not_overflow() {
        let large = PlatformResult {
            tests: u32::MAX,
            failures: 1,
            cases: Vec::new(),
        };
        let mut report = SummaryReport::new(DEFAULT_TITLE);
        report.add_results("Android", &large);
        report.add_results("iOS", &large);

        let max = u64::from(u32::MAX);
        assert_eq!(report.totals(), (2 * max, 2 * (max - 1), 2));
        assert!(report.render().contains("| 8589934590 | 8589934588 | 2 |"));
    }

    #[test]
    fn test_missing_only_has_no_overall() {
        let mut report = SummaryReport::new("Results");
        report.add_missing("iOS");

        assert!(!report.has_results());
        assert_eq!(report.render(), "## Results\n- iOS: no results file found\n");
    }

    #[test]
    fn test_pipe_in_test_name_escaped() {
        let mut report = SummaryReport::new(DEFAULT_TITLE);
        report.add_results("iOS", &result(&[("a | b", None)]));
        assert!(report.render().contains("| a \\| b | ✅ Passed |"));
    }
}
