//! JUnit XML result parsing.
//!
//! Only the parts of the format the summary needs are read: the count
//! attributes on the root element and every `testcase` with its optional
//! `failure` child. Suites may be nested arbitrarily.

use std::fs;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::SummaryError;

/// A single test case from a results file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    /// Class or suite qualifier (may be empty)
    pub classname: String,
    /// Test name as reported by the runner
    pub name: String,
    /// Whitespace-collapsed failure message, `None` when the case passed
    pub failure: Option<String>,
}

impl TestCase {
    /// Name shown in tables and annotations: `classname.name`, or just `name`
    pub fn display_name(&self) -> String {
        if self.classname.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.classname, self.name)
        }
    }

    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }
}

/// Parsed results for one platform
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformResult {
    /// Total number of tests
    pub tests: u32,
    /// Number of failed tests
    pub failures: u32,
    /// Test cases in document order
    pub cases: Vec<TestCase>,
}

impl PlatformResult {
    /// Number of passed tests (`tests - failures`, never negative)
    pub fn passed(&self) -> u32 {
        self.tests.saturating_sub(self.failures)
    }
}

/// Failure element being read
struct PendingFailure {
    message: Option<String>,
    body: String,
}

impl PendingFailure {
    fn finish(self) -> String {
        match self.message {
            Some(message) if !message.is_empty() => collapse_whitespace(&message),
            _ => collapse_whitespace(&self.body),
        }
    }
}

/// Load a results file.
///
/// A missing file is not an error and yields `Ok(None)`.
pub fn load_results(path: &Path) -> Result<Option<PlatformResult>, SummaryError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path).map_err(|source| SummaryError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    parse_results(&content).map(Some)
}

/// Parse JUnit XML into a [`PlatformResult`].
///
/// Counts come from the root element's `tests`/`failures` attributes when
/// present and are otherwise derived from the collected cases.
pub fn parse_results(xml: &str) -> Result<PlatformResult, SummaryError> {
    let mut reader = Reader::from_str(xml);

    let mut root_counts: Option<(Option<u32>, Option<u32>)> = None;
    let mut cases = Vec::new();
    let mut current: Option<TestCase> = None;
    let mut failure: Option<PendingFailure> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if root_counts.is_none() {
                    root_counts = Some(read_counts(&e)?);
                }
                match e.local_name().as_ref() {
                    b"testcase" => current = Some(read_case(&e)?),
                    b"failure" if current.is_some() => {
                        failure = Some(PendingFailure {
                            message: attribute(&e, b"message")?,
                            body: String::new(),
                        });
                    }
                    _ => {}
                }
            }
            Event::Empty(e) => {
                if root_counts.is_none() {
                    root_counts = Some(read_counts(&e)?);
                }
                match e.local_name().as_ref() {
                    b"testcase" => cases.push(read_case(&e)?),
                    b"failure" => {
                        let pending = PendingFailure {
                            message: attribute(&e, b"message")?,
                            body: String::new(),
                        };
                        if let Some(case) = current.as_mut() {
                            case.failure.get_or_insert(pending.finish());
                        }
                    }
                    _ => {}
                }
            }
            Event::Text(t) => {
                if let Some(pending) = failure.as_mut() {
                    pending.body.push_str(&t.unescape()?);
                    pending.body.push(' ');
                }
            }
            Event::CData(c) => {
                if let Some(pending) = failure.as_mut() {
                    pending.body.push_str(&String::from_utf8_lossy(&c.into_inner()));
                    pending.body.push(' ');
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"failure" => {
                    if let (Some(pending), Some(case)) = (failure.take(), current.as_mut()) {
                        case.failure.get_or_insert(pending.finish());
                    }
                }
                b"testcase" => {
                    if let Some(case) = current.take() {
                        cases.push(case);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    let (tests, failures) = root_counts.unwrap_or((None, None));
    let tests = tests.unwrap_or(cases.len() as u32);
    let failures = failures.unwrap_or_else(|| cases.iter().filter(|c| c.is_failed()).count() as u32);

    Ok(PlatformResult {
        tests,
        failures,
        cases,
    })
}

fn read_case(element: &BytesStart<'_>) -> Result<TestCase, SummaryError> {
    Ok(TestCase {
        classname: attribute(element, b"classname")?.unwrap_or_default(),
        name: attribute(element, b"name")?.unwrap_or_default(),
        failure: None,
    })
}

fn read_counts(element: &BytesStart<'_>) -> Result<(Option<u32>, Option<u32>), SummaryError> {
    Ok((
        count_attribute(element, "tests")?,
        count_attribute(element, "failures")?,
    ))
}

fn count_attribute(element: &BytesStart<'_>, key: &str) -> Result<Option<u32>, SummaryError> {
    match attribute(element, key.as_bytes())? {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<u32>()
            .map(Some)
            .map_err(|_| SummaryError::InvalidCount {
                attribute: key.to_string(),
                value,
            }),
    }
}

fn attribute(element: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, SummaryError> {
    for attr in element.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.as_ref() == key {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// Collapse whitespace runs to a single space and trim the ends
fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
