//! Changelog section model.
//!
//! A changelog is held as a preamble plus a flat, ordered list of sections,
//! one per ATX heading. Nesting is implied by heading levels: a section owns
//! every following section of a deeper level. Entries are edited on this
//! model and the document is rendered back with LF line endings.

use std::sync::OnceLock;

use regex_lite::Regex;

use crate::version::{EntryTemplate, Platform, Version};

const TITLE_HEADING: &str = "# Changelog";
const UNRELEASED_HEADING: &str = "## [Unreleased]";
const CHANGED_HEADING: &str = "### Changed";

/// One heading and the lines up to the next heading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Heading level (number of leading `#`)
    pub level: usize,
    /// Full heading line
    pub heading: String,
    /// Lines between this heading and the next one
    pub body: Vec<String>,
}

impl Section {
    fn new(level: usize, heading: &str, body: Vec<String>) -> Self {
        Self {
            level,
            heading: heading.to_string(),
            body,
        }
    }

    fn is_unreleased(&self) -> bool {
        self.level == 2 && self.heading.starts_with(UNRELEASED_HEADING)
    }

    fn is_changed(&self) -> bool {
        self.level == 3 && self.heading.starts_with(CHANGED_HEADING)
    }
}

/// How an entry was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryChange {
    /// The Unreleased section (and its Changed list) was created
    CreatedUnreleased,
    /// A Changed subsection was added to the existing Unreleased section
    CreatedChanged,
    /// An existing entry for the platform was replaced in place
    Replaced,
    /// The entry was added at the top of the Changed list
    Inserted,
}

/// Parsed changelog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangelogDocument {
    preamble: Vec<String>,
    sections: Vec<Section>,
}

impl ChangelogDocument {
    /// Parse changelog text. CRLF and lone CR line endings are normalised to LF
    /// first; lines inside fenced code blocks are never headings.
    pub fn parse(text: &str) -> Self {
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        let mut doc = Self::default();
        let mut fence: Option<Fence> = None;

        for line in text.lines() {
            let level = match fence {
                Some(open) => {
                    if open.is_closed_by(line) {
                        fence = None;
                    }
                    None
                }
                None => match Fence::opened_by(line) {
                    Some(open) => {
                        fence = Some(open);
                        None
                    }
                    None => heading_level(line),
                },
            };

            match level {
                Some(level) => doc.sections.push(Section::new(level, line, Vec::new())),
                None => match doc.sections.last_mut() {
                    Some(section) => section.body.push(line.to_string()),
                    None => doc.preamble.push(line.to_string()),
                },
            }
        }

        doc
    }

    /// Lines before the first heading
    pub fn preamble(&self) -> &[String] {
        &self.preamble
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Insert or replace the entry line for `platform` in Unreleased/Changed.
    ///
    /// Existing entries are searched in Changed and its subsections; the
    /// first is replaced in place and any others are removed.
    pub fn apply_entry(&mut self, platform: Platform, version: &Version, template: &EntryTemplate) -> EntryChange {
        let entry = template.render(platform, version);

        let Some(unreleased) = self.sections.iter().position(Section::is_unreleased) else {
            self.insert_unreleased(&entry);
            return EntryChange::CreatedUnreleased;
        };

        let end = self.section_end(unreleased);
        match (unreleased + 1..end).find(|&i| self.sections[i].is_changed()) {
            Some(changed) => {
                let matcher = template.matcher(platform);
                if self.replace_entries(changed, &entry, &matcher) {
                    EntryChange::Replaced
                } else {
                    insert_into_list(&mut self.sections[changed].body, &entry);
                    EntryChange::Inserted
                }
            }
            None => {
                self.insert_sections(end, vec![changed_section(&entry)]);
                EntryChange::CreatedChanged
            }
        }
    }

    /// Render with LF endings, a single trailing newline and no run of more
    /// than one blank line.
    pub fn render(&self) -> String {
        let mut lines: Vec<&str> = self.preamble.iter().map(String::as_str).collect();
        for section in &self.sections {
            lines.push(&section.heading);
            lines.extend(section.body.iter().map(String::as_str));
        }

        let mut text = lines.join("\n");
        text.truncate(text.trim_end_matches('\n').len());
        text.push('\n');
        collapse_blank_lines(&text)
    }

    /// Replace the first entry matching `matcher` in the section at `idx` or
    /// any section it owns, dropping later matches. Returns false when none
    /// matched.
    fn replace_entries(&mut self, idx: usize, entry: &str, matcher: &Regex) -> bool {
        let sections = &self.sections;
        let matches: Vec<(usize, usize)> = (idx..self.section_end(idx))
            .flat_map(move |s| {
                sections[s]
                    .body
                    .iter()
                    .enumerate()
                    .filter(move |(_, line)| matcher.is_match(line.trim_end()))
                    .map(move |(i, _)| (s, i))
            })
            .collect();

        let Some((&(section, line), duplicates)) = matches.split_first() else {
            return false;
        };
        self.sections[section].body[line] = entry.to_string();
        for &(s, i) in duplicates.iter().rev() {
            self.sections[s].body.remove(i);
        }
        true
    }

    /// Index one past the last section owned by `idx`
    fn section_end(&self, idx: usize) -> usize {
        let level = self.sections[idx].level;
        (idx + 1..self.sections.len())
            .find(|&i| self.sections[i].level <= level)
            .unwrap_or(self.sections.len())
    }

    /// Add Unreleased/Changed after the title section, creating the title
    /// (and adopting the preamble as its body) when there is none.
    fn insert_unreleased(&mut self, entry: &str) {
        let title = match self.sections.iter().position(|s| s.level == 1) {
            Some(title) => title,
            None => {
                let body = std::mem::take(&mut self.preamble);
                self.sections.insert(0, Section::new(1, TITLE_HEADING, body));
                0
            }
        };

        let at = (title + 1..self.sections.len())
            .find(|&i| self.sections[i].level <= 2)
            .unwrap_or(self.sections.len());

        self.insert_sections(
            at,
            vec![
                Section::new(2, UNRELEASED_HEADING, vec![String::new()]),
                changed_section(entry),
            ],
        );
    }

    fn insert_sections(&mut self, at: usize, new_sections: Vec<Section>) {
        if at > 0 {
            let previous = &mut self.sections[at - 1].body;
            if previous.last().map_or(true, |line| !line.trim().is_empty()) {
                previous.push(String::new());
            }
        }
        for (offset, section) in new_sections.into_iter().enumerate() {
            self.sections.insert(at + offset, section);
        }
    }
}

fn changed_section(entry: &str) -> Section {
    Section::new(
        3,
        CHANGED_HEADING,
        vec![String::new(), entry.to_string(), String::new()],
    )
}

/// Insert the entry as the first bullet of a list body
fn insert_into_list(body: &mut Vec<String>, entry: &str) {
    if let Some(bullet) = body.iter().position(|line| is_bullet(line)) {
        body.insert(bullet, entry.to_string());
    } else if let Some(text) = body.iter().position(|line| !line.trim().is_empty()) {
        body.insert(text, String::new());
        body.insert(text, entry.to_string());
    } else {
        *body = vec![String::new(), entry.to_string(), String::new()];
    }
}

fn is_bullet(line: &str) -> bool {
    line.starts_with("- ") || line.starts_with("* ") || line.starts_with("+ ")
}

/// ATX heading level of a line, if it is one
fn heading_level(line: &str) -> Option<usize> {
    let level = line.bytes().take_while(|&b| b == b'#').count();
    if !(1..=6).contains(&level) {
        return None;
    }
    match line[level..].chars().next() {
        None | Some(' ') | Some('\t') => Some(level),
        Some(_) => None,
    }
}

/// Open fenced code block: fence character and run length
#[derive(Debug, Clone, Copy)]
struct Fence {
    marker: char,
    len: usize,
}

impl Fence {
    fn opened_by(line: &str) -> Option<Self> {
        let trimmed = line.trim_start();
        let marker = trimmed.chars().next().filter(|c| matches!(c, '`' | '~'))?;
        let len = trimmed.chars().take_while(|&c| c == marker).count();
        (len >= 3).then_some(Self { marker, len })
    }

    /// Only a bare run of the same character, at least as long, closes
    fn is_closed_by(&self, line: &str) -> bool {
        let trimmed = line.trim();
        trimmed.chars().count() >= self.len && trimmed.chars().all(|c| c == self.marker)
    }
}

/// Collapse every run of three or more newlines to two
fn collapse_blank_lines(text: &str) -> String {
    static BLANK_RUN: OnceLock<Regex> = OnceLock::new();
    BLANK_RUN
        .get_or_init(|| Regex::new(r"\n{3,}").expect("blank run pattern compiles"))
        .replace_all(text, "\n\n")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(text: &str, platform: Platform, version: &str) -> (String, EntryChange) {
        let mut doc = ChangelogDocument::parse(text);
        let change = doc.apply_entry(platform, &Version::parse(version).unwrap(), &EntryTemplate::default());
        (doc.render(), change)
    }

    const EXISTING: &str = "\
# Changelog

All notable changes to this project will be documented in this file.

## [Unreleased]

### Added

- Casting support

### Changed

- Bump minimum React Native version
- Update Android SDK version to `3.40.0`
- Update iOS SDK version to `3.41.0`

### Fixed

- Crash on unload

## [0.20.0] - 2024-03-01

### Changed

- Update iOS SDK version to `3.39.0`
";

    #[test]
    fn test_parse_sections() {
        let doc = ChangelogDocument::parse(EXISTING);
        assert!(doc.preamble().is_empty());
        let headings: Vec<(usize, &str)> = doc
            .sections()
            .iter()
            .map(|s| (s.level, s.heading.as_str()))
            .collect();
        assert_eq!(
            headings,
            vec![
                (1, "# Changelog"),
                (2, "## [Unreleased]"),
                (3, "### Added"),
                (3, "### Changed"),
                (3, "### Fixed"),
                (2, "## [0.20.0] - 2024-03-01"),
                (3, "### Changed"),
            ]
        );
    }

    #[test]
    fn test_replace_preserves_position() {
        let (out, change) = apply(EXISTING, Platform::Android, "3.42.0");
        assert_eq!(change, EntryChange::Replaced);
        assert!(out.contains(
            "- Bump minimum React Native version\n- Update Android SDK version to `3.42.0`\n- Update iOS SDK version to `3.41.0`\n"
        ));
        assert!(!out.contains("`3.40.0`"));
        // released sections are untouched
        assert!(out.contains("## [0.20.0] - 2024-03-01\n\n### Changed\n\n- Update iOS SDK version to `3.39.0`\n"));
    }

    #[test]
    fn test_new_platform_entry_goes_to_top() {
        let text = "# Changelog\n\n## [Unreleased]\n\n### Changed\n\n- Something else\n";
        let (out, change) = apply(text, Platform::Ios, "1.0.0");
        assert_eq!(change, EntryChange::Inserted);
        assert_eq!(
            out,
            "# Changelog\n\n## [Unreleased]\n\n### Changed\n\n- Update iOS SDK version to `1.0.0`\n- Something else\n"
        );
    }

    #[test]
    fn test_missing_unreleased_inserted_after_title() {
        let text = "# Changelog\n\nIntro text.\n\n## [1.0.0] - 2024-01-01\n\n### Added\n\n- Initial release\n";
        let (out, change) = apply(text, Platform::Ios, "2.0.0");
        assert_eq!(change, EntryChange::CreatedUnreleased);
        assert_eq!(
            out,
            "# Changelog\n\nIntro text.\n\n## [Unreleased]\n\n### Changed\n\n- Update iOS SDK version to `2.0.0`\n\n## [1.0.0] - 2024-01-01\n\n### Added\n\n- Initial release\n"
        );
    }

    #[test]
    fn test_missing_title_is_prepended() {
        let (out, change) = apply("## [1.0.0]\n\n- Initial\n", Platform::Android, "1.1.0");
        assert_eq!(change, EntryChange::CreatedUnreleased);
        assert_eq!(
            out,
            "# Changelog\n\n## [Unreleased]\n\n### Changed\n\n- Update Android SDK version to `1.1.0`\n\n## [1.0.0]\n\n- Initial\n"
        );
    }

    #[test]
    fn test_empty_document() {
        let (out, _) = apply("", Platform::Ios, "2.0.0");
        assert_eq!(
            out,
            "# Changelog\n\n## [Unreleased]\n\n### Changed\n\n- Update iOS SDK version to `2.0.0`\n"
        );
    }

    #[test]
    fn test_preamble_adopted_by_new_title() {
        let (out, _) = apply("Notes before any heading.\n", Platform::Ios, "2.0.0");
        assert!(out.starts_with("# Changelog\nNotes before any heading.\n\n## [Unreleased]\n"));
    }

    #[test]
    fn test_missing_changed_appended_to_unreleased() {
        let text = "# Changelog\n\n## [Unreleased]\n\n### Added\n\n- Feature\n## [1.0.0]\n";
        let (out, change) = apply(text, Platform::Android, "3.0.0");
        assert_eq!(change, EntryChange::CreatedChanged);
        assert_eq!(
            out,
            "# Changelog\n\n## [Unreleased]\n\n### Added\n\n- Feature\n\n### Changed\n\n- Update Android SDK version to `3.0.0`\n\n## [1.0.0]\n"
        );
    }

    #[test]
    fn test_changed_in_released_section_not_used() {
        let text = "# Changelog\n\n## [Unreleased]\n\n## [1.0.0]\n\n### Changed\n\n- Update iOS SDK version to `1.0.0`\n";
        let (out, change) = apply(text, Platform::Ios, "1.1.0");
        assert_eq!(change, EntryChange::CreatedChanged);
        assert!(out.contains("## [Unreleased]\n\n### Changed\n\n- Update iOS SDK version to `1.1.0`\n\n## [1.0.0]"));
        assert!(out.contains("- Update iOS SDK version to `1.0.0`"));
    }

    #[test]
    fn test_empty_changed_list() {
        let text = "# Changelog\n\n## [Unreleased]\n\n### Changed\n\n### Fixed\n\n- Bug\n";
        let (out, change) = apply(text, Platform::Ios, "1.0.0");
        assert_eq!(change, EntryChange::Inserted);
        assert_eq!(
            out,
            "# Changelog\n\n## [Unreleased]\n\n### Changed\n\n- Update iOS SDK version to `1.0.0`\n\n### Fixed\n\n- Bug\n"
        );
    }

    #[test]
    fn test_duplicate_entries_collapse_to_one() {
        let text = "## [Unreleased]\n### Changed\n- Update iOS SDK version to `1.0.0`\n- Other\n- Update iOS SDK version to `1.0.1`\n";
        let (out, change) = apply(text, Platform::Ios, "1.2.0");
        assert_eq!(change, EntryChange::Replaced);
        assert_eq!(out.matches("Update iOS SDK version").count(), 1);
        assert!(out.contains("- Update iOS SDK version to `1.2.0`\n- Other\n"));
    }

    #[test]
    fn test_idempotent() {
        for text in [EXISTING, "", "# Changelog\n", "# Changelog\n\n## [Unreleased]\n\n### Fixed\n\n- x\n"] {
            for platform in Platform::ALL {
                let (once, _) = apply(text, platform, "9.9.9-rc.1");
                let (twice, change) = apply(&once, platform, "9.9.9-rc.1");
                assert_eq!(once, twice, "not idempotent for {:?} on {:?}", platform, text);
                assert_eq!(change, EntryChange::Replaced);
            }
        }
    }

    #[test]
    fn test_crlf_normalized() {
        let text = "# Changelog\r\n\r\n## [Unreleased]\r\n\r\n### Changed\r\n\r\n- Update iOS SDK version to `1.0.0`\r\n";
        let (out, change) = apply(text, Platform::Ios, "1.0.1");
        assert_eq!(change, EntryChange::Replaced);
        assert!(!out.contains('\r'));
        assert_eq!(
            out,
            "# Changelog\n\n## [Unreleased]\n\n### Changed\n\n- Update iOS SDK version to `1.0.1`\n"
        );
    }

    #[test]
    fn test_headings_inside_code_fences_ignored() {
        let text = "# Changelog\n\n```md\n## [Unreleased]\n```\n\n## [1.0.0]\n";
        let doc = ChangelogDocument::parse(text);
        assert_eq!(doc.sections().len(), 2);
        assert!(!doc.sections().iter().any(|s| s.heading == "## [Unreleased]"));
    }

    #[test]
    fn test_fence_with_info_string_does_not_close() {
        let text = "# Changelog\n\n```md\n```js\n## [Unreleased]\n```\n\n## [1.0.0]\n";
        let doc = ChangelogDocument::parse(text);
        let headings: Vec<&str> = doc.sections().iter().map(|s| s.heading.as_str()).collect();
        assert_eq!(headings, vec!["# Changelog", "## [1.0.0]"]);

        let tilde = ChangelogDocument::parse("~~~~\n~~~\n# Inside\n~~~~~\n# Outside\n");
        assert_eq!(tilde.sections().len(), 1);
        assert_eq!(tilde.sections()[0].heading, "# Outside");
    }

    #[test]
    fn test_entry_under_changed_subsection_replaced() {
        let text = "# Changelog\n\n## [Unreleased]\n\n### Changed\n\n#### Native\n\n- Update iOS SDK version to `1.0.0`\n\n### Fixed\n\n- Bug\n";
        let (out, change) = apply(text, Platform::Ios, "1.1.0");
        assert_eq!(change, EntryChange::Replaced);
        assert_eq!(out.matches("Update iOS SDK version").count(), 1);
        assert_eq!(
            out,
            "# Changelog\n\n## [Unreleased]\n\n### Changed\n\n#### Native\n\n- Update iOS SDK version to `1.1.0`\n\n### Fixed\n\n- Bug\n"
        );
    }

    #[test]
    fn test_duplicates_across_changed_subsections_collapse() {
        let text = "## [Unreleased]\n### Changed\n- Update Android SDK version to `1.0.0`\n#### Native\n- Update Android SDK version to `1.0.1`\n### Fixed\n- Update Android SDK version to `0.9.0`\n";
        let (out, change) = apply(text, Platform::Android, "2.0.0");
        assert_eq!(change, EntryChange::Replaced);
        assert!(out.contains("### Changed\n- Update Android SDK version to `2.0.0`\n#### Native\n### Fixed\n"));
        // entries outside Changed are not touched
        assert!(out.contains("- Update Android SDK version to `0.9.0`"));
    }

    #[test]
    fn test_blank_runs_collapsed() {
        let text = "# Changelog\n\n\n\n\n## [Unreleased]\n\n\n### Changed\n\n- a\n";
        let (out, _) = apply(text, Platform::Android, "1.0.0");
        assert!(!out.contains("\n\n\n"));
        assert_eq!(collapse_blank_lines("a\n\n\n\nb\n\nc\n"), "a\n\nb\n\nc\n");
    }

    #[test]
    fn test_heading_level() {
        assert_eq!(heading_level("# Changelog"), Some(1));
        assert_eq!(heading_level("### Changed"), Some(3));
        assert_eq!(heading_level("##"), Some(2));
        assert_eq!(heading_level("#hashtag"), None);
        assert_eq!(heading_level("####### seven"), None);
        assert_eq!(heading_level("- # not"), None);
    }
}
