//! In-place changelog file update.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::document::{ChangelogDocument, EntryChange};
use crate::version::{EntryTemplate, Platform, Version};
use crate::ChangelogError;

/// Changelog file name, relative to the working directory
pub const DEFAULT_CHANGELOG_FILE: &str = "CHANGELOG.md";

/// Result of updating a changelog file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub change: EntryChange,
    /// Whether the file content changed
    pub modified: bool,
}

/// Apply a platform version entry to the changelog at `path`.
///
/// The file must exist. It is only rewritten when the rendered document
/// differs from what was read, via a temporary file and rename.
pub fn update_changelog_file(
    path: &Path,
    platform: Platform,
    version: &Version,
    template: &EntryTemplate,
) -> Result<UpdateOutcome, ChangelogError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ChangelogError::NotFound(path.to_path_buf()));
        }
        Err(source) => {
            return Err(ChangelogError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let mut doc = ChangelogDocument::parse(&content);
    let change = doc.apply_entry(platform, version, template);
    let rendered = doc.render();

    let modified = rendered != content;
    if modified {
        write_atomic(path, &rendered)?;
    }

    tracing::debug!(path = %path.display(), ?change, modified, "applied changelog entry");

    Ok(UpdateOutcome { change, modified })
}

fn write_atomic(path: &Path, content: &str) -> Result<(), ChangelogError> {
    let temp_path = temp_path_for(path);
    let io_err = |source| ChangelogError::Io {
        path: path.to_path_buf(),
        source,
    };

    fs::write(&temp_path, content).map_err(io_err)?;
    if let Err(source) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(io_err(source));
    }
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_CHANGELOG_FILE.to_string());
    path.with_file_name(format!(".{}.tmp", name))
}
