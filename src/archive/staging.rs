// ABOUTME: Copies a project file tree into the staging directory
// ABOUTME: Skips version-control and cache directories plus caller-supplied glob patterns

use std::fs;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

use super::error::Result;

/// Entry names never copied into an archive.
pub const DEFAULT_IGNORE: [&str; 2] = [".git", "__pycache__"];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CopyStats {
    pub files_copied: u64,
    pub bytes_copied: u64,
}

/// Recursively copy `source` into `destination`. Files already in the
/// destination survive unless the source holds an entry with the same path.
pub fn copy_tree(source: &Path, destination: &Path, patterns: &[String]) -> Result<CopyStats> {
    let mut stats = CopyStats::default();

    let walker = WalkDir::new(source)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            let relative = entry.path().strip_prefix(source).unwrap_or(entry.path());
            let ignored = should_ignore(relative, patterns);
            if ignored {
                debug!("Ignoring project entry: {}", relative.display());
            }
            !ignored
        });

    for entry in walker {
        let entry = entry?;
        let relative = entry.path().strip_prefix(source)?;
        let target = destination.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }

        let bytes = fs::copy(entry.path(), &target)?;
        stats.files_copied += 1;
        stats.bytes_copied += bytes;
    }

    Ok(stats)
}

/// Matches the entry name against the default set, then every pattern
/// against both the entry name and its path relative to the project root.
pub fn should_ignore(relative: &Path, patterns: &[String]) -> bool {
    let name = match relative.file_name() {
        Some(name) => name.to_string_lossy(),
        None => return false,
    };

    if DEFAULT_IGNORE.iter().any(|ignored| *ignored == name) {
        return true;
    }

    let path = relative.to_string_lossy();
    patterns.iter().any(|pattern| {
        glob_match::glob_match(pattern, &name) || glob_match::glob_match(pattern, &path)
    })
}
