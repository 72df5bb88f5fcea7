//! Turns file-system paths into libraries.
//!
//! A directory is scanned as exploded classes, a `*.jar|*.rar|*.war` file
//! (case-insensitive) as an archive, and anything else is ignored.

use ignore::WalkBuilder;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::ScanError;
use crate::library::{Library, SourceFormat};

const ARCHIVE_EXTENSIONS: [&str; 3] = ["jar", "rar", "war"];

pub fn is_archive_name(path: &Path) -> bool {
    path.file_stem().is_some_and(|s| !s.is_empty())
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| ARCHIVE_EXTENSIONS.iter().any(|a| e.eq_ignore_ascii_case(a)))
}

pub fn source_format(path: &Path) -> Option<SourceFormat> {
    if path.is_dir() {
        Some(SourceFormat::Directory)
    } else if path.is_file() && is_archive_name(path) {
        Some(SourceFormat::Archive)
    } else {
        None
    }
}

/// Resolves `path` into zero or one library.
pub fn resolve_library(path: &Path) -> Result<Option<Library>, ScanError> {
    let Some(format) = source_format(path) else {
        debug!("ignoring {}", path.display());
        return Ok(None);
    };
    let library = Library::scanned(path, format)?;
    debug!(
        "{} contributes {} packages",
        library.location(),
        library.packages().len()
    );
    Ok(Some(library))
}

#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Successfully extracted libraries, in input order.
    pub libraries: Vec<Library>,
    pub failures: Vec<ScanError>,
}

/// Extracts every path in parallel. A failing path only loses its own library.
pub fn scan_libraries(paths: &[PathBuf]) -> ScanOutcome {
    let results: Vec<Result<Library, ScanError>> = paths
        .par_iter()
        .filter_map(|path| resolve_library(path).transpose())
        .collect();

    let mut outcome = ScanOutcome::default();
    for result in results {
        match result {
            Ok(library) => outcome.libraries.push(library),
            Err(err) => outcome.failures.push(err),
        }
    }
    outcome
}

fn is_library_directory(path: &Path) -> bool {
    path.ends_with("WEB-INF/classes") || is_archive_name(path)
}

/// Library paths found below `root`: archive files, plus exploded archives and
/// `WEB-INF/classes` directories whose contents are not walked further.
pub fn expand_directory(root: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let top = root.to_path_buf();
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            entry
                .path()
                .parent()
                .is_none_or(|parent| parent == top || !is_library_directory(parent))
        })
        .build();

    let mut found = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|source| ScanError::DirectoryWalk {
            path: root.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path == root {
            continue;
        }
        match entry.file_type() {
            Some(t) if t.is_dir() => {
                if is_library_directory(path) {
                    found.push(path.to_path_buf());
                }
            }
            Some(t) if t.is_file() => {
                if is_archive_name(path) {
                    found.push(path.to_path_buf());
                }
            }
            _ => {}
        }
    }
    Ok(found)
}

/// Paths listed one per line in `list`. Blank lines are skipped.
pub fn read_library_list(list: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let content = std::fs::read_to_string(list).map_err(|source| ScanError::SourceUnreadable {
        path: list.to_path_buf(),
        source,
    })?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .collect())
}
