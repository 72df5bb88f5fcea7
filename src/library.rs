use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::path::Path;
use url::Url;

use crate::error::ScanError;
use crate::extract::{self, PackageCounts};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Directory,
    Archive,
}

impl SourceFormat {
    pub fn extract(self, path: &Path) -> Result<PackageCounts, ScanError> {
        match self {
            Self::Directory => extract::from_directory(path),
            Self::Archive => extract::from_archive(path),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryKind {
    /// A directory or archive scanned from the file system.
    Scanned,
    /// A module of the JDK image. Every package count is zero.
    Platform { module: String },
}

/// A set of packages contributed by one origin.
///
/// Identity, equality and ordering are all by `location`. The package map is
/// computed once at construction and never changes afterwards.
#[derive(Debug, Clone)]
pub struct Library {
    location: String,
    kind: LibraryKind,
    packages: PackageCounts,
}

impl Library {
    pub fn scanned(path: &Path, format: SourceFormat) -> Result<Self, ScanError> {
        let packages = format.extract(path)?;
        Ok(Self {
            location: file_location(path, format == SourceFormat::Directory),
            kind: LibraryKind::Scanned,
            packages,
        })
    }

    pub fn platform<I, S>(module: &str, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            location: format!("jrt:/{module}"),
            kind: LibraryKind::Platform {
                module: module.to_string(),
            },
            packages: packages.into_iter().map(|p| (p.into(), 0)).collect(),
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Name of the JDK module this library stands for, if any.
    pub fn module(&self) -> Option<&str> {
        match &self.kind {
            LibraryKind::Scanned => None,
            LibraryKind::Platform { module } => Some(module),
        }
    }

    pub fn is_platform(&self) -> bool {
        self.module().is_some()
    }

    pub fn packages(&self) -> &PackageCounts {
        &self.packages
    }

    /// Class files seen in `package`, or `None` if this library lacks it.
    pub fn count(&self, package: &str) -> Option<u64> {
        self.packages.get(package).copied()
    }
}

impl PartialEq for Library {
    fn eq(&self, other: &Self) -> bool {
        self.location == other.location
    }
}

impl Eq for Library {}

impl Hash for Library {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.location.hash(state);
    }
}

impl PartialOrd for Library {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Library {
    fn cmp(&self, other: &Self) -> Ordering {
        self.location.cmp(&other.location)
    }
}

/// `file:` URI of `path`, absolute and percent-encoded, with a trailing `/`
/// for directories.
pub fn file_location(path: &Path, is_dir: bool) -> String {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let url = if is_dir {
        Url::from_directory_path(&absolute)
    } else {
        Url::from_file_path(&absolute)
    };
    match url {
        Ok(url) => url.into(),
        Err(()) => {
            let mut s = absolute.to_string_lossy().replace('\\', "/");
            if !s.starts_with('/') {
                s.insert(0, '/');
            }
            if is_dir && !s.ends_with('/') {
                s.push('/');
            }
            format!("file://{s}")
        }
    }
}
