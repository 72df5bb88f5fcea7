//! Package ownership of the JDK's own modules.
//!
//! Modules are read from the `jmods/` directory of a JDK image. A jmod file is
//! a four byte header followed by a plain zip archive whose class files live
//! under `classes/`. A module owns every package holding a file there, class or
//! resource, except `META-INF/`. Each module becomes a platform [`Library`]
//! whose packages all carry a zero count; the index then maps every package to
//! its module.

use memmap2::Mmap;
use rayon::prelude::*;
use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use zip::ZipArchive;

use crate::error::ScanError;
use crate::extract;
use crate::library::Library;

pub const JMOD_MAGIC: [u8; 4] = [0x4A, 0x4D, 0x01, 0x00];
pub const JMOD_CLASSES: &str = "classes/";

const META_INF: &str = "META-INF/";

#[derive(Debug, Default)]
pub struct PlatformModuleIndex {
    modules: Vec<Library>,
    owners: HashMap<String, usize>,
}

impl PlatformModuleIndex {
    /// Indexes `modules` by package. A package declared by two modules
    /// resolves to the later one.
    pub fn from_modules(modules: Vec<Library>) -> Self {
        let mut owners = HashMap::new();
        for (i, module) in modules.iter().enumerate() {
            for package in module.packages().keys() {
                owners.insert(package.clone(), i);
            }
        }
        Self { modules, owners }
    }

    /// Loads every module of the JDK at `java_home`.
    ///
    /// A JDK image without `jmods/` yields an empty index. A module that
    /// cannot be read is logged and left out.
    pub fn load(java_home: &Path) -> Result<Self, ScanError> {
        let jmods_dir = java_home.join("jmods");
        if !jmods_dir.is_dir() {
            warn!(
                "no jmods directory under {}, platform modules are not considered",
                java_home.display()
            );
            return Ok(Self::default());
        }

        let mut paths = jmod_files(&jmods_dir)?;
        paths.sort();

        let results: Vec<Result<Library, ScanError>> =
            paths.par_iter().map(|path| read_jmod(path)).collect();

        let mut modules = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(module) => modules.push(module),
                Err(err) => warn!("skipping platform module: {err}"),
            }
        }
        debug!("loaded {} platform modules from {}", modules.len(), jmods_dir.display());
        Ok(Self::from_modules(modules))
    }

    pub fn owner(&self, package: &str) -> Option<&Library> {
        self.owners.get(package).map(|&i| &self.modules[i])
    }

    pub fn modules(&self) -> &[Library] {
        &self.modules
    }

    pub fn package_count(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

fn jmod_files(dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let unreadable = |source| ScanError::SourceUnreadable {
        path: dir.to_path_buf(),
        source,
    };
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(unreadable)? {
        let path = entry.map_err(unreadable)?.path();
        if path.extension().is_some_and(|e| e == "jmod") && path.is_file() {
            paths.push(path);
        }
    }
    Ok(paths)
}

/// Reads one jmod file into a platform library named after the file stem.
pub fn read_jmod(path: &Path) -> Result<Library, ScanError> {
    let module = path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ScanError::InvalidJmod {
            path: path.to_path_buf(),
        })?;

    let file = File::open(path).map_err(|source| ScanError::SourceUnreadable {
        path: path.to_path_buf(),
        source,
    })?;
    // SAFETY: The file is opened read-only and outlives the mapping.
    let mmap = unsafe { Mmap::map(&file) }.map_err(|source| ScanError::SourceUnreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let Some(body) = mmap.strip_prefix(&JMOD_MAGIC[..]) else {
        return Err(ScanError::InvalidJmod {
            path: path.to_path_buf(),
        });
    };
    let archive = ZipArchive::new(Cursor::new(body)).map_err(|source| {
        ScanError::ArchiveUnreadable {
            path: path.to_path_buf(),
            source,
        }
    })?;

    Ok(Library::platform(module, module_packages(archive.file_names())))
}

/// Packages owned by a module, from the entry names of its jmod.
pub fn module_packages<'n>(names: impl Iterator<Item = &'n str>) -> BTreeSet<String> {
    names
        .filter_map(|name| name.strip_prefix(JMOD_CLASSES))
        .filter(|name| !name.ends_with('/') && !name.starts_with(META_INF))
        .map(extract::entry_package)
        .filter(|package| !package.is_empty())
        .collect()
}
