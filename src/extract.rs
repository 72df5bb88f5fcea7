//! Package extraction from exploded class directories and zip archives.
//!
//! Both modes produce a [`PackageCounts`] map from dotted package name to the
//! number of class files seen in it. `module-info.class` never counts, and the
//! `WEB-INF.classes.` prefix of exploded web archives is dropped so that a war
//! and the equivalent plain jar report the same package names.

use ignore::WalkBuilder;
use memmap2::Mmap;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Cursor;
use std::path::Path;
use zip::ZipArchive;

use crate::error::ScanError;

pub const CLASS_SUFFIX: &str = ".class";
pub const MODULE_INFO: &str = "module-info.class";

const WEB_INF_CLASSES: &str = "WEB-INF.classes.";

/// Package name to class-file count. The default package is `""`.
pub type PackageCounts = BTreeMap<String, u64>;

pub fn is_class_file(file_name: &str) -> bool {
    file_name.ends_with(CLASS_SUFFIX) && file_name != MODULE_INFO
}

/// Strips the exploded web-archive prefix from a dotted package name.
pub fn translate_package(package: &str) -> &str {
    package.strip_prefix(WEB_INF_CLASSES).unwrap_or(package)
}

/// Dotted package of a `/`-separated archive entry name.
pub fn entry_package(entry_name: &str) -> String {
    match entry_name.rfind('/') {
        Some(i) => entry_name[..i].replace('/', "."),
        None => String::new(),
    }
}

pub fn from_directory(root: &Path) -> Result<PackageCounts, ScanError> {
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .build();

    let mut counts = PackageCounts::new();
    for entry in walker {
        let entry = entry.map_err(|source| ScanError::DirectoryWalk {
            path: root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let Some(file_name) = entry.file_name().to_str() else {
            continue;
        };
        if !is_class_file(file_name) {
            continue;
        }

        let parent = entry.path().parent().unwrap_or(root);
        let relative = parent.strip_prefix(root).unwrap_or(parent);
        let package = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join(".");
        *counts.entry(translate_package(&package).to_string()).or_default() += 1;
    }
    Ok(counts)
}

pub fn from_archive(path: &Path) -> Result<PackageCounts, ScanError> {
    let file = File::open(path).map_err(|source| ScanError::SourceUnreadable {
        path: path.to_path_buf(),
        source,
    })?;
    // SAFETY: The file is opened read-only and outlives the mapping.
    let mmap = unsafe { Mmap::map(&file) }.map_err(|source| ScanError::SourceUnreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let archive = ZipArchive::new(Cursor::new(&mmap[..])).map_err(|source| {
        ScanError::ArchiveUnreadable {
            path: path.to_path_buf(),
            source,
        }
    })?;
    Ok(archive_counts(archive.file_names()))
}

/// Counts class entries by name. Entry data is never decompressed, so
/// resources stored with an unsupported method do not matter.
pub fn archive_counts<'n>(names: impl Iterator<Item = &'n str>) -> PackageCounts {
    let mut counts = PackageCounts::new();
    for name in names {
        let file_name = name.rsplit('/').next().unwrap_or(name);
        if !is_class_file(file_name) {
            continue;
        }
        let package = entry_package(name);
        *counts.entry(translate_package(&package).to_string()).or_default() += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};
    use zip::write::FileOptions;

    fn temp_path(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!(
            "split_package_scan_extract_{}_{}_{}",
            std::process::id(),
            nanos,
            name
        ))
    }

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    fn write_jar(path: &Path, entries: &[&str]) {
        let file = fs::File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        for name in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(b"").unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn entry_package_handles_default_package() {
        assert_eq!(entry_package("com/acme/util/Foo.class"), "com.acme.util");
        assert_eq!(entry_package("Foo.class"), "");
    }

    #[test]
    fn translate_package_strips_web_inf_classes_only_as_prefix() {
        assert_eq!(translate_package("WEB-INF.classes.com.acme"), "com.acme");
        assert_eq!(translate_package("com.WEB-INF.classes.acme"), "com.WEB-INF.classes.acme");
        assert_eq!(translate_package("WEB-INF.classes"), "WEB-INF.classes");
    }

    #[test]
    fn from_directory_counts_classes_per_package() {
        let root = temp_path("dir");
        touch(&root.join("com/acme/util/Foo.class"));
        touch(&root.join("com/acme/util/Bar.class"));
        touch(&root.join("com/acme/Main.class"));
        touch(&root.join("com/acme/util/notes.txt"));
        touch(&root.join("module-info.class"));
        touch(&root.join("Root.class"));

        let counts = from_directory(&root).unwrap();
        assert_eq!(counts.get("com.acme.util"), Some(&2));
        assert_eq!(counts.get("com.acme"), Some(&1));
        assert_eq!(counts.get(""), Some(&1));
        assert_eq!(counts.len(), 3);

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn from_directory_merges_web_inf_classes_with_plain_layout() {
        let root = temp_path("war");
        touch(&root.join("WEB-INF/classes/com/acme/Foo.class"));
        touch(&root.join("com/acme/Bar.class"));

        let counts = from_directory(&root).unwrap();
        assert_eq!(counts.get("com.acme"), Some(&2));
        assert!(!counts.keys().any(|k| k.starts_with("WEB-INF")));

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn from_directory_reports_missing_root() {
        let root = temp_path("missing");
        let err = from_directory(&root).unwrap_err();
        assert!(matches!(err, ScanError::DirectoryWalk { .. }));
        assert_eq!(err.path(), Some(root.as_path()));
    }

    #[test]
    fn from_archive_translates_and_skips_module_info() {
        let jar = temp_path("web.war");
        write_jar(
            &jar,
            &[
                "WEB-INF/classes/com/acme/Foo.class",
                "com/acme/Bar.class",
                "com/acme/",
                "module-info.class",
                "META-INF/versions/9/module-info.class",
                "META-INF/MANIFEST.MF",
                "Top.class",
            ],
        );

        let counts = from_archive(&jar).unwrap();
        assert_eq!(counts.get("com.acme"), Some(&2));
        assert_eq!(counts.get(""), Some(&1));
        assert!(!counts.contains_key("WEB-INF.classes.com.acme"));
        assert!(!counts.contains_key("META-INF.versions.9"));
        assert_eq!(counts.len(), 2);

        let _ = fs::remove_file(jar);
    }

    /// Rewrites the compression method of `entry` in both its local and
    /// central headers.
    fn patch_compression_method(bytes: &mut [u8], entry: &str, method: u16) {
        let name = entry.as_bytes();
        let headers: [(&[u8], usize, usize); 2] =
            [(b"PK\x03\x04", 8, 30), (b"PK\x01\x02", 10, 46)];
        for (signature, method_at, name_at) in headers {
            let end = bytes.len().saturating_sub(name_at + name.len());
            for i in 0..=end {
                let header = &bytes[i..i + 4] == signature;
                if header && &bytes[i + name_at..i + name_at + name.len()] == name {
                    bytes[i + method_at..i + method_at + 2].copy_from_slice(&method.to_le_bytes());
                }
            }
        }
    }

    #[test]
    fn from_archive_ignores_entries_it_cannot_decompress() {
        let jar = temp_path("bzip2.jar");
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let stored = FileOptions::default().compression_method(zip::CompressionMethod::Stored);
        zip.start_file("com/acme/Foo.class", stored).unwrap();
        zip.write_all(b"cafebabe").unwrap();
        zip.start_file("com/acme/Res.bin", stored).unwrap();
        zip.write_all(b"resource").unwrap();
        let mut bytes = zip.finish().unwrap().into_inner();
        patch_compression_method(&mut bytes, "com/acme/Res.bin", 12);
        fs::write(&jar, bytes).unwrap();

        let counts = from_archive(&jar).unwrap();
        assert_eq!(counts, PackageCounts::from([("com.acme".to_string(), 1)]));

        let _ = fs::remove_file(jar);
    }

    #[test]
    fn from_archive_surfaces_distinct_errors() {
        let missing = temp_path("missing.jar");
        assert!(matches!(
            from_archive(&missing),
            Err(ScanError::SourceUnreadable { .. })
        ));

        let garbage = temp_path("garbage.jar");
        fs::write(&garbage, b"definitely not a zip archive").unwrap();
        let err = from_archive(&garbage).unwrap_err();
        assert!(matches!(err, ScanError::ArchiveUnreadable { .. }));
        assert_eq!(err.path(), Some(garbage.as_path()));

        let _ = fs::remove_file(garbage);
    }
}
