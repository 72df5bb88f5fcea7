//! Split-package, full-inventory and graph reports.
//!
//! Every report is rendered completely in memory before a single write to its
//! sink, so a failing sink never leaves half a report behind.

use serde::Serialize;
use std::fmt::Write as _;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::cli::OutputFormat;
use crate::error::ScanError;
use crate::library::Library;
use crate::registry::{PackageGroups, PackageRegistry};

pub const SUMMARY_DOT: &str = "summary.dot";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportKind {
    Split,
    All,
    Graph { output_dir: PathBuf },
}

/// Inclusive string-prefix match on package names. The default package never
/// matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageFilter {
    prefix: String,
}

impl PackageFilter {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn matches(&self, package: &str) -> bool {
        !package.is_empty() && package.starts_with(&self.prefix)
    }
}

#[derive(Debug)]
pub struct SplitPackage<'a> {
    pub name: &'a str,
    /// Distinct contributors sorted by location.
    pub libraries: Vec<&'a Library>,
}

/// Packages with more than one distinct contributor that pass `filter`, by
/// ascending name.
pub fn split_packages<'a>(
    groups: &PackageGroups<'a>,
    filter: &PackageFilter,
) -> Vec<SplitPackage<'a>> {
    groups
        .iter()
        .filter(|(name, _)| filter.matches(name))
        .map(|(name, _)| SplitPackage {
            name,
            libraries: groups.distinct(name),
        })
        .filter(|split| split.libraries.len() > 1)
        .collect()
}

pub fn generate<W: Write>(
    kind: &ReportKind,
    registry: &PackageRegistry,
    filter: &PackageFilter,
    format: OutputFormat,
    out: &mut W,
) -> Result<(), ScanError> {
    match kind {
        ReportKind::Split => {
            let groups = registry.build();
            let rendered = render_split(&groups, filter, format)?;
            emit(out, &rendered)
        }
        ReportKind::All => {
            let rendered = render_all(registry.libraries(), filter, format)?;
            emit(out, &rendered)
        }
        ReportKind::Graph { output_dir } => {
            let groups = registry.build();
            let path = write_graph(&groups, filter, output_dir)?;
            info!("wrote {}", path.display());
            Ok(())
        }
    }
}

fn emit<W: Write>(out: &mut W, rendered: &str) -> Result<(), ScanError> {
    out.write_all(rendered.as_bytes())
        .and_then(|()| out.flush())
        .map_err(ScanError::ReportWrite)
}

#[derive(Debug, Serialize)]
struct SplitReport<'a> {
    split_packages: Vec<SplitEntry<'a>>,
}

#[derive(Debug, Serialize)]
struct SplitEntry<'a> {
    package: &'a str,
    libraries: Vec<Contributor<'a>>,
}

#[derive(Debug, Serialize)]
struct Contributor<'a> {
    location: &'a str,
    count: u64,
    platform: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    module: Option<&'a str>,
}

pub fn render_split(
    groups: &PackageGroups<'_>,
    filter: &PackageFilter,
    format: OutputFormat,
) -> Result<String, ScanError> {
    let splits = split_packages(groups, filter);
    match format {
        OutputFormat::Text => {
            let mut out = String::new();
            if !splits.is_empty() {
                out.push_str("- Split packages:\n");
            }
            for split in &splits {
                let _ = writeln!(out, "{}", split.name);
                for library in &split.libraries {
                    let count = library.count(split.name).unwrap_or_default();
                    let _ = writeln!(out, "  {count:5}  {}", library.location());
                }
            }
            Ok(out)
        }
        OutputFormat::Json => {
            let report = SplitReport {
                split_packages: splits
                    .iter()
                    .map(|split| SplitEntry {
                        package: split.name,
                        libraries: split
                            .libraries
                            .iter()
                            .map(|library| Contributor {
                                location: library.location(),
                                count: library.count(split.name).unwrap_or_default(),
                                platform: library.is_platform(),
                                module: library.module(),
                            })
                            .collect(),
                    })
                    .collect(),
            };
            Ok(serde_json::to_string_pretty(&report)? + "\n")
        }
    }
}

#[derive(Debug, Serialize)]
struct AllReport<'a> {
    libraries: Vec<LibraryPackages<'a>>,
}

#[derive(Debug, Serialize)]
struct LibraryPackages<'a> {
    location: &'a str,
    packages: Vec<&'a str>,
}

pub fn render_all(
    libraries: &[Library],
    filter: &PackageFilter,
    format: OutputFormat,
) -> Result<String, ScanError> {
    // Package maps are ordered, so the names come out sorted.
    let listed: Vec<LibraryPackages<'_>> = libraries
        .iter()
        .map(|library| LibraryPackages {
            location: library.location(),
            packages: library
                .packages()
                .keys()
                .map(String::as_str)
                .filter(|p| filter.matches(p))
                .collect(),
        })
        .filter(|entry| !entry.packages.is_empty())
        .collect();

    match format {
        OutputFormat::Text => {
            let mut out = String::from("- All packages:\n");
            for entry in &listed {
                let _ = writeln!(out, "{}", entry.location);
                for package in &entry.packages {
                    let _ = writeln!(out, "   {package}");
                }
            }
            Ok(out)
        }
        OutputFormat::Json => {
            let report = AllReport { libraries: listed };
            Ok(serde_json::to_string_pretty(&report)? + "\n")
        }
    }
}

/// Quoted DOT identifier.
fn dot_id(s: &str) -> String {
    let mut id = String::with_capacity(s.len() + 2);
    id.push('"');
    for c in s.chars() {
        if matches!(c, '"' | '\\') {
            id.push('\\');
        }
        id.push(c);
    }
    id.push('"');
    id
}

/// DOT digraph with one `location -> package` edge per split contributor.
pub fn render_graph(groups: &PackageGroups<'_>, filter: &PackageFilter) -> String {
    let mut out = String::from("digraph \"summary\" {\n");
    for split in split_packages(groups, filter) {
        let target = dot_id(split.name);
        for library in &split.libraries {
            let source = dot_id(library.location());
            let _ = writeln!(out, "   {source:<50} -> {target};");
        }
    }
    out.push_str("}\n");
    out
}

pub fn write_graph(
    groups: &PackageGroups<'_>,
    filter: &PackageFilter,
    output_dir: &Path,
) -> Result<PathBuf, ScanError> {
    let path = output_dir.join(SUMMARY_DOT);
    std::fs::write(&path, render_graph(groups, filter)).map_err(|source| {
        ScanError::OutputUnwritable {
            path: path.clone(),
            source,
        }
    })?;
    Ok(path)
}
