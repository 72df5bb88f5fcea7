use anyhow::Result;
use clap::ArgMatches;
use std::env;
use std::path::PathBuf;
use tracing::warn;

use crate::cli::{Cli, OutputFormat};
use crate::error::UsageError;
use crate::report::{PackageFilter, ReportKind};
use crate::scan::{expand_directory, read_library_list};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Path(PathBuf),
    ListFile(PathBuf),
    Directory(PathBuf),
}

#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub report: ReportKind,
    pub filter: PackageFilter,
    pub format: OutputFormat,
    pub java_home: Option<PathBuf>,
    /// Candidate library paths in command-line order.
    pub inputs: Vec<PathBuf>,
}

pub fn resolve(cli: &Cli, matches: &ArgMatches) -> Result<AnalysisConfig> {
    let mut inputs = Vec::new();
    for source in input_sources(cli, matches) {
        inputs.extend(expand_source(source)?);
    }

    Ok(AnalysisConfig {
        report: resolve_report_kind(cli)?,
        filter: PackageFilter::new(cli.package.clone().unwrap_or_default()),
        format: cli.format,
        java_home: resolve_java_home(cli),
        inputs,
    })
}

/// Positional paths, `-f` and `-d` arguments interleaved as they were given.
pub fn input_sources(cli: &Cli, matches: &ArgMatches) -> Vec<InputSource> {
    let mut indexed = Vec::new();
    push_indexed(&mut indexed, matches, "paths", &cli.paths, InputSource::Path);
    push_indexed(&mut indexed, matches, "list_files", &cli.list_files, InputSource::ListFile);
    push_indexed(&mut indexed, matches, "directories", &cli.directories, InputSource::Directory);
    indexed.sort_by_key(|(index, _)| *index);
    indexed.into_iter().map(|(_, source)| source).collect()
}

fn push_indexed(
    out: &mut Vec<(usize, InputSource)>,
    matches: &ArgMatches,
    id: &str,
    values: &[PathBuf],
    wrap: fn(PathBuf) -> InputSource,
) {
    let Some(indices) = matches.indices_of(id) else {
        return;
    };
    out.extend(indices.zip(values).map(|(index, value)| (index, wrap(value.clone()))));
}

fn expand_source(source: InputSource) -> Result<Vec<PathBuf>> {
    match source {
        InputSource::Path(path) => Ok(vec![path]),
        InputSource::ListFile(list) => {
            if !list.is_file() {
                return Err(UsageError::InvalidPath(list).into());
            }
            Ok(read_library_list(&list)?)
        }
        InputSource::Directory(dir) => {
            let dir = std::path::absolute(&dir).unwrap_or(dir);
            if !dir.is_dir() {
                return Err(UsageError::InvalidPath(dir).into());
            }
            Ok(expand_directory(&dir)?)
        }
    }
}

/// `-a` wins over `--dot-output`, which wins over the default split report.
pub fn resolve_report_kind(cli: &Cli) -> Result<ReportKind, UsageError> {
    if cli.all {
        return Ok(ReportKind::All);
    }
    match &cli.dot_output {
        Some(dir) if dir.is_dir() => Ok(ReportKind::Graph {
            output_dir: dir.clone(),
        }),
        Some(dir) => Err(UsageError::MissingOutputDir(dir.clone())),
        None => Ok(ReportKind::Split),
    }
}

pub fn resolve_java_home(cli: &Cli) -> Option<PathBuf> {
    if cli.no_platform {
        return None;
    }
    if let Some(p) = cli.java_home.clone() {
        return Some(p);
    }
    if let Some(p) = env::var_os("JAVA_HOME").filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(p));
    }
    warn!("JAVA_HOME is not set, platform modules are not considered (use --java-home)");
    None
}
