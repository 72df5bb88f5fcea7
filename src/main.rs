use anyhow::{Context, Result};
use clap::{ArgMatches, CommandFactory, FromArgMatches};
use split_package_scan::cli::Cli;
use split_package_scan::config::{self, AnalysisConfig};
use split_package_scan::error::UsageError;
use split_package_scan::platform::PlatformModuleIndex;
use split_package_scan::registry::PackageRegistry;
use split_package_scan::report;
use split_package_scan::scan::scan_libraries;
use std::io;
use std::process::ExitCode;
use tracing::{debug, error};

const EXIT_USAGE: u8 = 1;
const EXIT_IO: u8 = 2;

fn main() -> ExitCode {
    let (cli, matches) = match parse_cli() {
        Ok(parsed) => parsed,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::from(EXIT_USAGE)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_logging(cli.verbose, cli.quiet);

    match run(&cli, &matches) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            if err.downcast_ref::<UsageError>().is_some() {
                ExitCode::from(EXIT_USAGE)
            } else {
                ExitCode::from(EXIT_IO)
            }
        }
    }
}

fn parse_cli() -> Result<(Cli, ArgMatches), clap::Error> {
    let matches = Cli::command().try_get_matches()?;
    let cli = Cli::from_arg_matches(&matches)?;
    Ok((cli, matches))
}

fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    let default = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: &Cli, matches: &ArgMatches) -> Result<ExitCode> {
    let config = config::resolve(cli, matches)?;
    let (registry, failed) = build_registry(&config)?;

    let stdout = io::stdout();
    report::generate(
        &config.report,
        &registry,
        &config.filter,
        config.format,
        &mut stdout.lock(),
    )?;

    if failed > 0 {
        error!("{failed} libraries could not be read and were left out of the report");
        return Ok(ExitCode::from(EXIT_IO));
    }
    Ok(ExitCode::SUCCESS)
}

/// Registry of every readable library, plus the number of libraries that failed.
fn build_registry(config: &AnalysisConfig) -> Result<(PackageRegistry, usize)> {
    let platform = match &config.java_home {
        Some(home) => PlatformModuleIndex::load(home)
            .with_context(|| format!("failed to load JDK modules from {}", home.display()))?,
        None => PlatformModuleIndex::default(),
    };
    debug!(
        "{} platform modules own {} packages",
        platform.modules().len(),
        platform.package_count()
    );

    let outcome = scan_libraries(&config.inputs);
    for failure in &outcome.failures {
        error!("{failure}");
    }

    let mut registry = PackageRegistry::new(platform);
    registry.extend(outcome.libraries);
    Ok((registry, outcome.failures.len()))
}
