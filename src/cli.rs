use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "split-package-scan", version)]
#[command(about = "Report Java packages split across jars, wars, exploded class directories and JDK modules")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Jar, war or rar file, or exploded class directory
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// File listing one jar or exploded directory per line
    #[arg(short = 'f', value_name = "FILE")]
    pub list_files: Vec<PathBuf>,

    /// Directory containing jar files and exploded directories
    #[arg(short = 'd', value_name = "DIR")]
    pub directories: Vec<PathBuf>,

    /// List all packages of every library instead of split packages
    #[arg(short = 'a', long)]
    pub all: bool,

    /// Only report packages starting with this prefix, e.g. java.util
    #[arg(short = 'p', long = "package", value_name = "PREFIX")]
    pub package: Option<String>,

    /// Write summary.dot with library -> split package edges into DIR
    #[arg(long = "dot-output", value_name = "DIR")]
    pub dot_output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// JDK whose jmods are checked for package collisions (default: $JAVA_HOME)
    #[arg(long, value_name = "DIR")]
    pub java_home: Option<PathBuf>,

    /// Do not check packages against JDK modules
    #[arg(long)]
    pub no_platform: bool,

    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
