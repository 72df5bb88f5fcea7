//! # split-package-scan
//!
//! Finds Java packages contributed by more than one library: jar, war and rar
//! archives, exploded class directories, and the modules of a JDK image.
//! Such split packages break the module system once the libraries move from
//! the class path to the module path.
//!
//! ## Architecture
//!
//! - **extract**: Package and class-file counts from directories and archives
//! - **library**: Immutable package sets identified by location
//! - **platform**: JDK module package ownership read from `jmods/`
//! - **registry**: Grouping of packages across all registered libraries
//! - **report**: Split-package, full-inventory and DOT graph reports
//! - **scan**: Path resolution, directory expansion and parallel extraction
//! - **config**: Effective options from command line and environment
//! - **cli**: Command-line definitions
//! - **error**: Error kinds

pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod library;
pub mod platform;
pub mod registry;
pub mod report;
pub mod scan;
