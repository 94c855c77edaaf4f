//! CLI argument parsing using clap derive API
//!
//! Purely declarative. Flags given here take precedence over the config
//! file and environment overrides.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Default config file, loaded only if it exists.
pub const DEFAULT_CONFIG: &str = "packmatrix.toml";

/// packmatrix -- acceptance test matrix for apk, deb and rpm packages.
///
/// Use `packmatrix <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "packmatrix", version, about, long_about = None)]
pub struct Cli {
    /// Path to the packmatrix.toml configuration file.
    ///
    /// Without this flag `packmatrix.toml` is used if present, otherwise
    /// defaults plus environment overrides.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build and verify every case of the matrix.
    Run(RunArgs),

    /// List the cases of the matrix without running them.
    List(ListArgs),
}

// ---- run ----

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Only run cases whose id contains this substring (e.g. `deb/amd64`).
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Maximum number of cases running at once.
    #[arg(short = 'j', long)]
    pub max_parallel: Option<usize>,

    /// Skip every ppc64le case.
    #[arg(long)]
    pub skip_ppc64le: bool,

    /// Build packages only, without container verification.
    #[arg(long)]
    pub build_only: bool,
}

// ---- list ----

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only list cases whose id contains this substring.
    #[arg(short, long)]
    pub filter: Option<String>,
}
