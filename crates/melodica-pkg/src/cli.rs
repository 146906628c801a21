//! Clap CLI definitions for `melodica-pkg`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// melodica-pkg -- build melodica from its packaging formula.
#[derive(Parser, Debug)]
#[command(
    name = "melodica-pkg",
    about = "Fetch, build and smoke-test melodica from its packaging formula",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Global flags available to all subcommands.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Formula name or path (default: the built-in melodica formula).
    #[arg(long, global = true, env = "MELODICA_FORMULA")]
    pub formula: Option<String>,

    /// Output in JSON format.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose/debug output.
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output (errors only).
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,
}

/// All available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show formula metadata.
    #[command(alias = "info")]
    Show,

    /// Check the formula for inconsistencies.
    Lint,

    /// Download the source archive and verify its checksum.
    Fetch(FetchArgs),

    /// Build from an unpacked source tree into a prefix.
    Install(InstallArgs),

    /// Run the smoke test against an installed binary.
    Test(TestArgs),

    /// Generate shell completions.
    Completion(CompletionArgs),

    /// Print version information.
    Version,
}

/// Arguments for `melodica-pkg fetch`.
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Where to write the archive (default: `<name>-<archive file>` in the
    /// current directory).
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for `melodica-pkg install`.
#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Unpacked source tree of the fetched archive.
    #[arg(long)]
    pub source_dir: PathBuf,

    /// Installation prefix; the binary lands in `<prefix>/bin`.
    #[arg(long)]
    pub prefix: PathBuf,

    /// Fetched archive to verify against the formula checksum before building.
    #[arg(long, conflicts_with = "skip_fetch_check")]
    pub archive: Option<PathBuf>,

    /// Build without verifying an archive checksum.
    #[arg(long)]
    pub skip_fetch_check: bool,

    /// Print what would run without running it.
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for `melodica-pkg test`.
#[derive(Args, Debug)]
pub struct TestArgs {
    /// Installation prefix used for `install`.
    #[arg(long)]
    pub prefix: PathBuf,
}

/// Arguments for `melodica-pkg completion`.
#[derive(Args, Debug)]
pub struct CompletionArgs {
    /// Shell to generate completions for.
    #[arg(value_enum)]
    pub shell: Shell,
}
