//! Packaging formula for melodica.
//!
//! A formula is a declarative recipe: where the source archive lives and its
//! SHA-256 checksum, which tools the build needs, one build command, and one
//! smoke test that runs the built binary and matches its output. This crate
//! parses formulas, checks them for consistency, downloads and verifies the
//! archive, and runs the install and test steps as external processes.

pub mod checksum;
pub mod engine;
pub mod fetch;
pub mod parser;
pub mod steps;
pub mod types;

pub use checksum::{sha256_hex, verify_checksum};
pub use engine::{archive_version, check_version_consistency, lint, resolve_url, substitute_vars};
pub use fetch::{FetchOptions, FetchReport, fetch_archive};
pub use parser::{builtin, find_formula, load_formula, parse_json, parse_toml};
pub use steps::{InstallReport, TestReport, run_install, run_test};
pub use types::{
    Dependency, DependencyKind, Formula, FormulaError, InstallStep, LintIssue, Severity, TestStep,
};
