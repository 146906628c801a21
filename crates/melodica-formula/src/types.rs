//! Formula data model.
//!
//! Mirrors the fields of a classic package recipe: descriptive metadata, a
//! source archive with its checksum, dependencies, one install step and one
//! test step.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Root structure for `.formula.toml` / `.formula.json` files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Formula {
    /// Package name; also the default binary name.
    pub formula: String,

    /// One-line description.
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub homepage: String,

    /// Source archive URL. May reference `{{version}}` and `{{name}}`.
    pub url: String,

    /// Expected SHA-256 of the archive, lowercase hex.
    pub sha256: String,

    #[serde(default)]
    pub license: String,

    /// Declared package version, e.g. `0.0.2`.
    pub version: String,

    #[serde(default)]
    pub depends_on: Vec<Dependency>,

    pub install: InstallStep,

    pub test: TestStep,

    /// Where this formula was loaded from (set by the parser).
    #[serde(skip)]
    pub source: String,
}

/// A tool or library the package needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,

    #[serde(default)]
    pub kind: DependencyKind,
}

/// When a dependency is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    /// Only while building; must be on `PATH` for `install`.
    Build,
    /// Needed by the installed program.
    #[default]
    Runtime,
}

impl DependencyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyKind::Build => "build",
            DependencyKind::Runtime => "runtime",
        }
    }
}

/// The build invocation.
///
/// Placeholders: `{{bin}}`, `{{prefix}}`, `{{version}}`, `{{name}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallStep {
    /// Program and arguments.
    pub command: Vec<String>,

    /// Directory to run in, relative to the unpacked source tree.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workdir: Option<String>,
}

/// The smoke test run against the installed binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestStep {
    /// Program and arguments; same placeholders as [`InstallStep`].
    pub command: Vec<String>,

    /// Literal text the combined output must contain.
    #[serde(default)]
    pub expect_output: String,

    /// Exit status the command must end with (0 when unset).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expect_status: Option<i32>,
}

/// How serious a lint finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// One problem found by [`crate::engine::lint`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintIssue {
    pub severity: Severity,
    /// Formula field the finding is about.
    pub field: String,
    pub message: String,
}

impl LintIssue {
    pub(crate) fn error(field: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn warning(field: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for LintIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{level}: {}: {}", self.field, self.message)
    }
}

/// Errors from parsing, fetching, building and testing formulas.
#[derive(Debug, thiserror::Error)]
pub enum FormulaError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("formula '{0}' not found (searched cwd, formulas/, ~/.melodica/formulas/)")]
    NotFound(String),

    #[error("invalid {field}: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("version mismatch: formula declares {declared} but the archive URL is for {archive}")]
    VersionMismatch { declared: String, archive: String },

    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("download of {url} failed: {source}")]
    Download {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },

    #[error("archive {url} exceeds {limit} bytes")]
    TooLarge { url: String, limit: u64 },

    #[error("build dependency not found on PATH: {0}")]
    MissingDependency(String),

    #[error("failed to execute {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} failed (exit code {code:?}): {stderr}")]
    CommandFailed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("test output does not contain {expected:?}; got: {output}")]
    OutputMismatch { expected: String, output: String },

    #[error("test exited with status {actual:?}, expected {expected}")]
    StatusMismatch { expected: i32, actual: Option<i32> },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized `Result` type for formula operations.
pub type Result<T> = std::result::Result<T, FormulaError>;
