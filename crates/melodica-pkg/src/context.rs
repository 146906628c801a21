//! Runtime context for command execution.

use std::env;
use std::path::Path;

use anyhow::{Context, Result};
use melodica_formula::{Formula, builtin, find_formula, load_formula};

use crate::cli::GlobalArgs;

/// Runtime context passed to every command handler.
///
/// Constructed once in `main` after CLI parsing, before command dispatch.
#[derive(Debug)]
pub struct RuntimeContext {
    /// `--formula` value; `None` selects the built-in formula.
    pub formula: Option<String>,

    /// Whether to produce JSON output.
    pub json: bool,

    /// Verbose output.
    pub verbose: bool,

    /// Quiet mode: suppress non-essential output.
    pub quiet: bool,
}

impl RuntimeContext {
    /// Build a `RuntimeContext` from parsed global arguments.
    pub fn from_global_args(global: &GlobalArgs) -> Self {
        Self {
            formula: global.formula.clone().filter(|f| !f.is_empty()),
            json: global.json,
            verbose: global.verbose,
            quiet: global.quiet,
        }
    }

    /// Load the selected formula.
    pub fn load_formula(&self) -> Result<Formula> {
        let Some(name) = self.formula.as_deref() else {
            return builtin().context("built-in formula is invalid");
        };
        let cwd = env::current_dir().context("cannot determine current directory")?;
        let path = find_formula(name, &cwd)?;
        load_formula(&path).with_context(|| format!("failed to load {}", path.display()))
    }

    /// Print a progress line unless quiet or in JSON mode.
    pub fn note(&self, message: &str) {
        if !self.quiet && !self.json {
            println!("{message}");
        }
    }

    /// Print a path-bearing progress line.
    pub fn note_path(&self, label: &str, path: &Path) {
        self.note(&format!("{label} {}", path.display()));
    }
}
