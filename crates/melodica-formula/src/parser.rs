//! Parse formula files (TOML and JSON) and resolve formula paths.

use std::path::{Path, PathBuf};

use crate::types::{Formula, FormulaError, Result};

/// Name of the formula compiled into the binary.
pub const BUILTIN_NAME: &str = "melodica";

const BUILTIN_SOURCE: &str = include_str!("../formulas/melodica.formula.toml");

/// Parse a formula from a TOML string.
pub fn parse_toml(content: &str) -> Result<Formula> {
    toml::from_str(content).map_err(|e| FormulaError::Parse(e.to_string()))
}

/// Parse a formula from a JSON string.
pub fn parse_json(content: &str) -> Result<Formula> {
    serde_json::from_str(content).map_err(|e| FormulaError::Parse(e.to_string()))
}

/// Load a formula from a file path (auto-detect TOML vs JSON by extension).
pub fn load_formula(path: &Path) -> Result<Formula> {
    let content = std::fs::read_to_string(path)?;
    let mut formula = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => parse_toml(&content)?,
        Some("json") => parse_json(&content)?,
        _ => parse_json(&content).or_else(|_| parse_toml(&content))?,
    };
    formula.source = path.display().to_string();
    tracing::debug!(path = %path.display(), name = %formula.formula, "loaded formula");
    Ok(formula)
}

/// The melodica formula shipped with this crate.
pub fn builtin() -> Result<Formula> {
    let mut formula = parse_toml(BUILTIN_SOURCE)?;
    formula.source = "<builtin>".to_string();
    Ok(formula)
}

/// Search for a formula by name in standard locations.
///
/// Search order:
/// 1. Exact path (absolute, or relative to `cwd`)
/// 2. `cwd` with standard extensions
/// 3. `formulas/` under `cwd`
/// 4. `~/.melodica/formulas/`
pub fn find_formula(name: &str, cwd: &Path) -> Result<PathBuf> {
    let exact = Path::new(name);
    if exact.is_absolute() && exact.is_file() {
        return Ok(exact.to_path_buf());
    }
    let relative = cwd.join(name);
    if relative.is_file() {
        return Ok(relative);
    }

    let mut dirs = vec![cwd.to_path_buf(), cwd.join("formulas")];
    if let Some(home) = home_dir() {
        dirs.push(home.join(".melodica").join("formulas"));
    }

    let suffixes = [".formula.toml", ".formula.json", ".toml", ".json"];
    dirs.iter()
        .filter(|dir| dir.is_dir())
        .flat_map(|dir| suffixes.iter().map(move |s| dir.join(format!("{name}{s}"))))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| FormulaError::NotFound(name.to_string()))
}

fn home_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE").ok().map(PathBuf::from)
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME").ok().map(PathBuf::from)
    }
}
