//! Variable substitution and consistency checks.

use std::collections::HashMap;
use std::path::Path;

use crate::types::{Formula, FormulaError, LintIssue, Result};

/// Archive suffixes stripped before reading a version from a file name.
const ARCHIVE_SUFFIXES: &[&str] = &[".tar.gz", ".tgz", ".tar.bz2", ".tar.xz", ".zip", ".tar"];

/// Substitute `{{variable}}` patterns in a string with provided values.
/// Unresolved variables are left as-is.
pub fn substitute_vars(text: &str, vars: &HashMap<String, String>) -> String {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find("{{") {
        result.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        match after.find("}}") {
            Some(close) if is_var_name(&after[..close]) => {
                let name = &after[..close];
                match vars.get(name) {
                    Some(value) => result.push_str(value),
                    None => result.push_str(&rest[open..open + close + 4]),
                }
                rest = &after[close + 2..];
            }
            _ => {
                result.push_str("{{");
                rest = after;
            }
        }
    }
    result.push_str(rest);
    result
}

fn is_var_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Variables available to the URL (`name`, `version`).
fn base_vars(formula: &Formula) -> HashMap<String, String> {
    HashMap::from([
        ("name".to_string(), formula.formula.clone()),
        ("version".to_string(), formula.version.clone()),
    ])
}

/// Variables available to install and test commands.
pub fn step_vars(formula: &Formula, prefix: &Path) -> HashMap<String, String> {
    let mut vars = base_vars(formula);
    vars.insert("prefix".to_string(), prefix.display().to_string());
    vars.insert("bin".to_string(), prefix.join("bin").display().to_string());
    vars
}

/// Expand a command's placeholders for `prefix`.
pub fn resolve_command(command: &[String], formula: &Formula, prefix: &Path) -> Vec<String> {
    let vars = step_vars(formula, prefix);
    command.iter().map(|arg| substitute_vars(arg, &vars)).collect()
}

/// The archive URL with `{{version}}` and `{{name}}` expanded.
pub fn resolve_url(formula: &Formula) -> String {
    substitute_vars(&formula.url, &base_vars(formula))
}

/// Version embedded in the last path segment of an archive URL.
///
/// `.../archive/v0.0.2.tar.gz` gives `0.0.2`. Returns `None` when the file
/// name does not look like a version.
pub fn archive_version(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let file = path.trim_end_matches('/').rsplit('/').next()?;
    let stem = ARCHIVE_SUFFIXES
        .iter()
        .find_map(|suffix| file.strip_suffix(suffix))?;
    let version = stem.strip_prefix('v').unwrap_or(stem);
    version
        .starts_with(|c: char| c.is_ascii_digit())
        .then(|| version.to_string())
}

/// Fail when the declared version disagrees with the archive URL.
///
/// A URL without a recognizable version is accepted.
pub fn check_version_consistency(formula: &Formula) -> Result<()> {
    match archive_version(&resolve_url(formula)) {
        Some(archive) if archive != formula.version => Err(FormulaError::VersionMismatch {
            declared: formula.version.clone(),
            archive,
        }),
        _ => Ok(()),
    }
}

/// Check a formula for problems that would break fetch, install or test.
pub fn lint(formula: &Formula) -> Vec<LintIssue> {
    let mut issues = Vec::new();

    if formula.formula.trim().is_empty() {
        issues.push(LintIssue::error("formula", "name is empty"));
    }
    if formula.version.trim().is_empty() {
        issues.push(LintIssue::error("version", "version is empty"));
    }

    let url = resolve_url(formula);
    let scheme_ok = ["https://", "http://", "file://"]
        .iter()
        .any(|s| url.starts_with(s));
    if !scheme_ok {
        issues.push(LintIssue::error("url", format!("unsupported scheme in {url}")));
    }
    if let Err(e) = check_version_consistency(formula) {
        issues.push(LintIssue::error("version", e.to_string()));
    } else if archive_version(&url).is_none() {
        issues.push(LintIssue::warning(
            "url",
            "cannot determine the version from the archive name",
        ));
    }

    let sha = &formula.sha256;
    if sha.len() != 64 || !sha.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')) {
        issues.push(LintIssue::error(
            "sha256",
            "must be 64 lowercase hexadecimal characters",
        ));
    }

    if formula.install.command.is_empty() {
        issues.push(LintIssue::error("install.command", "command is empty"));
    }
    if formula.test.command.is_empty() {
        issues.push(LintIssue::error("test.command", "command is empty"));
    }
    if formula.test.expect_output.is_empty() {
        issues.push(LintIssue::warning(
            "test.expect_output",
            "no expected output; any output passes",
        ));
    }
    if formula.test.expect_status.is_none() {
        issues.push(LintIssue::warning(
            "test.expect_status",
            "not set; the test expects exit status 0",
        ));
    }
    if formula.description.trim().is_empty() {
        issues.push(LintIssue::warning("description", "description is empty"));
    }
    if formula.license.trim().is_empty() {
        issues.push(LintIssue::warning("license", "license is empty"));
    }

    issues
}
