//! Install and test step execution.
//!
//! Both steps are single external processes run to completion, one after
//! the other. Nothing is retried.

use std::env;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde::Serialize;

use crate::engine::resolve_command;
use crate::types::{DependencyKind, Formula, FormulaError, Result};

/// Lines of stderr kept in [`FormulaError::CommandFailed`].
const STDERR_TAIL_LINES: usize = 20;

/// What `run_install` did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallReport {
    pub command: Vec<String>,
    pub workdir: PathBuf,
    pub bin_dir: PathBuf,
}

/// Outcome of a passing test step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestReport {
    pub command: Vec<String>,
    /// Exit status, or `None` when killed by a signal.
    pub status: Option<i32>,
    /// Combined stdout and stderr.
    pub output: String,
}

/// Locate `program` on `PATH`.
pub fn find_on_path(program: &str) -> Option<PathBuf> {
    let path = env::var_os("PATH")?;
    env::split_paths(&path)
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file() || path.with_extension("exe").is_file()
}

/// Build dependencies that are not on `PATH`.
pub fn missing_build_dependencies(formula: &Formula) -> Vec<String> {
    formula
        .depends_on
        .iter()
        .filter(|d| d.kind == DependencyKind::Build)
        .filter(|d| find_on_path(&d.name).is_none())
        .map(|d| d.name.clone())
        .collect()
}

/// The install command and working directory for `prefix`, without running it.
///
/// Relative `source_dir` and `prefix` are resolved against the current
/// directory, since the command itself runs inside the source tree.
///
/// # Errors
///
/// [`FormulaError::Io`] when the current directory cannot be determined.
pub fn install_plan(formula: &Formula, source_dir: &Path, prefix: &Path) -> Result<InstallReport> {
    let source_dir = std::path::absolute(source_dir)?;
    let prefix = std::path::absolute(prefix)?;
    let workdir = match &formula.install.workdir {
        Some(sub) => source_dir.join(sub),
        None => source_dir,
    };
    Ok(InstallReport {
        command: resolve_command(&formula.install.command, formula, &prefix),
        workdir,
        bin_dir: prefix.join("bin"),
    })
}

/// Build the package from an unpacked, verified source tree into `prefix`.
///
/// # Errors
///
/// [`FormulaError::MissingDependency`] when a build tool is absent,
/// [`FormulaError::Spawn`] when the command cannot start, and
/// [`FormulaError::CommandFailed`] when it exits unsuccessfully.
pub fn run_install(formula: &Formula, source_dir: &Path, prefix: &Path) -> Result<InstallReport> {
    if let Some(missing) = missing_build_dependencies(formula).into_iter().next() {
        return Err(FormulaError::MissingDependency(missing));
    }

    let plan = install_plan(formula, source_dir, prefix)?;
    std::fs::create_dir_all(&plan.bin_dir)?;

    tracing::info!(command = ?plan.command, workdir = %plan.workdir.display(), "running install step");
    let output = run(&plan.command, Some(&plan.workdir))?;
    if !output.status.success() {
        return Err(FormulaError::CommandFailed {
            program: program_name(&plan.command),
            code: output.status.code(),
            stderr: tail(&String::from_utf8_lossy(&output.stderr), STDERR_TAIL_LINES),
        });
    }
    tracing::debug!(stdout = %String::from_utf8_lossy(&output.stdout), "install step finished");
    Ok(plan)
}

/// The resolved test command for `prefix`.
pub fn test_command(formula: &Formula, prefix: &Path) -> Vec<String> {
    resolve_command(&formula.test.command, formula, prefix)
}

/// Run the smoke test against the binary installed under `prefix`.
///
/// # Errors
///
/// [`FormulaError::StatusMismatch`] when the exit status differs from the
/// expected one, [`FormulaError::OutputMismatch`] when the combined output
/// lacks the expected text.
pub fn run_test(formula: &Formula, prefix: &Path) -> Result<TestReport> {
    let command = test_command(formula, prefix);
    tracing::info!(command = ?command, "running test step");
    let output = run(&command, None)?;

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    let status = output.status.code();

    let expected = formula.test.expect_status.unwrap_or(0);
    if status != Some(expected) {
        return Err(FormulaError::StatusMismatch {
            expected,
            actual: status,
        });
    }
    if !combined.contains(&formula.test.expect_output) {
        return Err(FormulaError::OutputMismatch {
            expected: formula.test.expect_output.clone(),
            output: combined,
        });
    }

    Ok(TestReport {
        command,
        status,
        output: combined,
    })
}

fn run(command: &[String], cwd: Option<&Path>) -> Result<Output> {
    let (program, args) = command.split_first().ok_or_else(|| FormulaError::InvalidField {
        field: "command".to_string(),
        reason: "command is empty".to_string(),
    })?;

    let mut cmd = Command::new(program);
    cmd.args(args);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    cmd.output().map_err(|source| FormulaError::Spawn {
        program: program.clone(),
        source,
    })
}

fn program_name(command: &[String]) -> String {
    command.first().cloned().unwrap_or_default()
}

fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.trim_end().lines().collect();
    all[all.len().saturating_sub(lines)..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::builtin;
    use crate::types::{Dependency, InstallStep, TestStep};
    use pretty_assertions::assert_eq;

    fn formula(install: &[&str], test: &[&str], expect_output: &str, status: i32) -> Formula {
        let mut f = builtin().unwrap();
        f.depends_on = vec![Dependency {
            name: "sh".to_string(),
            kind: DependencyKind::Build,
        }];
        f.install = InstallStep {
            command: install.iter().map(|s| s.to_string()).collect(),
            workdir: None,
        };
        f.test = TestStep {
            command: test.iter().map(|s| s.to_string()).collect(),
            expect_output: expect_output.to_string(),
            expect_status: Some(status),
        };
        f
    }

    #[test]
    fn tail_keeps_last_lines() {
        assert_eq!(tail("a\nb\nc\n", 2), "b\nc");
        assert_eq!(tail("only", 5), "only");
        assert_eq!(tail("", 3), "");
    }

    #[test]
    fn install_plan_resolves_placeholders() {
        let f = builtin().unwrap();
        let plan = install_plan(&f, Path::new("/src/melodica-0.0.2"), Path::new("/opt/m")).unwrap();
        assert_eq!(plan.command[0], "go");
        assert!(plan.command.contains(&"/opt/m/bin/melodica".to_string()));
        assert_eq!(plan.workdir, PathBuf::from("/src/melodica-0.0.2"));
        assert_eq!(plan.bin_dir, PathBuf::from("/opt/m/bin"));
    }

    #[test]
    fn install_plan_anchors_relative_paths_at_cwd() {
        let f = builtin().unwrap();
        let cwd = env::current_dir().unwrap();
        let plan = install_plan(&f, Path::new("src"), Path::new("stage")).unwrap();
        assert_eq!(plan.workdir, cwd.join("src"));
        assert_eq!(plan.bin_dir, cwd.join("stage").join("bin"));
        let binary = cwd.join("stage").join("bin").join("melodica");
        assert!(
            plan.command.contains(&binary.display().to_string()),
            "got: {:?}",
            plan.command
        );
    }

    #[test]
    fn missing_build_tool_is_reported() {
        let mut f = builtin().unwrap();
        f.depends_on = vec![
            Dependency {
                name: "definitely-not-a-tool-xyz".to_string(),
                kind: DependencyKind::Build,
            },
            Dependency {
                name: "also-not-a-tool-xyz".to_string(),
                kind: DependencyKind::Runtime,
            },
        ];
        assert_eq!(missing_build_dependencies(&f), vec!["definitely-not-a-tool-xyz"]);

        let tmp = tempfile::tempdir().unwrap();
        let err = run_install(&f, tmp.path(), tmp.path()).unwrap_err();
        assert!(matches!(err, FormulaError::MissingDependency(ref n) if n == "definitely-not-a-tool-xyz"));
    }

    #[cfg(unix)]
    #[test]
    fn install_then_test_with_fake_binary() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("src");
        std::fs::create_dir(&source).unwrap();
        let prefix = tmp.path().join("prefix");

        let script = "printf 'echo \"Usage: melodica <playlist.txt>\" >&2\\nexit 2\\n' > {{bin}}/melodica";
        let f = formula(
            &["sh", "-c", script],
            &["sh", "{{bin}}/melodica", "-h"],
            "Usage: melodica <playlist.txt>",
            2,
        );

        let install = run_install(&f, &source, &prefix).unwrap();
        assert_eq!(install.bin_dir, prefix.join("bin"));
        assert!(prefix.join("bin").join("melodica").is_file());

        let report = run_test(&f, &prefix).unwrap();
        assert_eq!(report.status, Some(2));
        assert!(report.output.contains("Usage: melodica <playlist.txt>"));
    }

    #[cfg(unix)]
    #[test]
    fn failing_install_carries_stderr() {
        let tmp = tempfile::tempdir().unwrap();
        let f = formula(&["sh", "-c", "echo boom >&2; exit 3"], &["true"], "", 0);
        match run_install(&f, tmp.path(), tmp.path()).unwrap_err() {
            FormulaError::CommandFailed {
                program,
                code,
                stderr,
            } => {
                assert_eq!(program, "sh");
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "boom");
            }
            other => panic!("expected CommandFailed, got: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_step_checks_status_and_output() {
        let tmp = tempfile::tempdir().unwrap();

        let wrong_status = formula(&["true"], &["sh", "-c", "echo hi; exit 0"], "hi", 2);
        assert!(matches!(
            run_test(&wrong_status, tmp.path()).unwrap_err(),
            FormulaError::StatusMismatch {
                expected: 2,
                actual: Some(0)
            }
        ));

        let wrong_output = formula(&["true"], &["sh", "-c", "echo hi; exit 2"], "bye", 2);
        assert!(matches!(
            run_test(&wrong_output, tmp.path()).unwrap_err(),
            FormulaError::OutputMismatch { .. }
        ));
    }

    #[test]
    fn unknown_program_is_spawn_error() {
        let tmp = tempfile::tempdir().unwrap();
        let f = formula(&["true"], &["definitely-not-a-tool-xyz"], "", 0);
        assert!(matches!(
            run_test(&f, tmp.path()).unwrap_err(),
            FormulaError::Spawn { .. }
        ));
    }
}
