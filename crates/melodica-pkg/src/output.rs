//! Output formatting helpers.

use std::io::{self, Write};

use serde::Serialize;

/// Print a value as pretty-printed JSON to stdout.
pub fn output_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    let mut handle = io::stdout().lock();
    // Ignore broken pipe errors (e.g., piped to `head`)
    let _ = writeln!(handle, "{json}");
    Ok(())
}

/// Print an error in the format selected by `--json`.
pub fn output_error(err: &anyhow::Error, json: bool) {
    if json {
        let err_json = serde_json::json!({ "error": format!("{err:#}") });
        if let Ok(s) = serde_json::to_string_pretty(&err_json) {
            eprintln!("{s}");
        }
    } else {
        eprintln!("Error: {err:#}");
    }
}

/// Quote a command line for display.
pub fn format_command(argv: &[String]) -> String {
    argv.iter()
        .map(|arg| {
            if arg.is_empty() || arg.contains(|c: char| c.is_whitespace() || c == '"' || c == '\'') {
                format!("{arg:?}")
            } else {
                arg.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_command_quotes_spaces() {
        let argv: Vec<String> = ["go", "build", "-ldflags=-s -w", ""]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(format_command(&argv), r#"go build "-ldflags=-s -w" """#);
    }
}
