//! `melodica-pkg lint` -- check a formula for inconsistencies.

use anyhow::{Result, bail};
use melodica_formula::{Severity, lint};
use melodica_ui::styles::{Tone, status_line};

use crate::context::RuntimeContext;
use crate::output::output_json;

/// Execute `melodica-pkg lint`. Fails when any error-level issue is found.
pub fn run(ctx: &RuntimeContext) -> Result<()> {
    let formula = ctx.load_formula()?;
    let issues = lint(&formula);
    let errors = issues
        .iter()
        .filter(|i| i.severity == Severity::Error)
        .count();

    if ctx.json {
        output_json(&serde_json::json!({
            "formula": formula.formula,
            "ok": errors == 0,
            "issues": issues,
        }))?;
    } else {
        for issue in &issues {
            let tone = match issue.severity {
                Severity::Error => Tone::Fail,
                Severity::Warning => Tone::Warn,
            };
            println!("{}", status_line(tone, &issue.to_string()));
        }
        if errors == 0 {
            ctx.note(&status_line(
                Tone::Pass,
                &format!("{} {} passed lint", formula.formula, formula.version),
            ));
        }
    }

    if errors > 0 {
        bail!("{} has {errors} lint error(s)", formula.formula);
    }
    Ok(())
}
