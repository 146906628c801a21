//! `melodica-pkg show` -- display formula metadata.

use anyhow::Result;
use melodica_formula::resolve_url;
use melodica_ui::styles::{bold, field};

use crate::context::RuntimeContext;
use crate::output::{format_command, output_json};

pub fn run(ctx: &RuntimeContext) -> Result<()> {
    let formula = ctx.load_formula()?;

    if ctx.json {
        let mut value = serde_json::to_value(&formula)?;
        value["resolved_url"] = serde_json::Value::String(resolve_url(&formula));
        value["source"] = serde_json::Value::String(formula.source.clone());
        return output_json(&value);
    }

    println!("{} {}", bold(&formula.formula), formula.version);
    if !formula.description.is_empty() {
        println!("{}", formula.description);
    }
    println!("{}", field("homepage", &formula.homepage));
    println!("{}", field("url", &resolve_url(&formula)));
    println!("{}", field("sha256", &formula.sha256));
    println!("{}", field("license", &formula.license));
    for dep in &formula.depends_on {
        println!(
            "{}",
            field("depends_on", &format!("{} ({})", dep.name, dep.kind.as_str()))
        );
    }
    println!(
        "{}",
        field("install", &format_command(&formula.install.command))
    );
    println!("{}", field("test", &format_command(&formula.test.command)));
    println!(
        "{}",
        field(
            "expect",
            &format!(
                "{:?} with exit status {}",
                formula.test.expect_output,
                formula.test.expect_status.unwrap_or(0)
            )
        )
    );
    println!("{}", field("source", &formula.source));
    Ok(())
}
