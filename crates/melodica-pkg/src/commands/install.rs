//! `melodica-pkg install` -- build from a verified source tree.

use std::fs::File;
use std::io::BufReader;

use anyhow::{Context, Result, bail};
use melodica_formula::steps::{install_plan, missing_build_dependencies};
use melodica_formula::{check_version_consistency, run_install, sha256_hex, verify_checksum};
use melodica_ui::styles::{Tone, status_line};

use crate::cli::InstallArgs;
use crate::context::RuntimeContext;
use crate::output::{format_command, output_json};

pub fn run(ctx: &RuntimeContext, args: &InstallArgs) -> Result<()> {
    let formula = ctx.load_formula()?;
    check_version_consistency(&formula)?;

    if args.dry_run {
        let plan = install_plan(&formula, &args.source_dir, &args.prefix)?;
        let missing = missing_build_dependencies(&formula);
        if ctx.json {
            return output_json(&serde_json::json!({
                "dry_run": true,
                "command": plan.command,
                "workdir": plan.workdir,
                "bin_dir": plan.bin_dir,
                "missing_dependencies": missing,
            }));
        }
        println!("Would run: {}", format_command(&plan.command));
        println!("In: {}", plan.workdir.display());
        for name in missing {
            println!("{}", status_line(Tone::Warn, &format!("build dependency not found: {name}")));
        }
        return Ok(());
    }

    if !args.source_dir.is_dir() {
        bail!("source directory {} does not exist", args.source_dir.display());
    }

    match &args.archive {
        Some(archive) => {
            let file = File::open(archive)
                .with_context(|| format!("cannot open archive {}", archive.display()))?;
            let actual = sha256_hex(BufReader::new(file))?;
            verify_checksum(&actual, &formula.sha256)
                .with_context(|| format!("refusing to build from {}", archive.display()))?;
            ctx.note(&status_line(Tone::Pass, "checksum verified"));
        }
        None if args.skip_fetch_check => {
            tracing::warn!("building without checksum verification");
            ctx.note(&status_line(Tone::Warn, "building without checksum verification"));
        }
        None => bail!(
            "refusing to build unverified sources: pass --archive <fetched archive> or --skip-fetch-check"
        ),
    }

    let report = run_install(&formula, &args.source_dir, &args.prefix)
        .with_context(|| format!("failed to install {}", formula.formula))?;

    if ctx.json {
        output_json(&report)?;
    } else {
        ctx.note(&format!("Ran: {}", format_command(&report.command)));
        ctx.note(&status_line(
            Tone::Pass,
            &format!(
                "installed {} {} into {}",
                formula.formula,
                formula.version,
                report.bin_dir.display()
            ),
        ));
    }
    Ok(())
}
