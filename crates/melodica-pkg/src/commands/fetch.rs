//! `melodica-pkg fetch` -- download and verify the source archive.

use std::path::PathBuf;

use anyhow::{Context, Result};
use melodica_formula::{FetchOptions, Formula, check_version_consistency, fetch_archive, resolve_url};

use crate::cli::FetchArgs;
use crate::context::RuntimeContext;
use crate::output::output_json;

pub fn run(ctx: &RuntimeContext, args: &FetchArgs) -> Result<()> {
    let formula = ctx.load_formula()?;
    check_version_consistency(&formula)?;

    let url = resolve_url(&formula);
    let dest = args.output.clone().unwrap_or_else(|| default_output(&formula, &url));
    ctx.note(&format!("Fetching {url}"));

    let report = fetch_archive(&url, &dest, Some(&formula.sha256), &FetchOptions::default())
        .with_context(|| format!("failed to fetch {}", formula.formula))?;

    if ctx.json {
        output_json(&report)?;
    } else {
        ctx.note_path(&format!("Verified {} bytes, sha256 {} ->", report.bytes, report.sha256), &report.path);
    }
    Ok(())
}

/// `<name>-<archive file name>` in the current directory.
fn default_output(formula: &Formula, url: &str) -> PathBuf {
    let file = url
        .split(['?', '#'])
        .next()
        .and_then(|path| path.rsplit('/').next())
        .filter(|f| !f.is_empty())
        .unwrap_or("source.tar.gz");
    PathBuf::from(format!("{}-{file}", formula.formula))
}
