//! `melodica-pkg completion` -- shell completion scripts.

use std::io::Write;

use anyhow::Result;
use clap::CommandFactory;

use crate::cli::{Cli, CompletionArgs};

const BIN_NAME: &str = "melodica-pkg";

pub fn run(args: &CompletionArgs) -> Result<()> {
    write_completions(args, &mut std::io::stdout())
}

fn write_completions<W: Write>(args: &CompletionArgs, out: &mut W) -> Result<()> {
    clap_complete::generate(args.shell, &mut Cli::command(), BIN_NAME, out);
    out.flush()?;
    Ok(())
}
