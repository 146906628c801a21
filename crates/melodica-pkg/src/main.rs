//! `melodica-pkg` -- build melodica from its packaging formula.
//!
//! Parses CLI arguments with clap, resolves the runtime context, and
//! dispatches to command handlers.

mod cli;
mod commands;
mod context;
mod output;

use clap::{CommandFactory, Parser};

use cli::{Cli, Commands};
use context::RuntimeContext;

fn main() {
    let cli = Cli::parse();
    let ctx = RuntimeContext::from_global_args(&cli.global);

    if ctx.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("melodica_pkg=debug,melodica_formula=debug")
            .with_writer(std::io::stderr)
            .init();
    }

    let result = match &cli.command {
        Some(Commands::Show) => commands::show::run(&ctx),
        Some(Commands::Lint) => commands::lint::run(&ctx),
        Some(Commands::Fetch(args)) => commands::fetch::run(&ctx, args),
        Some(Commands::Install(args)) => commands::install::run(&ctx, args),
        Some(Commands::Test(args)) => commands::test::run(&ctx, args),
        Some(Commands::Completion(args)) => commands::completion::run(args),
        Some(Commands::Version) => commands::version::run(&ctx),
        None => {
            Cli::command().print_help().ok();
            println!();
            Ok(())
        }
    };

    if let Err(e) = result {
        output::output_error(&e, ctx.json);
        std::process::exit(1);
    }
}
