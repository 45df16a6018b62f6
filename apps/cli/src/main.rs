//! docmake CLI, a documentation build launcher.
//!
//! Resolves the documentation project root from an entry script, optionally
//! syncs git submodules, and hands off to the configured builder.

mod commands;

use std::process::ExitCode;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
