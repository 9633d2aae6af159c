//! # airone CLI
//!
//! Binary entry point for the `airone` command-line tool. It parses the
//! command line with `clap` and dispatches to one of the commands in
//! `commands`; all real work lives in the `airone` library crate.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
