//! `cookieconsent` binary.

use clap::Parser;
use cookieconsent_rs::{Cli, init_logging, run};
use std::io;

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    let stdout = io::stdout();
    run(cli, &mut stdout.lock())
}
