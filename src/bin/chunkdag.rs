//! Chunkdag CLI Binary
//!
//! Command-line interface for importing and reading content-addressed DAGs.

use chunkdag::logging::init_logging;
use chunkdag::tooling::cli::{Cli, CliContext};
use clap::Parser;
use std::process;

fn main() {
    let cli = Cli::parse();

    let context = match CliContext::new(&cli.workspace, cli.config.as_deref(), cli.store.as_deref())
    {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error initializing store: {}", e);
            process::exit(1);
        }
    };

    let logging = cli.logging_config(&context.config().logging);
    if let Err(e) = init_logging(Some(&logging)) {
        eprintln!("Error initializing logging: {}", e);
        process::exit(1);
    }

    match context.execute(&cli.command) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
