//! tinyledger CLI entry point.

use clap::Parser;
use std::path::PathBuf;
use tracing::Level;

mod commands;
mod repl;

#[derive(Parser)]
#[command(name = "tinyledger")]
#[command(about = "An in-memory hash-linked ledger with proof of work", long_about = None)]
struct Cli {
    /// Log ledger activity at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON file with ledger settings
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Maximum transactions per block (overrides the config file)
    #[arg(short, long, global = true)]
    threshold: Option<usize>,

    /// Leading zeros required by proof of work (overrides the config file)
    #[arg(long, global = true)]
    complexity: Option<usize>,

    #[command(subcommand)]
    command: Option<commands::Commands>,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(cmd) => {
            let result = commands::load_config(cli.config.as_deref(), cli.threshold, cli.complexity)
                .and_then(|config| commands::run(cmd, config));
            if let Err(e) = result {
                eprintln!("Error: {:#}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("tinyledger - An in-memory hash-linked ledger");
            println!("Run 'tinyledger --help' for usage information.");
        }
    }
}
