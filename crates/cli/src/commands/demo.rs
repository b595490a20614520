//! Scripted demo command.

use super::block::{print_blocks, print_transactions};
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::io;
use tinyledger_chain::{LedgerConfig, LedgerSession};

#[derive(Args)]
pub struct DemoArgs {
    /// Number of transactions to submit through the miner
    #[arg(short = 'n', long, default_value = "10")]
    transactions: usize,
}

pub fn run(args: DemoArgs, config: LedgerConfig) -> Result<()> {
    println!("{}", "Running tinyledger demo...".bold().cyan());
    println!(
        "  Threshold: {}  Complexity: {}",
        config.block_threshold.to_string().bright_cyan(),
        config.complexity.to_string().bright_cyan()
    );

    let mut session = LedgerSession::new(config).context("Failed to create ledger")?;

    for i in 0..args.transactions {
        let value = format!("demo-{i}");
        if session
            .submit_pooled(&value)
            .with_context(|| format!("Failed to submit {value}"))?
        {
            println!(
                "{}  Pool flushed into block {}",
                "✓".green().bold(),
                (session.chain_len() - 1).to_string().bright_cyan()
            );
        }
    }

    let mut out = io::stdout().lock();
    print_blocks(&mut out, &session.block_rows())?;
    print_transactions(&mut out, &session.transaction_rows())?;

    println!("  Pending in pool: {}", session.pool_size());
    match session.validate() {
        Ok(()) => println!("{}  Chain is valid", "✓".green().bold()),
        Err(reason) => println!("{}  {}", "✗".red().bold(), reason),
    }
    Ok(())
}
