//! CLI commands module.

use anyhow::{Context, Result};
use clap::Subcommand;
use std::fs;
use std::path::Path;
use tinyledger_chain::LedgerConfig;

pub mod block;
mod demo;

#[derive(Subcommand)]
pub enum Commands {
    /// Drive a ledger interactively
    Repl,
    /// Pool a batch of transactions and print the resulting chain
    Demo(demo::DemoArgs),
}

pub fn run(cmd: Commands, config: LedgerConfig) -> Result<()> {
    match cmd {
        Commands::Repl => crate::repl::run(config),
        Commands::Demo(args) => demo::run(args, config),
    }
}

/// Read the optional config file, then apply command-line overrides.
pub fn load_config(
    path: Option<&Path>,
    threshold: Option<usize>,
    complexity: Option<usize>,
) -> Result<LedgerConfig> {
    let mut config = match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            LedgerConfig::from_json_str(&text)
                .with_context(|| format!("Invalid config file: {}", path.display()))?
        }
        None => LedgerConfig::default(),
    };

    if let Some(threshold) = threshold {
        config.block_threshold = threshold;
    }
    if let Some(complexity) = complexity {
        config.complexity = complexity;
    }
    config.validate().context("Invalid ledger settings")?;
    Ok(config)
}
