//! Interactive line-oriented front-end over a ledger session.

use crate::commands::block::{print_blocks, print_transactions};
use anyhow::{Context, Result};
use colored::Colorize;
use std::io::{self, BufRead, Write};
use tinyledger_chain::{LedgerConfig, LedgerSession};

const HELP: &str = "\
Commands:
  tx <value>     add a transaction directly to the ledger
  pool <value>   add a transaction through the miner's pool
  mine <id>      mine the block with the given id
  validate       validate the whole chain
  undo           undo the last change
  reset          start again from a fresh genesis block
  blocks         list blocks
  txs            list transactions
  json           print the chain as JSON
  help           show this help
  quit           exit";

#[derive(Debug, PartialEq, Eq)]
enum ReplCommand {
    Direct(String),
    Pooled(String),
    Mine(u64),
    Validate,
    Undo,
    Reset,
    Blocks,
    Transactions,
    Json,
    Help,
    Quit,
}

fn parse(line: &str) -> std::result::Result<ReplCommand, String> {
    let line = line.trim();
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    let command = match word {
        "tx" | "pool" if rest.is_empty() => return Err(format!("usage: {word} <value>")),
        "tx" => ReplCommand::Direct(rest.to_string()),
        "pool" => ReplCommand::Pooled(rest.to_string()),
        "mine" => {
            let id = rest
                .parse()
                .map_err(|_| format!("invalid block id: {rest:?}"))?;
            ReplCommand::Mine(id)
        }
        "validate" => ReplCommand::Validate,
        "undo" => ReplCommand::Undo,
        "reset" => ReplCommand::Reset,
        "blocks" => ReplCommand::Blocks,
        "txs" => ReplCommand::Transactions,
        "json" => ReplCommand::Json,
        "help" => ReplCommand::Help,
        "quit" | "exit" => ReplCommand::Quit,
        other => return Err(format!("unknown command: {other} (try 'help')")),
    };
    Ok(command)
}

pub fn run(config: LedgerConfig) -> Result<()> {
    let mut session = LedgerSession::new(config).context("Failed to create ledger")?;
    let stdin = io::stdin().lock();
    let mut stdout = io::stdout().lock();

    writeln!(stdout, "{}", "tinyledger REPL".bold().cyan())?;
    writeln!(stdout, "Type 'help' for commands.")?;
    drive(&mut session, stdin, &mut stdout, true)
}

fn ok(out: &mut impl Write, message: impl std::fmt::Display) -> io::Result<()> {
    writeln!(out, "{}  {}", "✓".green().bold(), message)
}

fn fail(out: &mut impl Write, message: impl std::fmt::Display) -> io::Result<()> {
    writeln!(out, "{}  {}", "✗".red().bold(), message)
}

/// Read commands from `input` until it ends or `quit` is entered.
fn drive(
    session: &mut LedgerSession,
    input: impl BufRead,
    out: &mut impl Write,
    prompt: bool,
) -> Result<()> {
    if prompt {
        write!(out, "> ")?;
        out.flush()?;
    }

    for line in input.lines() {
        let line = line.context("Failed to read input")?;
        if !line.trim().is_empty() {
            match parse(&line) {
                Ok(ReplCommand::Quit) => break,
                Ok(command) => execute(session, command, out)?,
                Err(message) => fail(out, message)?,
            }
        }

        if prompt {
            write!(out, "> ")?;
            out.flush()?;
        }
    }
    Ok(())
}

fn execute(session: &mut LedgerSession, command: ReplCommand, out: &mut impl Write) -> Result<()> {
    match command {
        ReplCommand::Direct(value) => match session.submit_direct(&value) {
            Ok(()) => ok(out, format!("added to block {}", session.chain_len() - 1))?,
            Err(e) => fail(out, e)?,
        },
        ReplCommand::Pooled(value) => match session.submit_pooled(&value) {
            Ok(true) => ok(
                out,
                format!("pool flushed into block {}", session.chain_len() - 1),
            )?,
            Ok(false) => ok(
                out,
                format!("pooled ({}/{})", session.pool_size(), session.block_threshold()),
            )?,
            Err(e) => fail(out, e)?,
        },
        ReplCommand::Mine(id) => match session.mine_block(id) {
            Ok(()) => ok(out, format!("block {id} mined"))?,
            Err(e) => fail(out, e)?,
        },
        ReplCommand::Validate => match session.validate() {
            Ok(()) => ok(out, "chain is valid")?,
            Err(reason) => fail(out, reason)?,
        },
        ReplCommand::Undo => match session.undo() {
            Ok(()) => ok(out, "restored previous state")?,
            Err(e) => fail(out, e)?,
        },
        ReplCommand::Reset => {
            session.reset().context("Failed to reset ledger")?;
            ok(out, "ledger reset")?;
        }
        ReplCommand::Blocks => print_blocks(out, &session.block_rows())?,
        ReplCommand::Transactions => print_transactions(out, &session.transaction_rows())?,
        ReplCommand::Json => writeln!(out, "{}", session.export_json()?)?,
        ReplCommand::Help => writeln!(out, "{HELP}")?,
        ReplCommand::Quit => {}
    }
    Ok(())
}
