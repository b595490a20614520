//! Block and transaction tables.

use colored::Colorize;
use std::io::{self, Write};
use tinyledger_chain::{BlockRow, TransactionRow};

pub fn print_blocks(out: &mut impl Write, rows: &[BlockRow]) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "Blocks:".bold().cyan())?;
    writeln!(out)?;

    for row in rows {
        writeln!(
            out,
            "  {} {} {} {} {}",
            format!("#{}", row.id).bright_black(),
            row.digest.as_str().bright_yellow(),
            format!("prev {}", row.previous_digest.short()).bright_black(),
            format!("nonce {}", row.nonce).bright_black(),
            format!("({} txs)", row.tx_count).bright_black()
        )?;
    }

    writeln!(out)?;
    Ok(())
}

pub fn print_transactions(out: &mut impl Write, rows: &[TransactionRow]) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "Transactions:".bold().cyan())?;
    writeln!(out)?;

    for row in rows {
        writeln!(
            out,
            "  {} {} {}",
            format!("#{}", row.block_id).bright_black(),
            row.digest.short().bright_yellow(),
            row.payload
        )?;
    }

    writeln!(out)?;
    Ok(())
}
