//! Text rendering of grouped transactions.
//!
//! Dates are listed most recent first. Under each date every merchant gets a
//! heading followed by an Arrow pretty-printed table of its line items.

use std::fmt::Write;

use arrow::util::pretty::pretty_format_batches;
use receiptflow_core::{GroupedTransactions, ItemRecord, items};

const NO_ITEMS: &str = "No items found";
const NO_STORE_NAME: &str = "(no store name)";
const NO_TRANSACTIONS: &str = "No transactions found";

// ── Public API ──

/// Print grouped transactions as tables, most recent date first.
pub fn print_transactions(grouped: &GroupedTransactions) -> anyhow::Result<()> {
    print!("{}", render_transactions(grouped)?);
    Ok(())
}

/// Print grouped transactions as pretty JSON.
pub fn print_json(grouped: &GroupedTransactions) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(grouped)?);
    Ok(())
}

pub fn render_transactions(grouped: &GroupedTransactions) -> anyhow::Result<String> {
    let mut out = String::new();
    if grouped.is_empty() {
        writeln!(out, "{NO_TRANSACTIONS}")?;
        return Ok(out);
    }

    for (date, merchants) in grouped.dates_descending() {
        writeln!(out, "=== {date} ===")?;
        for (merchant, records) in merchants {
            writeln!(out, "{}", merchant.as_deref().unwrap_or(NO_STORE_NAME))?;
            render_items(&mut out, records)?;
        }
        writeln!(out)?;
    }
    Ok(out)
}

// ── Item tables ──

fn render_items(out: &mut String, records: &[ItemRecord]) -> anyhow::Result<()> {
    if records.is_empty() {
        writeln!(out, "  {NO_ITEMS}")?;
        return Ok(());
    }
    let batch = items::items_to_batch(records)?;
    let table = pretty_format_batches(&[batch])?;
    for line in table.to_string().lines() {
        writeln!(out, "  {line}")?;
    }
    Ok(())
}
