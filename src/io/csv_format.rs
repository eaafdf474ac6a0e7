//! CSV format handling for replay scripts, seed balances and balance output
//!
//! This module centralizes all CSV format concerns, providing:
//! - ScriptRecord structure for deserialization of script rows
//! - Conversion from script rows to [`ScriptStep`]s
//! - SeedRecord structure for preloaded ledger balances
//! - Balance output serialization
//!
//! All functions are pure (no file I/O) for easy testing.

use crate::types::{Amount, BalanceSnapshot, CurrencyError, CurrencyId, LifecycleEvent, ScriptStep};
use serde::Deserialize;
use std::io::Write;

/// Script row structure for deserialization
///
/// Matches the script CSV format with columns: op, currency, amount.
/// Currency and amount are optional because reconcile, lifecycle and
/// outage/restore steps don't carry them.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ScriptRecord {
    pub op: String,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
}

/// Seed row structure for preloading ledger balances
///
/// Matches the seed CSV format with columns: currency, balance.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SeedRecord {
    pub currency: String,
    pub balance: Amount,
}

/// Convert a ScriptRecord to a ScriptStep
///
/// Operation names are case-insensitive. Steps that change a balance require
/// both a non-empty currency and an integer amount.
pub fn convert_script_record(record: ScriptRecord) -> Result<ScriptStep, String> {
    let op = record.op.trim().to_lowercase();

    let step = match op.as_str() {
        "increase" => {
            let (currency, amount) = currency_and_amount(&op, &record)?;
            ScriptStep::Increase { currency, amount }
        }
        "decrease" => {
            let (currency, amount) = currency_and_amount(&op, &record)?;
            ScriptStep::Decrease { currency, amount }
        }
        "grant" => {
            let (currency, amount) = currency_and_amount(&op, &record)?;
            ScriptStep::Grant { currency, amount }
        }
        "reconcile" => ScriptStep::Reconcile,
        "pause" => ScriptStep::Lifecycle(LifecycleEvent::Pause),
        "resume" => ScriptStep::Lifecycle(LifecycleEvent::Resume),
        "destroy" => ScriptStep::Lifecycle(LifecycleEvent::Destroy),
        "outage" => ScriptStep::Outage,
        "restore" => ScriptStep::Restore,
        _ => return Err(format!("Invalid operation: '{}'", record.op)),
    };

    Ok(step)
}

fn currency_and_amount(op: &str, record: &ScriptRecord) -> Result<(CurrencyId, Amount), String> {
    let currency = record
        .currency
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| format!("{} requires a currency", op))?;
    let currency = CurrencyId::new(currency).map_err(|e| e.to_string())?;

    let amount = match record.amount.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => raw
            .parse::<Amount>()
            .map_err(|_| format!("Invalid amount '{}' for {}", raw, op))?,
        _ => return Err(format!("{} on '{}' requires an amount", op, currency)),
    };

    Ok((currency, amount))
}

/// Fold seed rows into a balance snapshot
///
/// Later rows for the same currency replace earlier ones.
pub fn seed_snapshot(
    records: impl IntoIterator<Item = SeedRecord>,
) -> Result<BalanceSnapshot, CurrencyError> {
    let mut snapshot = BalanceSnapshot::new();
    for record in records {
        let currency = CurrencyId::new(record.currency.trim())?;
        snapshot.insert(currency.into_inner(), record.balance);
    }
    Ok(snapshot)
}

/// Write cached balances in CSV format
///
/// Writes balances with columns: currency, balance. Rows are sorted by
/// currency name for deterministic output.
pub fn write_balances_csv(
    balances: &BalanceSnapshot,
    output: &mut dyn Write,
) -> Result<(), CurrencyError> {
    let mut writer = csv::Writer::from_writer(output);

    writer.write_record(["currency", "balance"])?;

    let mut sorted: Vec<_> = balances.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    for (currency, balance) in sorted {
        writer.write_record([currency.as_str(), balance.to_string().as_str()])?;
    }

    writer.flush()?;

    Ok(())
}
