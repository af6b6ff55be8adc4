#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use pennycoach_core::commands::import::{self, ImportRunOptions};
use pennycoach_core::commands::transactions::{self, TransactionAddOptions};
use pennycoach_core::import::AmountSign;
use pennycoach_core::{CoachResult, SuccessEnvelope};
use serde_json::Value;
use tempfile::{Builder, TempDir};

/// A fixed "today" so defaulted import dates are deterministic.
pub const IMPORT_TODAY: &str = "2026-03-20";

pub fn temp_home_in_tmp(prefix: &str) -> std::io::Result<(TempDir, PathBuf)> {
    let dir = Builder::new().prefix(prefix).tempdir_in("/tmp")?;
    let home = dir.path().join("ledger-home");
    fs::create_dir_all(&home)?;
    Ok((dir, home))
}

pub fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap_or(NaiveDate::MIN)
}

pub fn write_csv(home: &Path, name: &str, body: &str) -> PathBuf {
    let path = home.join(name);
    let written = fs::write(&path, body);
    assert!(written.is_ok());
    path
}

pub fn run_import(
    home: &Path,
    csv_body: &str,
    dry_run: bool,
    sign: AmountSign,
) -> CoachResult<SuccessEnvelope> {
    let path = write_csv(home, "export.csv", csv_body);
    import::run_with_options(ImportRunOptions {
        path: path.display().to_string(),
        dry_run,
        sign,
        today: Some(date(IMPORT_TODAY)),
        home_override: Some(home),
        stdin_override: None,
    })
}

/// Imports a bank-convention CSV and returns the success payload.
pub fn import_csv(home: &Path, csv_body: &str) -> Value {
    payload(run_import(home, csv_body, false, AmountSign::Bank))
}

pub fn add_transaction(
    home: &Path,
    posted_at: &str,
    merchant: &str,
    amount: f64,
    category: Option<&str>,
) -> Value {
    payload(transactions::add(TransactionAddOptions {
        date: posted_at.to_string(),
        merchant: merchant.to_string(),
        amount,
        category: category.map(str::to_string),
        home_override: Some(home),
    }))
}

/// Unwraps a successful command result into its JSON `data`, failing the test otherwise.
pub fn payload(result: CoachResult<SuccessEnvelope>) -> Value {
    assert!(result.is_ok(), "command failed: {result:?}");
    if let Ok(success) = result {
        return success.data;
    }
    Value::Null
}

pub fn rows(data: &Value) -> Vec<Value> {
    data["rows"].as_array().cloned().unwrap_or_default()
}

pub fn monthly_charges(merchant: &str, amount: f64, dates: &[&str]) -> String {
    dates
        .iter()
        .map(|posted_at| format!("{posted_at},{merchant},-{amount:.2}\n"))
        .collect()
}
