use std::path::Path;

use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::{info, warn};
use ulid::Ulid;

use crate::CoachResult;
use crate::engine::date::{format_iso_date, parse_transaction_date};
use crate::engine::types::Transaction;
use crate::store::connection::{map_sqlite_error, now_timestamp};

const SELECT_COLUMNS: &str = "SELECT
        txn_id,
        posted_at,
        merchant_raw,
        merchant_key,
        category_id,
        amount,
        is_subscription
     FROM transactions";

/// A transaction ready to be written; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub posted_at: NaiveDate,
    pub merchant_raw: String,
    pub merchant_key: String,
    pub category_id: String,
    pub amount: f64,
    pub is_subscription: bool,
}

/// Re-derived fields written back when a merchant is edited.
#[derive(Debug, Clone, PartialEq)]
pub struct MerchantEdit<'a> {
    pub merchant_raw: &'a str,
    pub merchant_key: &'a str,
    pub category_id: &'a str,
    pub is_subscription: bool,
}

type RawTransactionRow = (String, String, String, String, String, f64, bool);

pub fn insert_transaction(
    connection: &Connection,
    db_path: &Path,
    row: &NewTransaction,
) -> CoachResult<Transaction> {
    let txn_id = format!("txn_{}", Ulid::new());
    connection
        .execute(
            "INSERT INTO transactions (
                txn_id,
                posted_at,
                merchant_raw,
                merchant_key,
                category_id,
                amount,
                is_subscription,
                created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                &txn_id,
                format_iso_date(&row.posted_at),
                &row.merchant_raw,
                &row.merchant_key,
                &row.category_id,
                row.amount,
                row.is_subscription,
                now_timestamp()
            ],
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    Ok(Transaction {
        id: txn_id,
        posted_at: row.posted_at,
        merchant_raw: row.merchant_raw.clone(),
        merchant_key: row.merchant_key.clone(),
        category_id: row.category_id.clone(),
        amount: row.amount,
        is_subscription: row.is_subscription,
    })
}

/// Returns `false` when no transaction has this id.
pub fn update_merchant(
    connection: &Connection,
    db_path: &Path,
    txn_id: &str,
    edit: &MerchantEdit<'_>,
) -> CoachResult<bool> {
    let changed = connection
        .execute(
            "UPDATE transactions
             SET merchant_raw = ?2,
                 merchant_key = ?3,
                 category_id = ?4,
                 is_subscription = ?5
             WHERE txn_id = ?1",
            params![
                txn_id,
                edit.merchant_raw,
                edit.merchant_key,
                edit.category_id,
                edit.is_subscription
            ],
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    if changed > 0 {
        info!(txn_id, merchant_key = edit.merchant_key, "transaction merchant updated");
    }
    Ok(changed > 0)
}

/// Applies a rule to every stored transaction of one merchant.
pub fn recategorize_merchant(
    connection: &Connection,
    db_path: &Path,
    merchant_key: &str,
    category_id: &str,
    is_subscription: bool,
) -> CoachResult<usize> {
    let changed = connection
        .execute(
            "UPDATE transactions
             SET category_id = ?2,
                 is_subscription = ?3
             WHERE merchant_key = ?1",
            params![merchant_key, category_id, is_subscription],
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    info!(merchant_key, category_id, changed, "transactions recategorized");
    Ok(changed)
}

/// Returns `false` when no transaction has this id.
pub fn delete_transaction(connection: &Connection, db_path: &Path, txn_id: &str) -> CoachResult<bool> {
    let changed = connection
        .execute("DELETE FROM transactions WHERE txn_id = ?1", [txn_id])
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    if changed > 0 {
        info!(txn_id, "transaction deleted");
    }
    Ok(changed > 0)
}

pub fn get_transaction(
    connection: &Connection,
    db_path: &Path,
    txn_id: &str,
) -> CoachResult<Option<Transaction>> {
    let sql = format!("{SELECT_COLUMNS} WHERE txn_id = ?1 LIMIT 1");
    let raw = connection
        .query_row(&sql, [txn_id], read_raw_row)
        .optional()
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    Ok(raw.and_then(into_transaction))
}

/// Newest first. `limit` of `None` returns everything.
pub fn list_transactions(
    connection: &Connection,
    db_path: &Path,
    limit: Option<usize>,
) -> CoachResult<Vec<Transaction>> {
    let sql = format!(
        "{SELECT_COLUMNS}
         ORDER BY posted_at DESC, created_at DESC, txn_id DESC
         LIMIT ?1"
    );
    let limit_value = limit
        .and_then(|value| i64::try_from(value).ok())
        .unwrap_or(-1);
    query_transactions(connection, db_path, &sql, params![limit_value])
}

/// Inclusive on both ends, oldest first.
pub fn list_transactions_between(
    connection: &Connection,
    db_path: &Path,
    from: NaiveDate,
    to: NaiveDate,
) -> CoachResult<Vec<Transaction>> {
    let sql = format!(
        "{SELECT_COLUMNS}
         WHERE posted_at >= ?1 AND posted_at <= ?2
         ORDER BY posted_at ASC, txn_id ASC"
    );
    query_transactions(
        connection,
        db_path,
        &sql,
        params![format_iso_date(&from), format_iso_date(&to)],
    )
}

fn query_transactions(
    connection: &Connection,
    db_path: &Path,
    sql: &str,
    parameters: &[&dyn rusqlite::ToSql],
) -> CoachResult<Vec<Transaction>> {
    let mut statement = connection
        .prepare(sql)
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    let rows_iter = statement
        .query_map(parameters, read_raw_row)
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let mut rows = Vec::new();
    for row in rows_iter {
        let raw = row.map_err(|error| map_sqlite_error(db_path, &error))?;
        if let Some(transaction) = into_transaction(raw) {
            rows.push(transaction);
        }
    }
    Ok(rows)
}

fn read_raw_row(row: &Row<'_>) -> rusqlite::Result<RawTransactionRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn into_transaction(raw: RawTransactionRow) -> Option<Transaction> {
    let (id, posted_at, merchant_raw, merchant_key, category_id, amount, is_subscription) = raw;
    let Some(date) = parse_transaction_date(&posted_at) else {
        warn!(txn_id = %id, posted_at = %posted_at, "skipping stored row with unreadable date");
        return None;
    };
    Some(Transaction {
        id,
        posted_at: date,
        merchant_raw,
        merchant_key,
        category_id,
        amount,
        is_subscription,
    })
}
