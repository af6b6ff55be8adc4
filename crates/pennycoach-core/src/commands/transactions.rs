use std::path::Path;

use crate::commands::common::{load_ledger, require_finite_amount, require_text};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{DeletedData, TransactionData, TransactionListData, TransactionRow};
use crate::engine::date::parse_iso_date_arg;
use crate::engine::normalize::normalize_merchant;
use crate::store::rules::load_rule_book;
use crate::store::transactions::{
    MerchantEdit, NewTransaction, delete_transaction, get_transaction, insert_transaction,
    list_transactions, update_merchant,
};
use crate::{CoachError, CoachResult};

const DEFAULT_LIST_LIMIT: usize = 50;

#[derive(Debug, Default)]
pub struct TransactionAddOptions<'a> {
    pub date: String,
    pub merchant: String,
    /// Ledger convention: positive = spend.
    pub amount: f64,
    pub category: Option<String>,
    pub home_override: Option<&'a Path>,
}

#[derive(Debug, Default)]
pub struct TransactionEditOptions<'a> {
    pub id: String,
    pub merchant: String,
    pub home_override: Option<&'a Path>,
}

#[derive(Debug, Default)]
pub struct TransactionDeleteOptions<'a> {
    pub id: String,
    pub home_override: Option<&'a Path>,
}

#[derive(Debug, Default)]
pub struct TransactionListOptions<'a> {
    pub limit: Option<usize>,
    pub home_override: Option<&'a Path>,
}

/// An explicit `--category` wins; otherwise a saved rule, then the fallback
/// bucket. The subscription flag always comes from the rule.
pub fn add(options: TransactionAddOptions<'_>) -> CoachResult<SuccessEnvelope> {
    let command = "tx add";
    let posted_at = parse_iso_date_arg(options.date.trim(), "--date", command)?;
    let merchant_raw = require_text(&options.merchant, "--merchant", command)?;
    let amount = require_finite_amount(options.amount, "--amount", command)?;
    let explicit_category = options
        .category
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty());

    let ledger = load_ledger(options.home_override)?;
    let connection = ledger.connect()?;
    let rule_book = load_rule_book(&connection, &ledger.db_path)?;

    let merchant_key = normalize_merchant(&merchant_raw);
    let outcome = rule_book.categorize(&merchant_raw, &ledger.settings.fallback_category);
    let category_id = explicit_category
        .map(str::to_string)
        .unwrap_or(outcome.category_id);

    let stored = insert_transaction(
        &connection,
        &ledger.db_path,
        &NewTransaction {
            posted_at,
            merchant_raw,
            merchant_key,
            category_id,
            amount,
            is_subscription: outcome.is_subscription,
        },
    )?;

    success(
        command,
        TransactionData {
            transaction: TransactionRow::from(&stored),
        },
    )
}

/// Re-derives the merchant key and re-applies rules. Without a rule for the
/// new merchant, the existing category is kept and the subscription flag is
/// cleared.
pub fn edit_merchant(options: TransactionEditOptions<'_>) -> CoachResult<SuccessEnvelope> {
    let command = "tx edit";
    let merchant_raw = require_text(&options.merchant, "--merchant", command)?;
    let txn_id = options.id.trim();

    let ledger = load_ledger(options.home_override)?;
    let connection = ledger.connect()?;
    let Some(existing) = get_transaction(&connection, &ledger.db_path, txn_id)? else {
        return Err(CoachError::not_found("transaction", txn_id, "tx list"));
    };

    let rule_book = load_rule_book(&connection, &ledger.db_path)?;
    let merchant_key = normalize_merchant(&merchant_raw);
    let (category_id, is_subscription) = match rule_book.get(&merchant_key) {
        Some(rule) => (rule.category_id.clone(), rule.is_subscription),
        None => (existing.category_id.clone(), false),
    };

    let updated = update_merchant(
        &connection,
        &ledger.db_path,
        txn_id,
        &MerchantEdit {
            merchant_raw: &merchant_raw,
            merchant_key: &merchant_key,
            category_id: &category_id,
            is_subscription,
        },
    )?;
    if !updated {
        return Err(CoachError::not_found("transaction", txn_id, "tx list"));
    }

    let Some(stored) = get_transaction(&connection, &ledger.db_path, txn_id)? else {
        return Err(CoachError::not_found("transaction", txn_id, "tx list"));
    };
    success(
        command,
        TransactionData {
            transaction: TransactionRow::from(&stored),
        },
    )
}

pub fn delete(options: TransactionDeleteOptions<'_>) -> CoachResult<SuccessEnvelope> {
    let txn_id = options.id.trim();
    let ledger = load_ledger(options.home_override)?;
    let connection = ledger.connect()?;
    if !delete_transaction(&connection, &ledger.db_path, txn_id)? {
        return Err(CoachError::not_found("transaction", txn_id, "tx list"));
    }
    success(
        "tx delete",
        DeletedData {
            id: txn_id.to_string(),
            deleted: true,
        },
    )
}

pub fn list(options: TransactionListOptions<'_>) -> CoachResult<SuccessEnvelope> {
    let ledger = load_ledger(options.home_override)?;
    let connection = ledger.connect()?;
    let limit = options.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    let rows = list_transactions(&connection, &ledger.db_path, Some(limit))?
        .iter()
        .map(TransactionRow::from)
        .collect::<Vec<TransactionRow>>();
    success(
        "tx list",
        TransactionListData {
            total: rows.len() as i64,
            rows,
        },
    )
}
