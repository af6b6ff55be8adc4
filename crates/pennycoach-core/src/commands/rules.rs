use std::path::Path;

use rusqlite::TransactionBehavior;

use crate::CoachResult;
use crate::commands::common::{load_ledger, require_text};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{RuleListData, RuleRow, RuleSavedData};
use crate::engine::normalize::normalize_merchant;
use crate::engine::types::Rule;
use crate::store::connection::map_sqlite_error;
use crate::store::rules::{list_rules, load_rule_book, upsert_rule};
use crate::store::transactions::recategorize_merchant;

#[derive(Debug, Default)]
pub struct RuleSetOptions<'a> {
    pub merchant: String,
    pub category: String,
    pub is_subscription: bool,
    /// Also rewrite the category of transactions already in the ledger.
    pub apply_existing: bool,
    pub home_override: Option<&'a Path>,
}

#[derive(Debug, Default)]
pub struct RuleListOptions<'a> {
    pub home_override: Option<&'a Path>,
}

/// Saves a merchant -> category rule; a second save for the same merchant
/// replaces the first.
pub fn set(options: RuleSetOptions<'_>) -> CoachResult<SuccessEnvelope> {
    let command = "rule set";
    let merchant = require_text(&options.merchant, "merchant", command)?;
    let category_id = require_text(&options.category, "category", command)?;
    let rule = Rule {
        merchant_key: normalize_merchant(&merchant),
        category_id,
        is_subscription: options.is_subscription,
    };

    let ledger = load_ledger(options.home_override)?;
    let mut connection = ledger.connect()?;
    let replaced = load_rule_book(&connection, &ledger.db_path)?
        .get(&rule.merchant_key)
        .is_some();

    let transaction = connection
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|error| map_sqlite_error(&ledger.db_path, &error))?;
    upsert_rule(&transaction, &ledger.db_path, &rule)?;
    let recategorized = if options.apply_existing {
        recategorize_merchant(
            &transaction,
            &ledger.db_path,
            &rule.merchant_key,
            &rule.category_id,
            rule.is_subscription,
        )?
    } else {
        0
    };
    transaction
        .commit()
        .map_err(|error| map_sqlite_error(&ledger.db_path, &error))?;

    success(
        command,
        RuleSavedData {
            rule: RuleRow::from(&rule),
            replaced,
            recategorized: recategorized as i64,
        },
    )
}

pub fn list(options: RuleListOptions<'_>) -> CoachResult<SuccessEnvelope> {
    let ledger = load_ledger(options.home_override)?;
    let connection = ledger.connect()?;
    let rows = list_rules(&connection, &ledger.db_path)?
        .iter()
        .map(RuleRow::from)
        .collect::<Vec<RuleRow>>();
    success("rule list", RuleListData { rows })
}
