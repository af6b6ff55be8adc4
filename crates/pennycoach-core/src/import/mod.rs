//! CSV import: bank export in, categorized ledger rows out.
//!
//! Rows that cannot be mapped are reported and skipped; they never abort the
//! rest of the file.

pub(crate) mod input;
pub mod mapping;
pub mod parse;

use chrono::NaiveDate;
use rusqlite::TransactionBehavior;
use tracing::{info, warn};

use crate::contracts::types::{ImportIssue, ImportSummary, TransactionRow};
use crate::engine::normalize::normalize_merchant;
use crate::engine::rules::{RuleBook, apply_rule};
use crate::engine::types::Transaction;
use crate::store::connection::map_sqlite_error;
use crate::store::rules::load_rule_book;
use crate::store::setup::LedgerContext;
use crate::store::transactions::{NewTransaction, insert_transaction};
use crate::{CoachError, CoachResult};

pub use mapping::{AmountSign, MappedRow, map_row};
pub use parse::{RawRow, parse_csv};

const PREVIEW_LIMIT: usize = 10;

#[derive(Debug, Clone)]
pub(crate) struct ImportRequest {
    pub path: String,
    pub dry_run: bool,
    pub sign: AmountSign,
    pub today: NaiveDate,
    pub stdin_override: Option<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct ImportExecutionResult {
    pub dry_run: bool,
    pub source_kind: &'static str,
    pub source_ref: Option<String>,
    pub summary: ImportSummary,
    pub issues: Vec<ImportIssue>,
    pub preview: Vec<TransactionRow>,
}

pub(crate) fn execute(
    context: &LedgerContext,
    request: ImportRequest,
) -> CoachResult<ImportExecutionResult> {
    let resolved_source = input::resolve_source(&request.path, request.stdin_override)?;
    let raw_rows = parse_csv(&resolved_source.content)?;

    let mut connection = context.connect()?;
    let rule_book = load_rule_book(&connection, &context.db_path)?;

    let mut summary = ImportSummary {
        rows_read: raw_rows.len() as i64,
        ..ImportSummary::default()
    };
    let mut issues = Vec::new();
    let mut candidates = Vec::new();
    for raw_row in &raw_rows {
        match map_row(raw_row, request.today, request.sign) {
            Ok(mapped) => {
                if mapped.date_defaulted {
                    summary.defaulted_dates += 1;
                }
                let (candidate, by_rule) =
                    categorize(mapped, &rule_book, &context.settings.fallback_category);
                if by_rule {
                    summary.categorized_by_rule += 1;
                }
                candidates.push(candidate);
            }
            Err(malformed) => {
                warn!(row = raw_row.row, reason = %malformed, "skipping malformed import row");
                issues.push(ImportIssue {
                    row: raw_row.row,
                    code: malformed.code().to_string(),
                    message: malformed.to_string(),
                });
            }
        }
    }
    summary.skipped = issues.len() as i64;

    let preview = if request.dry_run {
        candidates
            .iter()
            .take(PREVIEW_LIMIT)
            .map(|candidate| TransactionRow::from(&preview_transaction(candidate)))
            .collect()
    } else {
        let transaction = connection
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|error| map_sqlite_error(&context.db_path, &error))?;
        let mut written = Vec::with_capacity(candidates.len());
        for candidate in &candidates {
            written.push(insert_transaction(&transaction, &context.db_path, candidate)?);
        }
        transaction
            .commit()
            .map_err(|error| map_sqlite_error(&context.db_path, &error))?;
        summary.inserted = written.len() as i64;
        info!(
            inserted = summary.inserted,
            skipped = summary.skipped,
            source = resolved_source.source_kind.as_str(),
            "import committed"
        );
        written.iter().take(PREVIEW_LIMIT).map(TransactionRow::from).collect()
    };

    Ok(ImportExecutionResult {
        dry_run: request.dry_run,
        source_kind: resolved_source.source_kind.as_str(),
        source_ref: resolved_source.source_ref,
        summary,
        issues,
        preview,
    })
}

/// Rule first; otherwise the file's own category, then the configured bucket.
fn categorize(
    mapped: MappedRow,
    rule_book: &RuleBook,
    fallback_category: &str,
) -> (NewTransaction, bool) {
    let merchant_key = normalize_merchant(&mapped.merchant_raw);
    let by_rule = rule_book.get(&merchant_key).is_some();
    let fallback = mapped.category.as_deref().unwrap_or(fallback_category);
    let outcome = apply_rule(&merchant_key, rule_book.as_map(), fallback);

    (
        NewTransaction {
            posted_at: mapped.posted_at,
            merchant_raw: mapped.merchant_raw,
            merchant_key,
            category_id: outcome.category_id,
            amount: mapped.amount,
            is_subscription: outcome.is_subscription,
        },
        by_rule,
    )
}

fn preview_transaction(candidate: &NewTransaction) -> Transaction {
    Transaction {
        id: String::new(),
        posted_at: candidate.posted_at,
        merchant_raw: candidate.merchant_raw.clone(),
        merchant_key: candidate.merchant_key.clone(),
        category_id: candidate.category_id.clone(),
        amount: candidate.amount,
        is_subscription: candidate.is_subscription,
    }
}

pub(crate) fn invalid_input_error(message: &str) -> CoachError {
    CoachError::invalid_input(message)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::engine::rules::RuleBook;
    use crate::engine::types::Rule;
    use crate::import::mapping::MappedRow;

    use super::categorize;

    fn mapped(merchant: &str, category: Option<&str>) -> MappedRow {
        MappedRow {
            posted_at: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap_or(NaiveDate::MIN),
            date_defaulted: false,
            merchant_raw: merchant.to_string(),
            amount: 15.49,
            category: category.map(str::to_string),
        }
    }

    fn book() -> RuleBook {
        [Rule {
            merchant_key: "Netflix".to_string(),
            category_id: "Subscriptions".to_string(),
            is_subscription: true,
        }]
        .into_iter()
        .collect()
    }

    #[test]
    fn rule_beats_file_category() {
        let (row, by_rule) = categorize(mapped("NETFLIX", Some("Entertainment")), &book(), "Misc");
        assert!(by_rule);
        assert_eq!(row.merchant_key, "Netflix");
        assert_eq!(row.category_id, "Subscriptions");
        assert!(row.is_subscription);
    }

    #[test]
    fn file_category_beats_configured_fallback() {
        let (row, by_rule) = categorize(mapped("Costco", Some("Groceries")), &book(), "Misc");
        assert!(!by_rule);
        assert_eq!(row.category_id, "Groceries");
        assert!(!row.is_subscription);
    }

    #[test]
    fn configured_fallback_applies_last() {
        let (row, _) = categorize(mapped("Corner Shop", None), &book(), "Misc");
        assert_eq!(row.category_id, "Misc");
    }
}
