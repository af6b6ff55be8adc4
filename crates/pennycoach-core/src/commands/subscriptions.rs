use std::path::Path;

use rusqlite::{Connection, TransactionBehavior};
use tracing::warn;

use crate::commands::common::{load_ledger, require_finite_amount, require_text, resolve_as_of};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{
    DeletedData, SubscriptionData, SubscriptionRow, SubscriptionsData, SyncError, SyncReport,
};
use crate::engine::date::{format_iso_date, lookback_start, parse_iso_date_arg};
use crate::engine::merge::{merge_subscription_view, monthly_total, plan_subscription_upserts};
use crate::engine::normalize::normalize_merchant;
use crate::engine::recurring::detect_recurring;
use crate::engine::round_to;
use crate::engine::types::RecurrenceFinding;
use crate::store::connection::map_sqlite_error;
use crate::store::setup::LedgerContext;
use crate::store::subscriptions::{
    create_subscription, delete_subscription, find_by_merchant_key, get_subscription,
    insert_drafts, list_subscriptions, set_active,
};
use crate::store::transactions::list_transactions_between;
use crate::{CoachError, CoachResult};

#[derive(Debug, Default)]
pub struct SubscriptionsViewOptions<'a> {
    pub as_of: Option<String>,
    /// Persist newly detected subscriptions before building the view.
    pub sync: bool,
    pub home_override: Option<&'a Path>,
}

#[derive(Debug, Default)]
pub struct SubscriptionAddOptions<'a> {
    pub merchant: String,
    pub amount: f64,
    pub last_charge: Option<String>,
    pub home_override: Option<&'a Path>,
}

#[derive(Debug, Default)]
pub struct SubscriptionIdOptions<'a> {
    pub id: String,
    pub home_override: Option<&'a Path>,
}

/// Persisted subscriptions merged with what the current lookback window shows.
///
/// A failed sync does not fail the command: the analysis is still returned
/// with `sync_error` set.
pub fn view(options: SubscriptionsViewOptions<'_>) -> CoachResult<SubscriptionsData> {
    let command = "subs";
    let as_of = resolve_as_of(options.as_of.as_deref(), command)?;
    let ledger = load_ledger(options.home_override)?;
    let mut connection = ledger.connect()?;
    let findings = current_findings(&connection, &ledger, as_of)?;

    let mut sync = None;
    let mut sync_error = None;
    if options.sync {
        match sync_findings(&mut connection, &ledger, &findings) {
            Ok(report) => sync = Some(report),
            Err(error) => {
                warn!(code = %error.code, message = %error.message, "subscription sync failed");
                sync_error = Some(SyncError {
                    code: error.code,
                    message: error.message,
                });
            }
        }
    }

    let subscriptions = list_subscriptions(&connection, &ledger.db_path)?;
    let merged = merge_subscription_view(&subscriptions, &findings);

    Ok(SubscriptionsData {
        as_of: format_iso_date(&as_of),
        monthly_total: round_to(monthly_total(&merged), 2),
        active_count: merged.iter().filter(|row| row.active).count() as i64,
        rows: merged.iter().map(SubscriptionRow::from).collect(),
        sync,
        sync_error,
    })
}

pub fn list(options: SubscriptionsViewOptions<'_>) -> CoachResult<SuccessEnvelope> {
    let command = if options.sync { "subs sync" } else { "subs" };
    success(command, view(options)?)
}

pub fn add(options: SubscriptionAddOptions<'_>) -> CoachResult<SuccessEnvelope> {
    let command = "subs add";
    let merchant = require_text(&options.merchant, "merchant", command)?;
    let amount = require_finite_amount(options.amount, "amount", command)?;
    let last_charge = match options.last_charge.as_deref() {
        Some(raw) => Some(parse_iso_date_arg(raw.trim(), "--last-charge", command)?),
        None => None,
    };
    let merchant_key = normalize_merchant(&merchant);

    let ledger = load_ledger(options.home_override)?;
    let connection = ledger.connect()?;
    if let Some(existing) = find_by_merchant_key(&connection, &ledger.db_path, &merchant_key)? {
        return Err(CoachError::invalid_argument_with_recovery(
            &format!("`{merchant_key}` is already tracked as subscription `{}`.", existing.id),
            vec![
                "Run `pennycoach subs` to review tracked subscriptions.".to_string(),
                format!("Use `pennycoach subs resume {}` if it is paused.", existing.id),
            ],
        ));
    }

    let stored = create_subscription(
        &connection,
        &ledger.db_path,
        &merchant,
        &merchant_key,
        amount,
        last_charge,
    )?;
    success(
        command,
        SubscriptionData {
            subscription: SubscriptionRow::from(&stored),
        },
    )
}

pub fn pause(options: SubscriptionIdOptions<'_>) -> CoachResult<SuccessEnvelope> {
    change_active(options, false, "subs pause")
}

pub fn resume(options: SubscriptionIdOptions<'_>) -> CoachResult<SuccessEnvelope> {
    change_active(options, true, "subs resume")
}

pub fn delete(options: SubscriptionIdOptions<'_>) -> CoachResult<SuccessEnvelope> {
    let subscription_id = options.id.trim();
    let ledger = load_ledger(options.home_override)?;
    let connection = ledger.connect()?;
    if !delete_subscription(&connection, &ledger.db_path, subscription_id)? {
        return Err(CoachError::not_found("subscription", subscription_id, "subs"));
    }
    success(
        "subs delete",
        DeletedData {
            id: subscription_id.to_string(),
            deleted: true,
        },
    )
}

fn change_active(
    options: SubscriptionIdOptions<'_>,
    active: bool,
    command: &str,
) -> CoachResult<SuccessEnvelope> {
    let subscription_id = options.id.trim();
    let ledger = load_ledger(options.home_override)?;
    let connection = ledger.connect()?;
    if !set_active(&connection, &ledger.db_path, subscription_id, active)? {
        return Err(CoachError::not_found("subscription", subscription_id, "subs"));
    }
    let Some(stored) = get_subscription(&connection, &ledger.db_path, subscription_id)? else {
        return Err(CoachError::not_found("subscription", subscription_id, "subs"));
    };
    success(
        command,
        SubscriptionData {
            subscription: SubscriptionRow::from(&stored),
        },
    )
}

fn current_findings(
    connection: &Connection,
    ledger: &LedgerContext,
    as_of: chrono::NaiveDate,
) -> CoachResult<Vec<RecurrenceFinding>> {
    let lookback_days = ledger.settings.lookback_days;
    let window_start = lookback_start(as_of, lookback_days);
    let transactions = list_transactions_between(connection, &ledger.db_path, window_start, as_of)?;
    Ok(detect_recurring(&transactions, as_of, lookback_days))
}

fn sync_findings(
    connection: &mut Connection,
    ledger: &LedgerContext,
    findings: &[RecurrenceFinding],
) -> CoachResult<SyncReport> {
    let existing = list_subscriptions(connection, &ledger.db_path)?;
    let drafts = plan_subscription_upserts(findings, &existing);

    let transaction = connection
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|error| map_sqlite_error(&ledger.db_path, &error))?;
    let inserted = insert_drafts(&transaction, &ledger.db_path, &drafts)?;
    transaction
        .commit()
        .map_err(|error| map_sqlite_error(&ledger.db_path, &error))?;

    Ok(SyncReport {
        findings: findings.len() as i64,
        proposed: drafts.len() as i64,
        inserted: inserted as i64,
    })
}
