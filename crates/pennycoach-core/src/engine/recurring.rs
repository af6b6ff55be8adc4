use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::engine::date::lookback_start;
use crate::engine::normalize::normalize_merchant;
use crate::engine::periodicity::is_monthly_pattern;
use crate::engine::policy::DISPLAY_FINDINGS_CAP;
use crate::engine::round_to;
use crate::engine::types::{RecurrenceFinding, Transaction};

#[derive(Debug, Clone)]
struct MerchantGroup {
    dates: Vec<NaiveDate>,
    amounts: Vec<f64>,
}

/// Finds monthly-looking outflows inside the lookback window ending at `as_of`
/// (inclusive). Rows dated after `as_of` are ignored.
///
/// Output is not deduplicated against persisted subscriptions; see
/// [`crate::engine::merge`] for that step.
pub fn detect_recurring(
    transactions: &[Transaction],
    as_of: NaiveDate,
    lookback_days: i64,
) -> Vec<RecurrenceFinding> {
    let window_start = lookback_start(as_of, lookback_days);

    let mut groups: BTreeMap<String, MerchantGroup> = BTreeMap::new();
    for transaction in transactions {
        if transaction.posted_at < window_start
            || transaction.posted_at > as_of
            || !transaction.is_outflow()
        {
            continue;
        }
        let entry = groups
            .entry(normalize_merchant(&transaction.merchant_raw))
            .or_insert_with(|| MerchantGroup {
                dates: Vec::new(),
                amounts: Vec::new(),
            });
        entry.dates.push(transaction.posted_at);
        entry.amounts.push(transaction.amount);
    }

    let mut findings = Vec::new();
    for (merchant_key, group) in &groups {
        if group.dates.len() < 2 || !is_monthly_pattern(&group.dates) {
            continue;
        }
        let Some(last_charge_date) = group.dates.iter().max().copied() else {
            continue;
        };

        let total = group.amounts.iter().sum::<f64>();
        findings.push(RecurrenceFinding {
            merchant_key: merchant_key.clone(),
            occurrence_count: i64::try_from(group.dates.len()).unwrap_or(i64::MAX),
            average_amount: round_to(total / group.amounts.len() as f64, 2),
            last_charge_date,
            is_monthly: true,
        });
    }

    findings.sort_by(compare_findings);
    debug!(
        groups = groups.len(),
        findings = findings.len(),
        %window_start,
        "recurrence pass complete"
    );
    findings
}

/// Presentation cap applied after ordering.
pub fn display_findings(findings: &[RecurrenceFinding]) -> Vec<RecurrenceFinding> {
    display_findings_capped(findings, DISPLAY_FINDINGS_CAP)
}

pub fn display_findings_capped(findings: &[RecurrenceFinding], cap: usize) -> Vec<RecurrenceFinding> {
    findings.iter().take(cap).cloned().collect()
}

fn compare_findings(left: &RecurrenceFinding, right: &RecurrenceFinding) -> Ordering {
    right
        .last_charge_date
        .cmp(&left.last_charge_date)
        .then_with(|| right.average_amount.total_cmp(&left.average_amount))
        .then_with(|| left.merchant_key.cmp(&right.merchant_key))
}
