use std::path::Path;

use crate::commands::common::{load_ledger, resolve_as_of};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{RecurringData, RecurringRow};
use crate::engine::date::{format_iso_date, lookback_start};
use crate::engine::policy::{ENGINE_POLICY_VERSION, MAX_LOOKBACK_DAYS};
use crate::engine::recurring::{detect_recurring, display_findings_capped};
use crate::store::transactions::list_transactions_between;
use crate::{CoachError, CoachResult};

#[derive(Debug, Default)]
pub struct RecurringRunOptions<'a> {
    pub as_of: Option<String>,
    pub lookback_days: Option<i64>,
    pub home_override: Option<&'a Path>,
}

pub fn run(as_of: Option<&str>, lookback_days: Option<i64>) -> CoachResult<SuccessEnvelope> {
    run_with_options(RecurringRunOptions {
        as_of: as_of.map(std::string::ToString::to_string),
        lookback_days,
        home_override: None,
    })
}

#[doc(hidden)]
pub fn run_with_options(options: RecurringRunOptions<'_>) -> CoachResult<SuccessEnvelope> {
    let command = "recurring";
    let as_of = resolve_as_of(options.as_of.as_deref(), command)?;
    if let Some(days) = options.lookback_days
        && !(1..=MAX_LOOKBACK_DAYS).contains(&days)
    {
        return Err(CoachError::invalid_argument_for_command(
            &format!("`--lookback-days` must be between 1 and {MAX_LOOKBACK_DAYS} days."),
            Some(command),
        ));
    }

    let ledger = load_ledger(options.home_override)?;
    let lookback_days = options
        .lookback_days
        .unwrap_or(ledger.settings.lookback_days);
    let window_start = lookback_start(as_of, lookback_days);

    let connection = ledger.connect()?;
    let transactions = list_transactions_between(&connection, &ledger.db_path, window_start, as_of)?;
    let findings = detect_recurring(&transactions, as_of, lookback_days);

    let data = RecurringData {
        policy_version: ENGINE_POLICY_VERSION.to_string(),
        as_of: format_iso_date(&as_of),
        lookback_days,
        window_start: format_iso_date(&window_start),
        total_findings: findings.len() as i64,
        rows: display_findings_capped(&findings, ledger.settings.display_findings)
            .iter()
            .map(RecurringRow::from)
            .collect(),
    };

    success(command, data)
}
