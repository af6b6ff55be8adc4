use std::path::Path;

use crate::CoachResult;
use crate::commands::common::{load_ledger, resolve_as_of};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{InsightRow, InsightsData};
use crate::engine::date::{MonthWindow, format_iso_date};
use crate::engine::insights::{PacingInput, build_insights_with_policy, spend_by_category};
use crate::engine::policy::{ENGINE_POLICY_VERSION, PACING_POLICY_V1, PacingPolicy};
use crate::engine::round_to;
use crate::store::budgets::list_budgets;
use crate::store::transactions::list_transactions_between;

#[derive(Debug, Default)]
pub struct InsightsRunOptions<'a> {
    pub as_of: Option<String>,
    pub home_override: Option<&'a Path>,
}

pub fn run(as_of: Option<&str>) -> CoachResult<SuccessEnvelope> {
    run_with_options(InsightsRunOptions {
        as_of: as_of.map(std::string::ToString::to_string),
        home_override: None,
    })
}

/// Month-to-date pacing against the budgets saved for the month of `as_of`.
#[doc(hidden)]
pub fn run_with_options(options: InsightsRunOptions<'_>) -> CoachResult<SuccessEnvelope> {
    let command = "insights";
    let as_of = resolve_as_of(options.as_of.as_deref(), command)?;
    let window = MonthWindow::containing(as_of);

    let ledger = load_ledger(options.home_override)?;
    let connection = ledger.connect()?;
    let month_transactions =
        list_transactions_between(&connection, &ledger.db_path, window.start, as_of)?;
    let budgets = list_budgets(&connection, &ledger.db_path, &window.month_key())?;

    let spend = spend_by_category(&month_transactions);
    let policy = PacingPolicy {
        max_insights: ledger.settings.max_insights,
        ..PACING_POLICY_V1
    };
    let insights = build_insights_with_policy(
        PacingInput {
            spend_by_category: &spend,
            budgets: &budgets,
            month_transactions: &month_transactions,
            day_of_month: window.day_of_month,
            days_in_month: window.days_in_month,
        },
        policy,
    );

    let data = InsightsData {
        policy_version: ENGINE_POLICY_VERSION.to_string(),
        as_of: format_iso_date(&as_of),
        month: window.month_key(),
        day_of_month: window.day_of_month,
        days_in_month: window.days_in_month,
        total_spent: round_to(spend.values().sum(), 2),
        total_budget: round_to(budgets.iter().map(|budget| budget.limit).sum(), 2),
        rows: insights.iter().map(InsightRow::from).collect(),
    };

    success(command, data)
}
