use std::path::Path;

use crate::CoachResult;
use crate::commands::budgets::resolve_month;
use crate::commands::common::load_ledger;
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::SummaryData;
use crate::engine::date::{MonthWindow, parse_month_start};
use crate::engine::insights::spend_by_category;
use crate::engine::round_to;
use crate::store::budgets::list_budgets;
use crate::store::subscriptions::list_subscriptions;
use crate::store::transactions::list_transactions_between;

#[derive(Debug, Default)]
pub struct SummaryRunOptions<'a> {
    /// `YYYY-MM`; defaults to the current month.
    pub month: Option<String>,
    pub home_override: Option<&'a Path>,
}

/// Whole-month totals: outflows posted in the month, the sum of its budgets,
/// and how many subscriptions are active today.
pub fn run(options: SummaryRunOptions<'_>) -> CoachResult<SuccessEnvelope> {
    let command = "summary";
    let month = resolve_month(options.month.as_deref(), command)?;
    let window = MonthWindow::containing(parse_month_start(&month, command)?);

    let ledger = load_ledger(options.home_override)?;
    let connection = ledger.connect()?;
    let transactions =
        list_transactions_between(&connection, &ledger.db_path, window.start, window.end)?;
    let budgets = list_budgets(&connection, &ledger.db_path, &month)?;
    let subscriptions = list_subscriptions(&connection, &ledger.db_path)?;

    let spent = round_to(spend_by_category(&transactions).values().sum(), 2);
    let planned = round_to(budgets.iter().map(|budget| budget.limit).sum(), 2);
    let active_subscriptions = subscriptions
        .iter()
        .filter(|subscription| subscription.active)
        .count() as i64;

    success(
        command,
        SummaryData {
            month,
            spent,
            planned,
            remaining: round_to(planned - spent, 2),
            active_subscriptions,
        },
    )
}
