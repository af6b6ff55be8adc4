use std::path::Path;

use crate::commands::common::{load_ledger, require_text, today};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{BudgetDeletedData, BudgetListData, BudgetRow, BudgetSavedData};
use crate::engine::date::{format_month_key, parse_month_arg};
use crate::engine::types::BudgetLimit;
use crate::store::budgets::{delete_budget, list_budgets, upsert_budget};
use crate::{CoachError, CoachResult};

#[derive(Debug, Default)]
pub struct BudgetSetOptions<'a> {
    pub category: String,
    pub limit: f64,
    /// `YYYY-MM`; defaults to the current month.
    pub month: Option<String>,
    pub home_override: Option<&'a Path>,
}

#[derive(Debug, Default)]
pub struct BudgetListOptions<'a> {
    pub month: Option<String>,
    pub home_override: Option<&'a Path>,
}

#[derive(Debug, Default)]
pub struct BudgetDeleteOptions<'a> {
    pub category: String,
    pub month: Option<String>,
    pub home_override: Option<&'a Path>,
}

pub fn set(options: BudgetSetOptions<'_>) -> CoachResult<SuccessEnvelope> {
    let command = "budget set";
    let category_id = require_text(&options.category, "category", command)?;
    if !options.limit.is_finite() || options.limit < 0.0 {
        return Err(CoachError::invalid_argument_for_command(
            "`limit` must be zero or a positive amount.",
            Some(command),
        ));
    }
    let month = resolve_month(options.month.as_deref(), command)?;
    let budget = BudgetLimit {
        category_id,
        limit: crate::engine::round_to(options.limit, 2),
    };

    let ledger = load_ledger(options.home_override)?;
    let connection = ledger.connect()?;
    upsert_budget(&connection, &ledger.db_path, &month, &budget)?;

    success(
        command,
        BudgetSavedData {
            budget: BudgetRow::from_limit(&budget, &month),
        },
    )
}

pub fn list(options: BudgetListOptions<'_>) -> CoachResult<SuccessEnvelope> {
    let command = "budget list";
    let month = resolve_month(options.month.as_deref(), command)?;
    let ledger = load_ledger(options.home_override)?;
    let connection = ledger.connect()?;
    let budgets = list_budgets(&connection, &ledger.db_path, &month)?;

    let data = BudgetListData {
        total_limit: budgets.iter().map(|budget| budget.limit).sum(),
        rows: budgets
            .iter()
            .map(|budget| BudgetRow::from_limit(budget, &month))
            .collect(),
        month,
    };
    success(command, data)
}

pub fn delete(options: BudgetDeleteOptions<'_>) -> CoachResult<SuccessEnvelope> {
    let command = "budget delete";
    let category_id = require_text(&options.category, "category", command)?;
    let month = resolve_month(options.month.as_deref(), command)?;

    let ledger = load_ledger(options.home_override)?;
    let connection = ledger.connect()?;
    if !delete_budget(&connection, &ledger.db_path, &category_id, &month)? {
        return Err(CoachError::budget_not_found(&category_id, &month));
    }

    success(
        command,
        BudgetDeletedData {
            category_id,
            month,
            deleted: true,
        },
    )
}

pub(crate) fn resolve_month(value: Option<&str>, command: &str) -> CoachResult<String> {
    match value {
        Some(raw) => parse_month_arg(raw.trim(), command),
        None => Ok(format_month_key(&today())),
    }
}
