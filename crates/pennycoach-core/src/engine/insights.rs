use std::collections::HashMap;

use tracing::debug;

use crate::engine::normalize::normalize_merchant;
use crate::engine::policy::{PACING_POLICY_V1, PacingPolicy, SAVINGS_HINT_RANGE};
use crate::engine::types::{BudgetLimit, Insight, InsightKind, Transaction};

/// Caller-owned snapshot for one insight pass.
///
/// `budgets` order is the order overspend insights are emitted in.
#[derive(Debug, Clone, Copy)]
pub struct PacingInput<'a> {
    pub spend_by_category: &'a HashMap<String, f64>,
    pub budgets: &'a [BudgetLimit],
    pub month_transactions: &'a [Transaction],
    pub day_of_month: u32,
    pub days_in_month: u32,
}

pub fn build_insights(input: PacingInput<'_>) -> Vec<Insight> {
    build_insights_with_policy(input, PACING_POLICY_V1)
}

pub(crate) fn build_insights_with_policy(
    input: PacingInput<'_>,
    policy: PacingPolicy,
) -> Vec<Insight> {
    let days_in_month = input.days_in_month.max(1);
    let day_of_month = input.day_of_month.clamp(1, days_in_month);
    let pace = f64::from(day_of_month) / f64::from(days_in_month);
    let days_left = f64::from((days_in_month - day_of_month).max(1));

    let mut insights = Vec::new();
    for budget in input.budgets {
        if budget.limit <= 0.0 {
            continue;
        }
        let spent = input
            .spend_by_category
            .get(&budget.category_id)
            .copied()
            .unwrap_or(0.0);
        let expected = budget.limit * pace;
        if spent > expected + policy.overspend_slack {
            let over = spent - expected;
            let daily_cap = ((budget.limit - spent) / days_left).max(0.0);
            insights.push(Insight {
                kind: InsightKind::Overspend,
                title: format!("{} is running ahead of budget", budget.category_id),
                detail: format!(
                    "You're {over:.2} over pace. Keep it under {daily_cap:.2}/day for the rest of the month."
                ),
            });
        }
    }

    let total_spent = input.spend_by_category.values().sum::<f64>();
    let total_budget = input
        .budgets
        .iter()
        .map(|budget| budget.limit)
        .sum::<f64>();
    if total_spent < total_budget * pace - policy.under_pace_slack {
        insights.push(Insight {
            kind: InsightKind::UnderPace,
            title: "Spending under pace".to_string(),
            detail: format!(
                "You're {:.2} under your budget pace. Consider moving {SAVINGS_HINT_RANGE} to savings.",
                total_budget * pace - total_spent
            ),
        });
    }

    insights.extend(duplicate_insights(input.month_transactions));

    debug!(
        pace,
        total_spent,
        total_budget,
        emitted = insights.len(),
        "insight pass complete"
    );
    insights.truncate(policy.max_insights);
    insights
}

/// Same merchant and same amount (to the cent) twice in a month.
///
/// Dates are not compared, so a monthly bill seen twice in one window also
/// qualifies.
fn duplicate_insights(month_transactions: &[Transaction]) -> Vec<Insight> {
    let mut order: Vec<(String, String)> = Vec::new();
    let mut counts: HashMap<(String, String), usize> = HashMap::new();
    for transaction in month_transactions {
        if !transaction.is_outflow() {
            continue;
        }
        let key = (
            normalize_merchant(&transaction.merchant_raw),
            format!("{:.2}", transaction.amount),
        );
        let count = counts.entry(key.clone()).or_insert(0);
        if *count == 0 {
            order.push(key);
        }
        *count += 1;
    }

    order
        .into_iter()
        .filter_map(|key| {
            let count = counts.get(&key).copied().unwrap_or(0);
            if count < 2 {
                return None;
            }
            let (merchant, amount) = key;
            Some(Insight {
                kind: InsightKind::PossibleDuplicate,
                title: "Possible duplicate charge".to_string(),
                detail: format!("{count} charges of {amount} at {merchant} this month."),
            })
        })
        .collect()
}

/// Month-to-date outflow per category.
pub fn spend_by_category(month_transactions: &[Transaction]) -> HashMap<String, f64> {
    let mut totals: HashMap<String, f64> = HashMap::new();
    for transaction in month_transactions {
        if !transaction.is_outflow() {
            continue;
        }
        *totals.entry(transaction.category_id.clone()).or_insert(0.0) += transaction.amount;
    }
    totals
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::NaiveDate;

    use crate::engine::normalize::normalize_merchant;
    use crate::engine::types::{BudgetLimit, InsightKind, Transaction};

    use super::{PacingInput, build_insights, spend_by_category};

    fn budget(category: &str, limit: f64) -> BudgetLimit {
        BudgetLimit {
            category_id: category.to_string(),
            limit,
        }
    }

    fn txn(merchant: &str, category: &str, amount: f64) -> Transaction {
        Transaction {
            id: format!("txn_{merchant}_{amount}"),
            posted_at: NaiveDate::from_ymd_opt(2026, 3, 8).unwrap_or(NaiveDate::MIN),
            merchant_raw: merchant.to_string(),
            merchant_key: normalize_merchant(merchant),
            category_id: category.to_string(),
            amount,
            is_subscription: false,
        }
    }

    fn spend(entries: &[(&str, f64)]) -> HashMap<String, f64> {
        entries
            .iter()
            .map(|(category, amount)| (category.to_string(), *amount))
            .collect()
    }

    #[test]
    fn overspend_reports_overage_and_daily_cap() {
        let spend = spend(&[("Groceries", 215.0)]);
        let budgets = vec![budget("Groceries", 400.0)];
        let insights = build_insights(PacingInput {
            spend_by_category: &spend,
            budgets: &budgets,
            month_transactions: &[],
            day_of_month: 15,
            days_in_month: 30,
        });
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].kind, InsightKind::Overspend);
        assert!(insights[0].title.contains("Groceries"));
        assert!(insights[0].detail.contains("15.00 over pace"));
        assert!(insights[0].detail.contains("12.33/day"));
    }

    #[test]
    fn spending_within_slack_is_quiet() {
        let spend = spend(&[("Groceries", 210.0)]);
        let budgets = vec![budget("Groceries", 400.0)];
        let insights = build_insights(PacingInput {
            spend_by_category: &spend,
            budgets: &budgets,
            month_transactions: &[],
            day_of_month: 15,
            days_in_month: 30,
        });
        assert!(insights.is_empty());
    }

    #[test]
    fn final_day_cap_does_not_divide_by_zero_and_never_goes_negative() {
        let spend = spend(&[("Fuel", 250.0)]);
        let budgets = vec![budget("Fuel", 180.0)];
        let insights = build_insights(PacingInput {
            spend_by_category: &spend,
            budgets: &budgets,
            month_transactions: &[],
            day_of_month: 31,
            days_in_month: 31,
        });
        assert_eq!(insights.len(), 1);
        assert!(insights[0].detail.contains("0.00/day"));
    }

    #[test]
    fn zero_limits_are_skipped() {
        let spend = spend(&[("Dining", 90.0)]);
        let budgets = vec![budget("Dining", 0.0)];
        let insights = build_insights(PacingInput {
            spend_by_category: &spend,
            budgets: &budgets,
            month_transactions: &[],
            day_of_month: 10,
            days_in_month: 30,
        });
        assert!(insights.is_empty());
    }

    #[test]
    fn under_pace_emits_single_savings_hint() {
        let spend = spend(&[("Groceries", 50.0), ("Fuel", 20.0)]);
        let budgets = vec![budget("Groceries", 450.0), budget("Fuel", 180.0)];
        let insights = build_insights(PacingInput {
            spend_by_category: &spend,
            budgets: &budgets,
            month_transactions: &[],
            day_of_month: 20,
            days_in_month: 30,
        });
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].kind, InsightKind::UnderPace);
        assert!(insights[0].detail.contains("$50–$100"));
    }

    #[test]
    fn same_merchant_and_amount_is_flagged_once_with_count() {
        let rows = vec![
            txn("Shell", "Fuel", 42.10),
            txn("SHELL", "Fuel", 42.1),
            txn("Shell", "Fuel", 38.00),
            txn("Paycheck", "Income", -2450.0),
            txn("Paycheck", "Income", -2450.0),
        ];
        let spend = spend_by_category(&rows);
        let insights = build_insights(PacingInput {
            spend_by_category: &spend,
            budgets: &[],
            month_transactions: &rows,
            day_of_month: 8,
            days_in_month: 31,
        });
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].kind, InsightKind::PossibleDuplicate);
        assert!(insights[0].detail.starts_with("2 charges of 42.10"));
        assert!(insights[0].detail.contains("Shell"));
    }

    #[test]
    fn insight_order_is_overspend_then_pace_then_duplicates_capped_at_five() {
        let mut rows = Vec::new();
        for merchant in ["A", "B", "C", "D"] {
            rows.push(txn(merchant, "Misc", 5.0));
            rows.push(txn(merchant, "Misc", 5.0));
        }
        let spend = spend(&[("Dining", 100.0), ("Fuel", 100.0)]);
        let budgets = vec![budget("Dining", 120.0), budget("Fuel", 120.0)];
        let insights = build_insights(PacingInput {
            spend_by_category: &spend,
            budgets: &budgets,
            month_transactions: &rows,
            day_of_month: 5,
            days_in_month: 30,
        });
        assert_eq!(insights.len(), 5);
        assert!(insights[0].title.starts_with("Dining"));
        assert!(insights[1].title.starts_with("Fuel"));
        assert_eq!(insights[2].kind, InsightKind::PossibleDuplicate);
        assert!(insights[2].detail.contains(" at A "));
        assert!(insights[4].detail.contains(" at C "));
    }

    #[test]
    fn spend_by_category_ignores_inflows() {
        let rows = vec![
            txn("Costco", "Groceries", 89.12),
            txn("Trader Joe's", "Groceries", 61.96),
            txn("Refund", "Groceries", -10.0),
        ];
        let totals = spend_by_category(&rows);
        let groceries = totals.get("Groceries").copied().unwrap_or(0.0);
        assert!((groceries - 151.08).abs() < 1e-9);
    }
}
