#[path = "support/coach_testkit.rs"]
mod coach_testkit;

use std::path::Path;

use pennycoach_core::commands::budgets::{self, BudgetSetOptions};
use pennycoach_core::commands::subscriptions::{self, SubscriptionAddOptions, SubscriptionIdOptions};
use pennycoach_core::commands::summary::{self, SummaryRunOptions};
use serde_json::Value;

use coach_testkit::{add_transaction, payload, temp_home_in_tmp};

fn set_budget(home: &Path, category: &str, limit: f64, month: &str) {
    let saved = budgets::set(BudgetSetOptions {
        category: category.to_string(),
        limit,
        month: Some(month.to_string()),
        home_override: Some(home),
    });
    assert!(saved.is_ok());
}

fn add_subscription(home: &Path, merchant: &str, amount: f64) -> String {
    let added = payload(subscriptions::add(SubscriptionAddOptions {
        merchant: merchant.to_string(),
        amount,
        last_charge: None,
        home_override: Some(home),
    }));
    added["subscription"]["id"].as_str().unwrap_or("").to_string()
}

fn summary_for(home: &Path, month: &str) -> Value {
    payload(summary::run(SummaryRunOptions {
        month: Some(month.to_string()),
        home_override: Some(home),
    }))
}

#[test]
fn month_totals_cover_spend_budgets_and_active_subscriptions() {
    let temp = temp_home_in_tmp("pennycoach-summary-totals");
    assert!(temp.is_ok());
    if let Ok((_dir, home)) = temp {
        set_budget(&home, "Groceries", 400.0, "2026-03");
        set_budget(&home, "Dining", 150.0, "2026-03");
        set_budget(&home, "Dining", 90.0, "2026-04");

        add_transaction(&home, "2026-03-01", "WHOLE FOODS", 120.25, Some("Groceries"));
        add_transaction(&home, "2026-03-31", "CHIPOTLE", 14.50, Some("Dining"));
        // Refund; inflows never count as spend.
        add_transaction(&home, "2026-03-10", "WHOLE FOODS", -20.00, Some("Groceries"));
        add_transaction(&home, "2026-02-28", "CHIPOTLE", 11.00, Some("Dining"));
        add_transaction(&home, "2026-04-01", "CHIPOTLE", 12.00, Some("Dining"));

        add_subscription(&home, "Netflix", 15.49);
        let hulu_id = add_subscription(&home, "Hulu", 7.99);
        let paused = subscriptions::pause(SubscriptionIdOptions {
            id: hulu_id,
            home_override: Some(&home),
        });
        assert!(paused.is_ok());

        let march = summary_for(&home, "2026-03");
        assert_eq!(march["month"], "2026-03");
        assert_eq!(march["spent"], Value::from(134.75));
        assert_eq!(march["planned"], Value::from(550.0));
        assert_eq!(march["remaining"], Value::from(415.25));
        assert_eq!(march["active_subscriptions"], Value::from(1));

        let april = summary_for(&home, "2026-04");
        assert_eq!(april["spent"], Value::from(12.0));
        assert_eq!(april["planned"], Value::from(90.0));
    }
}

#[test]
fn empty_month_and_bad_month_arguments() {
    let temp = temp_home_in_tmp("pennycoach-summary-empty");
    assert!(temp.is_ok());
    if let Ok((_dir, home)) = temp {
        let empty = summary_for(&home, "2026-02");
        assert_eq!(empty["spent"], Value::from(0.0));
        assert_eq!(empty["planned"], Value::from(0.0));
        assert_eq!(empty["remaining"], Value::from(0.0));
        assert_eq!(empty["active_subscriptions"], Value::from(0));

        let bad = summary::run(SummaryRunOptions {
            month: Some("2026-3".to_string()),
            home_override: Some(&home),
        });
        assert!(bad.is_err());
        if let Err(error) = bad {
            assert_eq!(error.code, "invalid_argument");
        }
    }
}
