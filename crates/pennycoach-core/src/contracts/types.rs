use serde::Serialize;

use crate::engine::date::format_iso_date;
use crate::engine::merge::SubscriptionView;
use crate::engine::types::{
    BudgetLimit, Insight, RecurrenceFinding, Rule, Subscription, Transaction,
};

#[derive(Debug, Clone, Serialize)]
pub struct ImportData {
    pub dry_run: bool,
    pub path: Option<String>,
    pub source_kind: String,
    pub sign_convention: String,
    pub message: String,
    pub summary: ImportSummary,
    pub issues: Vec<ImportIssue>,
    pub preview: Vec<TransactionRow>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportSummary {
    pub rows_read: i64,
    pub inserted: i64,
    pub skipped: i64,
    pub defaulted_dates: i64,
    pub categorized_by_rule: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportIssue {
    pub row: i64,
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionRow {
    pub id: String,
    pub posted_at: String,
    pub merchant_raw: String,
    pub merchant_key: String,
    pub category_id: String,
    pub amount: f64,
    pub is_subscription: bool,
}

impl From<&Transaction> for TransactionRow {
    fn from(transaction: &Transaction) -> Self {
        Self {
            id: transaction.id.clone(),
            posted_at: format_iso_date(&transaction.posted_at),
            merchant_raw: transaction.merchant_raw.clone(),
            merchant_key: transaction.merchant_key.clone(),
            category_id: transaction.category_id.clone(),
            amount: transaction.amount,
            is_subscription: transaction.is_subscription,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionData {
    pub transaction: TransactionRow,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionListData {
    pub total: i64,
    pub rows: Vec<TransactionRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeletedData {
    pub id: String,
    pub deleted: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RuleRow {
    pub merchant_key: String,
    pub category_id: String,
    pub is_subscription: bool,
}

impl From<&Rule> for RuleRow {
    fn from(rule: &Rule) -> Self {
        Self {
            merchant_key: rule.merchant_key.clone(),
            category_id: rule.category_id.clone(),
            is_subscription: rule.is_subscription,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RuleSavedData {
    pub rule: RuleRow,
    pub replaced: bool,
    pub recategorized: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RuleListData {
    pub rows: Vec<RuleRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetRow {
    pub category_id: String,
    pub month: String,
    pub limit: f64,
}

impl BudgetRow {
    pub fn from_limit(budget: &BudgetLimit, month: &str) -> Self {
        Self {
            category_id: budget.category_id.clone(),
            month: month.to_string(),
            limit: budget.limit,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetSavedData {
    pub budget: BudgetRow,
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetListData {
    pub month: String,
    pub total_limit: f64,
    pub rows: Vec<BudgetRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetDeletedData {
    pub category_id: String,
    pub month: String,
    pub deleted: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryData {
    pub month: String,
    pub spent: f64,
    pub planned: f64,
    pub remaining: f64,
    pub active_subscriptions: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecurringRow {
    pub merchant_key: String,
    pub occurrence_count: i64,
    pub average_amount: f64,
    pub last_charge_date: String,
    pub is_monthly: bool,
}

impl From<&RecurrenceFinding> for RecurringRow {
    fn from(finding: &RecurrenceFinding) -> Self {
        Self {
            merchant_key: finding.merchant_key.clone(),
            occurrence_count: finding.occurrence_count,
            average_amount: finding.average_amount,
            last_charge_date: format_iso_date(&finding.last_charge_date),
            is_monthly: finding.is_monthly,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecurringData {
    pub policy_version: String,
    pub as_of: String,
    pub lookback_days: i64,
    pub window_start: String,
    pub total_findings: i64,
    pub rows: Vec<RecurringRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionRow {
    pub id: String,
    pub merchant: String,
    pub amount: f64,
    pub last_charge: Option<String>,
    pub matches: i64,
    pub active: bool,
}

impl From<&SubscriptionView> for SubscriptionRow {
    fn from(view: &SubscriptionView) -> Self {
        Self {
            id: view.id.clone(),
            merchant: view.merchant.clone(),
            amount: view.amount,
            last_charge: view.last_charge.as_ref().map(format_iso_date),
            matches: view.matches,
            active: view.active,
        }
    }
}

impl From<&Subscription> for SubscriptionRow {
    fn from(subscription: &Subscription) -> Self {
        Self {
            id: subscription.id.clone(),
            merchant: subscription.merchant.clone(),
            amount: subscription.amount,
            last_charge: subscription.last_charge.as_ref().map(format_iso_date),
            matches: subscription.match_count,
            active: subscription.active,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub findings: i64,
    pub proposed: i64,
    pub inserted: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncError {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionsData {
    pub as_of: String,
    pub monthly_total: f64,
    pub active_count: i64,
    pub rows: Vec<SubscriptionRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync: Option<SyncReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_error: Option<SyncError>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionData {
    pub subscription: SubscriptionRow,
}

#[derive(Debug, Clone, Serialize)]
pub struct InsightRow {
    pub kind: String,
    pub title: String,
    pub detail: String,
}

impl From<&Insight> for InsightRow {
    fn from(insight: &Insight) -> Self {
        Self {
            kind: insight.kind.as_str().to_string(),
            title: insight.title.clone(),
            detail: insight.detail.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InsightsData {
    pub policy_version: String,
    pub as_of: String,
    pub month: String,
    pub day_of_month: u32,
    pub days_in_month: u32,
    pub total_spent: f64,
    pub total_budget: f64,
    pub rows: Vec<InsightRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NormalizeData {
    pub raw: String,
    pub merchant_key: String,
}
