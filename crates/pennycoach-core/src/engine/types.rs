use chrono::NaiveDate;

/// A ledger transaction as seen by the engine.
///
/// Amounts use one convention everywhere: positive = money out (spend),
/// negative = money in (income, refunds).
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: String,
    pub posted_at: NaiveDate,
    pub merchant_raw: String,
    pub merchant_key: String,
    pub category_id: String,
    pub amount: f64,
    pub is_subscription: bool,
}

impl Transaction {
    pub fn is_outflow(&self) -> bool {
        self.amount > 0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecurrenceFinding {
    pub merchant_key: String,
    pub occurrence_count: i64,
    pub average_amount: f64,
    pub last_charge_date: NaiveDate,
    pub is_monthly: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Subscription {
    pub id: String,
    pub merchant: String,
    pub merchant_key: String,
    pub amount: f64,
    pub last_charge: Option<NaiveDate>,
    pub match_count: i64,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BudgetLimit {
    pub category_id: String,
    pub limit: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub merchant_key: String,
    pub category_id: String,
    pub is_subscription: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsightKind {
    Overspend,
    UnderPace,
    PossibleDuplicate,
}

impl InsightKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Overspend => "overspend",
            Self::UnderPace => "under_pace",
            Self::PossibleDuplicate => "possible_duplicate",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Insight {
    pub kind: InsightKind,
    pub title: String,
    pub detail: String,
}
