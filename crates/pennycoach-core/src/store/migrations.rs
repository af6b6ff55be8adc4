use rusqlite::Connection;
use rusqlite_migration::{M, Migrations};

const BOOTSTRAP_SQL: &str = include_str!("migrations/0001_bootstrap.sql");

pub const REQUIRED_TABLES: [(&str, &[&str]); 4] = [
    (
        "transactions",
        &[
            "txn_id",
            "posted_at",
            "merchant_raw",
            "merchant_key",
            "category_id",
            "amount",
            "is_subscription",
        ],
    ),
    ("budgets", &["category_id", "month", "amount_limit"]),
    (
        "subscriptions",
        &[
            "subscription_id",
            "merchant",
            "merchant_key",
            "amount",
            "last_charge",
            "match_count",
            "active",
        ],
    ),
    ("rules", &["merchant_key", "category_id", "is_subscription"]),
];

fn migrations() -> Migrations<'static> {
    Migrations::new(vec![M::up(BOOTSTRAP_SQL)])
}

pub fn run_pending(conn: &mut Connection) -> rusqlite_migration::Result<()> {
    migrations().to_latest(conn)
}
