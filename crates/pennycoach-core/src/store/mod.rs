//! SQLite ledger: one file per home directory, schema managed by migrations.

pub mod budgets;
pub mod connection;
pub mod migrations;
pub mod rules;
pub mod setup;
pub mod subscriptions;
pub mod transactions;
