pub mod budgets;
pub(crate) mod common;
pub mod import;
pub mod insights;
pub mod normalize;
pub mod recurring;
pub mod rules;
pub mod subscriptions;
pub mod summary;
pub mod transactions;
