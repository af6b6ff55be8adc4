//! PennyCoach core: merchant normalization, recurring-charge detection and
//! budget pacing insights over a local SQLite ledger.

pub mod commands;
pub mod contracts;
pub mod engine;
pub mod error;
pub mod import;
pub mod settings;
pub mod store;

pub use contracts::envelope::{FailureEnvelope, SuccessEnvelope};
pub use error::{CoachError, CoachResult, MalformedInput};

pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");
