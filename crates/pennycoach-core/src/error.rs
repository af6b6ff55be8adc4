use std::path::Path;

use serde_json::{Value, json};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct CoachError {
    pub code: String,
    pub message: String,
    pub recovery_steps: Vec<String>,
    pub data: Option<Value>,
}

impl CoachError {
    pub fn new(code: &str, message: &str, recovery_steps: Vec<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            recovery_steps,
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn invalid_argument(message: &str) -> Self {
        Self::invalid_argument_for_command(message, None)
    }

    pub fn invalid_argument_for_command(message: &str, command: Option<&str>) -> Self {
        let help_hint = match command {
            Some(cmd) => format!("Run `pennycoach {cmd} --help` for usage."),
            None => "Run `pennycoach --help` for usage.".to_string(),
        };
        let error = Self::new("invalid_argument", message, vec![help_hint]);
        if let Some(cmd) = command {
            return error.with_data(json!({
                "command_hint": cmd,
            }));
        }
        error
    }

    pub fn invalid_argument_with_recovery(message: &str, recovery_steps: Vec<String>) -> Self {
        Self::new("invalid_argument", message, recovery_steps)
    }

    pub fn invalid_input(message: &str) -> Self {
        Self::new(
            "invalid_input",
            message,
            vec![
                "Provide a CSV file with a header row and at least one data row.".to_string(),
                "Run `pennycoach import --help` to review accepted column names.".to_string(),
            ],
        )
    }

    pub fn not_found(entity: &str, id: &str, list_command: &str) -> Self {
        Self::new(
            "not_found",
            &format!("No {entity} with id `{id}` exists."),
            vec![format!(
                "Run `pennycoach {list_command}` to find a valid id."
            )],
        )
        .with_data(json!({
            "entity": entity,
            "id": id,
        }))
    }

    pub fn budget_not_found(category_id: &str, month: &str) -> Self {
        Self::new(
            "not_found",
            &format!("No budget for `{category_id}` exists in {month}."),
            vec![format!(
                "Run `pennycoach budget list --month {month}` to see saved budgets."
            )],
        )
        .with_data(json!({
            "entity": "budget",
            "category_id": category_id,
            "month": month,
        }))
    }

    pub fn invalid_settings(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "invalid_settings",
            &format!("Settings file `{location}` could not be read: {detail}"),
            vec![format!(
                "Fix or remove `{location}`; built-in defaults apply when it is absent."
            )],
        )
    }

    pub fn internal_serialization(message: &str) -> Self {
        Self::new("internal_serialization_error", message, Vec::new())
    }

    pub fn ledger_init_permission_denied(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "ledger_init_permission_denied",
            &format!("Cannot initialize ledger at `{location}`: {detail}"),
            vec![format!(
                "Grant write access to `{location}` or set `PENNYCOACH_HOME` to a writable directory."
            )],
        )
    }

    pub fn ledger_locked(path: &Path) -> Self {
        let location = path.display().to_string();
        Self::new(
            "ledger_locked",
            &format!("Ledger database is locked at `{location}`."),
            vec![format!(
                "Close other processes using `{location}` so the lock is released."
            )],
        )
    }

    pub fn ledger_corrupt(path: &Path) -> Self {
        let location = path.display().to_string();
        Self::new(
            "ledger_corrupt",
            &format!("Ledger database appears corrupt at `{location}`."),
            vec![format!(
                "Replace `{location}` with a valid SQLite ledger file or restore from backup."
            )],
        )
    }

    pub fn migration_failed(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "migration_failed",
            &format!("Ledger migration failed at `{location}`: {detail}"),
            vec!["Resolve conflicting schema objects referenced in the error details.".to_string()],
        )
    }

    pub fn ledger_init_failed(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "ledger_init_failed",
            &format!("Ledger initialization failed at `{location}`: {detail}"),
            Vec::new(),
        )
    }

    /// Errors a user can fix by changing input; everything else is internal.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self.code.as_str(),
            "invalid_argument" | "invalid_input" | "not_found" | "invalid_settings"
        )
    }
}

pub type CoachResult<T> = Result<T, CoachError>;

/// Why one import row could not be mapped into a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedInput {
    #[error("row has no merchant or description")]
    MissingMerchant,
    #[error("row has no amount, debit or credit value")]
    MissingAmount,
    #[error("amount `{0}` is not a number")]
    InvalidAmount(String),
}

impl MalformedInput {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingMerchant => "missing_merchant",
            Self::MissingAmount => "missing_amount",
            Self::InvalidAmount(_) => "invalid_amount",
        }
    }
}
