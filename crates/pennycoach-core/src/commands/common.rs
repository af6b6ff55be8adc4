use std::path::Path;

use chrono::{Local, NaiveDate};

use crate::engine::date::parse_iso_date_arg;
use crate::store::setup::{LedgerContext, ensure_initialized};
use crate::{CoachError, CoachResult};

pub(crate) fn load_ledger(home_override: Option<&Path>) -> CoachResult<LedgerContext> {
    ensure_initialized(home_override)
}

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// `--as-of` when given, otherwise the local calendar date.
pub(crate) fn resolve_as_of(value: Option<&str>, command: &str) -> CoachResult<NaiveDate> {
    match value {
        Some(raw) => parse_iso_date_arg(raw.trim(), "--as-of", command),
        None => Ok(today()),
    }
}

pub(crate) fn require_text(value: &str, field_name: &str, command: &str) -> CoachResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoachError::invalid_argument_for_command(
            &format!("`{field_name}` must not be empty."),
            Some(command),
        ));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn require_finite_amount(value: f64, field_name: &str, command: &str) -> CoachResult<f64> {
    if !value.is_finite() {
        return Err(CoachError::invalid_argument_for_command(
            &format!("`{field_name}` must be a finite number."),
            Some(command),
        ));
    }
    Ok(crate::engine::round_to(value, 2))
}
