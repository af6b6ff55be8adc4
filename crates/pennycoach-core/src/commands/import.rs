use std::path::Path;

use chrono::NaiveDate;

use crate::CoachResult;
use crate::commands::common::{load_ledger, today};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::ImportData;
use crate::import::{self, AmountSign, ImportRequest};

#[derive(Debug, Default)]
pub struct ImportRunOptions<'a> {
    pub path: String,
    pub dry_run: bool,
    pub sign: AmountSign,
    /// Date used for rows whose date cannot be read; defaults to today.
    pub today: Option<NaiveDate>,
    pub home_override: Option<&'a Path>,
    pub stdin_override: Option<String>,
}

pub fn run(path: &str, dry_run: bool, sign: AmountSign) -> CoachResult<SuccessEnvelope> {
    run_with_options(ImportRunOptions {
        path: path.to_string(),
        dry_run,
        sign,
        today: None,
        home_override: None,
        stdin_override: None,
    })
}

#[doc(hidden)]
pub fn run_with_options(options: ImportRunOptions<'_>) -> CoachResult<SuccessEnvelope> {
    let ledger = load_ledger(options.home_override)?;
    let execution = import::execute(
        &ledger,
        ImportRequest {
            path: options.path.clone(),
            dry_run: options.dry_run,
            sign: options.sign,
            today: options.today.unwrap_or_else(today),
            stdin_override: options.stdin_override,
        },
    )?;

    let summary = &execution.summary;
    let message = if execution.dry_run {
        format!(
            "Dry run: {} rows would be imported, {} skipped. No rows were written.",
            summary.rows_read - summary.skipped,
            summary.skipped
        )
    } else {
        format!(
            "Imported {} rows, {} skipped.",
            summary.inserted, summary.skipped
        )
    };

    let data = ImportData {
        dry_run: execution.dry_run,
        path: execution.source_ref,
        source_kind: execution.source_kind.to_string(),
        sign_convention: options.sign.as_str().to_string(),
        message,
        summary: execution.summary,
        issues: execution.issues,
        preview: execution.preview,
    };

    success("import", data)
}
