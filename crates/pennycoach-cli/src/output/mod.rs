mod analysis_text;
mod error_text;
mod format;
mod json;
mod ledger_text;
mod mode;

use std::io;

use pennycoach_core::{CoachError, SuccessEnvelope};

use crate::stdout_io::write_stdout_line;

pub use mode::{OutputMode, mode_for_cli};

pub fn print_success(success: &SuccessEnvelope, mode: OutputMode) -> io::Result<()> {
    let body = match mode {
        OutputMode::Text => render_text_success(success)?,
        OutputMode::Json => json::render_success_json(success)?,
    };
    write_stdout_line(&body)
}

pub fn print_failure(error: &CoachError, mode: OutputMode) -> io::Result<()> {
    let body = match mode {
        OutputMode::Json => json::render_error_json(error)?,
        OutputMode::Text => error_text::render_error(error),
    };
    write_stdout_line(&body)
}

fn render_text_success(success: &SuccessEnvelope) -> io::Result<String> {
    let data = &success.data;
    match success.command.as_str() {
        "import" => ledger_text::render_import(data),
        "tx add" | "tx edit" => ledger_text::render_transaction(&success.command, data),
        "tx list" => ledger_text::render_transaction_list(data),
        "tx delete" => Ok(ledger_text::render_deleted("transaction", data)),
        "rule set" => ledger_text::render_rule_saved(data),
        "rule list" => ledger_text::render_rule_list(data),
        "budget set" => ledger_text::render_budget_saved(data),
        "budget list" => ledger_text::render_budget_list(data),
        "budget delete" => Ok(ledger_text::render_budget_deleted(data)),
        "recurring" => analysis_text::render_recurring(data),
        "subs" | "subs sync" => analysis_text::render_subscriptions(data),
        "subs add" | "subs pause" | "subs resume" => {
            analysis_text::render_subscription(&success.command, data)
        }
        "subs delete" => Ok(ledger_text::render_deleted("subscription", data)),
        "insights" => analysis_text::render_insights(data),
        "summary" => Ok(analysis_text::render_summary(data)),
        "normalize" => Ok(analysis_text::render_normalize(data)),
        _ => Err(io::Error::other(format!(
            "unsupported text output command `{}`",
            success.command
        ))),
    }
}
