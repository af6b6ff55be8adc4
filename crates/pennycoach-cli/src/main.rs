mod cli;
mod dispatch;
mod output;
mod stdout_io;

use std::process::ExitCode;

use clap::{Parser, error::ErrorKind};
use pennycoach_core::CoachError;
use stdout_io::write_stdout_text;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const ROOT_HELP: &str = "PennyCoach - recurring charges and budget pacing for your own ledger

Usage:
  pennycoach <command>

Start here:
  pennycoach import --help
  pennycoach recurring
  pennycoach insights
";

const TOP_LEVEL_HELP: &str = "PennyCoach - recurring charges and budget pacing for your own ledger

USAGE: pennycoach <command> [--json] [--verbose]

Bring in your transactions:
  1. pennycoach import --help                              Read the CSV format and sign convention
  2. pennycoach import --dry-run <path>                    Preview an import without writing
  3. pennycoach import <path>                              Import a bank CSV export
  pennycoach tx add --date <d> --merchant <m> --amount <a> Add one transaction by hand

Teach it your merchants:
  pennycoach rule set <merchant> <category> [--subscription]
  pennycoach budget set <category> <limit> [--month YYYY-MM]

See what it found:
  pennycoach recurring                                     Detect monthly recurring charges
  pennycoach subs --sync                                   Track detected subscriptions
  pennycoach insights                                      Budget pacing and duplicate charges
  pennycoach summary [--month YYYY-MM]                     Month spend, plan and subscriptions

Other commands:
  pennycoach tx list | tx edit <id> | tx delete <id>
  pennycoach rule list | budget list | budget delete <category>
  pennycoach subs add | subs pause <id> | subs resume <id> | subs delete <id>
  pennycoach normalize <text>                              Show how a merchant name is keyed

Data lives in ~/.pennycoach (override with PENNYCOACH_HOME).
Run `pennycoach <command> --help` for command usage.
";

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(code) => code,
    }
}

fn run() -> Result<ExitCode, ExitCode> {
    let raw_args = std::env::args().collect::<Vec<String>>();
    if raw_args.len() == 1 {
        if write_stdout_text(ROOT_HELP).is_err() {
            return Err(ExitCode::from(2));
        }
        return Ok(ExitCode::SUCCESS);
    }
    let parsed = cli::Cli::try_parse();
    let cli = match parsed {
        Ok(value) => value,
        Err(err) => {
            if matches!(
                err.kind(),
                ErrorKind::DisplayHelp
                    | ErrorKind::DisplayVersion
                    | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            ) {
                let text = if is_top_level_help_request(&raw_args) {
                    TOP_LEVEL_HELP.to_string()
                } else {
                    err.to_string()
                };
                if write_stdout_text(&text).is_err() {
                    return Err(ExitCode::from(2));
                }
                return Ok(ExitCode::SUCCESS);
            }
            let command_hint = if matches!(
                err.kind(),
                ErrorKind::MissingRequiredArgument
                    | ErrorKind::InvalidValue
                    | ErrorKind::ValueValidation
                    | ErrorKind::WrongNumberOfValues
                    | ErrorKind::UnknownArgument
                    | ErrorKind::InvalidSubcommand
            ) {
                command_path_from_args(&raw_args)
            } else {
                None
            };
            let clean_message = strip_clap_boilerplate(&err.to_string());
            let parse_error =
                CoachError::invalid_argument_for_command(&clean_message, command_hint.as_deref());
            let mode = infer_requested_output_mode(&raw_args);
            if output::print_failure(&parse_error, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            return Err(ExitCode::from(1));
        }
    };

    init_tracing(cli.verbose);
    let mode = output::mode_for_cli(&cli);

    match dispatch::dispatch(&cli) {
        Ok(success) => {
            debug!(command = %success.command, "command succeeded");
            if output::print_success(&success, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => {
            debug!(code = %error.code, "command failed");
            if output::print_failure(&error, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            Err(exit_code_for_error(&error))
        }
    }
}

/// RUST_LOG wins, then `--verbose`, then warnings only. Logs go to stderr so
/// `--json` output stays parseable.
fn init_tracing(verbose: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}

fn is_top_level_help_request(raw_args: &[String]) -> bool {
    raw_args.len() == 2 && matches!(raw_args[1].as_str(), "--help" | "-h")
}

/// Strips clap's trailing boilerplate (Usage line, "For more information" hint)
/// so our "What to do next" section is the single source of guidance.
fn strip_clap_boilerplate(message: &str) -> String {
    let trimmed = if let Some(pos) = message.find("\n\nUsage:") {
        &message[..pos]
    } else if let Some(pos) = message.find("\nFor more information") {
        &message[..pos]
    } else {
        message
    };
    trimmed.trim_end().to_string()
}

/// Builds the subcommand path from raw CLI args for use in help hints.
fn command_path_from_args(raw_args: &[String]) -> Option<String> {
    let non_flags: Vec<&str> = raw_args
        .iter()
        .skip(1)
        .filter(|value| !value.starts_with('-'))
        .map(String::as_str)
        .collect();

    let hint = match non_flags.as_slice() {
        ["import", ..] => Some("import"),
        ["tx", "add", ..] => Some("tx add"),
        ["tx", "edit", ..] => Some("tx edit"),
        ["tx", "delete", ..] => Some("tx delete"),
        ["tx", "list", ..] => Some("tx list"),
        ["tx", ..] => Some("tx"),
        ["rule", "set", ..] => Some("rule set"),
        ["rule", "list", ..] => Some("rule list"),
        ["rule", ..] => Some("rule"),
        ["budget", "set", ..] => Some("budget set"),
        ["budget", "list", ..] => Some("budget list"),
        ["budget", "delete", ..] => Some("budget delete"),
        ["budget", ..] => Some("budget"),
        ["recurring", ..] => Some("recurring"),
        ["subs", "add", ..] => Some("subs add"),
        ["subs", "pause", ..] => Some("subs pause"),
        ["subs", "resume", ..] => Some("subs resume"),
        ["subs", "delete", ..] => Some("subs delete"),
        ["subs", ..] => Some("subs"),
        ["insights", ..] => Some("insights"),
        ["summary", ..] => Some("summary"),
        ["normalize", ..] => Some("normalize"),
        _ => None,
    };
    hint.map(std::string::ToString::to_string)
}

fn exit_code_for_error(error: &CoachError) -> ExitCode {
    if is_internal_error(error) {
        ExitCode::from(2)
    } else {
        ExitCode::from(1)
    }
}

fn infer_requested_output_mode(raw_args: &[String]) -> output::OutputMode {
    if raw_args.iter().skip(1).any(|value| value == "--json") {
        return output::OutputMode::Json;
    }
    output::OutputMode::Text
}

fn is_internal_error(error: &CoachError) -> bool {
    !error.is_user_error()
}
