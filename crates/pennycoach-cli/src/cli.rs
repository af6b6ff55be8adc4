use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use pennycoach_core::engine::policy::MAX_LOOKBACK_DAYS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsoDate(pub String);

impl IsoDate {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub fn parse_iso_date(value: &str) -> Result<IsoDate, String> {
    if value.len() != 10 {
        return Err("date must use YYYY-MM-DD format".to_string());
    }

    let bytes = value.as_bytes();
    if bytes[4] != b'-' || bytes[7] != b'-' {
        return Err("date must use YYYY-MM-DD format".to_string());
    }

    for index in [0usize, 1, 2, 3, 5, 6, 8, 9] {
        if !bytes[index].is_ascii_digit() {
            return Err("date must use YYYY-MM-DD format".to_string());
        }
    }

    if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() {
        return Err("date must use valid calendar values".to_string());
    }

    Ok(IsoDate(value.to_string()))
}

pub fn parse_lookback_days(value: &str) -> Result<i64, String> {
    match value.parse::<i64>() {
        Ok(days) if (1..=MAX_LOOKBACK_DAYS).contains(&days) => Ok(days),
        _ => Err(format!(
            "lookback days must be a whole number from 1 to {MAX_LOOKBACK_DAYS}"
        )),
    }
}

/// Extended help shown after `pennycoach import --help`.
pub const IMPORT_AFTER_HELP: &str = "\
How import works:
  PennyCoach reads a bank CSV export with one header row.
  Headers are matched case-insensitively:
    date:      date, transaction date, posted, posted_at
    merchant:  merchant, description, details, name, payee
    amount:    amount, amt, or separate debit/withdrawal and credit/deposit columns
    category:  category (optional)

  <path> is a local file path. Use `-` to read stdin.
  Example: cat export.csv | pennycoach import --dry-run -

Sign convention:
  The ledger stores spending as positive amounts.
  Bank exports usually show spending as negative; that is the default.
  Pass --outflow-positive when your file already shows spending as positive.

Rows that cannot be read:
  Rows without a merchant or a readable amount are skipped and listed.
  Rows with an unreadable date are kept and dated today.

What to do next:
  1. Run `pennycoach import --dry-run <path>` and review the preview.
  2. Run `pennycoach import <path>` once the preview looks right.
  3. Run `pennycoach recurring` and `pennycoach insights`.
";

#[derive(Debug, Parser)]
#[command(
    name = "pennycoach",
    version,
    about = "recurring charges and budget pacing for your own ledger",
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Emit machine-readable JSON output
    #[arg(long, global = true)]
    pub json: bool,
    /// Log debug detail to stderr (RUST_LOG takes precedence)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Import a bank CSV export into your ledger
    #[command(after_long_help = IMPORT_AFTER_HELP)]
    Import {
        /// Parse and categorize without writing to the ledger
        #[arg(long)]
        dry_run: bool,
        /// The file already shows spending as positive amounts
        #[arg(long)]
        outflow_positive: bool,
        /// Path to a CSV file (use `-` for stdin)
        path: String,
    },
    /// Add, edit, delete or list individual transactions
    #[command(arg_required_else_help = true)]
    Tx {
        #[command(subcommand)]
        command: TxCommand,
    },
    /// Save or list merchant categorization rules
    #[command(arg_required_else_help = true)]
    Rule {
        #[command(subcommand)]
        command: RuleCommand,
    },
    /// Set, list or delete monthly category budgets
    #[command(arg_required_else_help = true)]
    Budget {
        #[command(subcommand)]
        command: BudgetCommand,
    },
    /// Detect recurring charges in the lookback window
    Recurring {
        /// Analysis date (YYYY-MM-DD), defaults to today
        #[arg(long, value_parser = parse_iso_date)]
        as_of: Option<IsoDate>,
        /// Days of history to scan
        #[arg(long, value_parser = parse_lookback_days)]
        lookback_days: Option<i64>,
    },
    /// Show tracked subscriptions next to detected recurring charges
    Subs {
        /// Save newly detected subscriptions before showing the list
        #[arg(long)]
        sync: bool,
        /// Analysis date (YYYY-MM-DD), defaults to today
        #[arg(long, value_parser = parse_iso_date)]
        as_of: Option<IsoDate>,
        #[command(subcommand)]
        command: Option<SubsCommand>,
    },
    /// Budget pacing and duplicate-charge insights for the current month
    Insights {
        /// Analysis date (YYYY-MM-DD), defaults to today
        #[arg(long, value_parser = parse_iso_date)]
        as_of: Option<IsoDate>,
    },
    /// Month totals: spending, planned budgets and active subscriptions
    Summary {
        /// Month (YYYY-MM), defaults to the current month
        #[arg(long)]
        month: Option<String>,
    },
    /// Show the merchant key a raw description normalizes to
    Normalize {
        /// Raw merchant or description text
        raw: String,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum TxCommand {
    /// Add one transaction (positive amount = spending)
    Add {
        /// Posting date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_iso_date)]
        date: IsoDate,
        /// Merchant or description text
        #[arg(long)]
        merchant: String,
        /// Amount; negative for refunds and income
        #[arg(long, allow_negative_numbers = true)]
        amount: f64,
        /// Category; defaults to a saved rule or the fallback bucket
        #[arg(long)]
        category: Option<String>,
    },
    /// Change a transaction's merchant and re-apply rules
    Edit {
        /// The transaction ID (e.g. txn_01J...)
        id: String,
        /// New merchant text
        #[arg(long)]
        merchant: String,
    },
    /// Delete one transaction
    Delete {
        /// The transaction ID (e.g. txn_01J...)
        id: String,
    },
    /// List the most recent transactions
    List {
        /// Maximum rows to show
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum RuleCommand {
    /// Map a merchant to a category
    Set {
        /// Merchant text; it is normalized before saving
        merchant: String,
        /// Category to assign
        category: String,
        /// Mark this merchant's charges as subscriptions
        #[arg(long)]
        subscription: bool,
        /// Recategorize existing transactions from this merchant
        #[arg(long)]
        apply_existing: bool,
    },
    /// List saved rules
    List,
}

#[derive(Debug, Clone, Subcommand)]
pub enum BudgetCommand {
    /// Set a category's spending limit for a month
    Set {
        /// Category to budget
        category: String,
        /// Monthly limit
        limit: f64,
        /// Month (YYYY-MM), defaults to the current month
        #[arg(long)]
        month: Option<String>,
    },
    /// List budgets for a month
    List {
        /// Month (YYYY-MM), defaults to the current month
        #[arg(long)]
        month: Option<String>,
    },
    /// Remove a category's budget for a month
    Delete {
        /// Category whose budget to remove
        category: String,
        /// Month (YYYY-MM), defaults to the current month
        #[arg(long)]
        month: Option<String>,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum SubsCommand {
    /// Track a subscription by hand
    Add {
        /// Merchant text; it is normalized before saving
        merchant: String,
        /// Charge amount per cycle
        #[arg(long)]
        amount: f64,
        /// Most recent charge date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_iso_date)]
        last_charge: Option<IsoDate>,
    },
    /// Stop counting a subscription toward the monthly total
    Pause {
        /// The subscription ID (e.g. sub_01J...)
        id: String,
    },
    /// Count a paused subscription again
    Resume {
        /// The subscription ID (e.g. sub_01J...)
        id: String,
    },
    /// Forget a tracked subscription
    Delete {
        /// The subscription ID (e.g. sub_01J...)
        id: String,
    },
}

#[cfg(test)]
pub fn parse_from<I, T>(itr: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(itr)
}

#[cfg(test)]
mod tests {
    use clap::error::ErrorKind;

    use super::{Commands, RuleCommand, SubsCommand, TxCommand, parse_from};

    #[test]
    fn parse_command_paths() {
        let cases: [Vec<&str>; 23] = [
            vec!["pennycoach", "import", "./export.csv"],
            vec!["pennycoach", "import", "--dry-run", "./export.csv"],
            vec!["pennycoach", "import", "-", "--outflow-positive", "--json"],
            vec![
                "pennycoach",
                "tx",
                "add",
                "--date",
                "2026-03-01",
                "--merchant",
                "Costco",
                "--amount",
                "84.10",
            ],
            vec!["pennycoach", "tx", "edit", "txn_1", "--merchant", "Shell"],
            vec!["pennycoach", "tx", "delete", "txn_1"],
            vec!["pennycoach", "tx", "list", "--limit", "5"],
            vec!["pennycoach", "rule", "set", "NETFLIX.COM", "Streaming"],
            vec!["pennycoach", "rule", "set", "Spotify", "Music", "--subscription"],
            vec!["pennycoach", "rule", "list", "--json"],
            vec!["pennycoach", "budget", "set", "Groceries", "400"],
            vec!["pennycoach", "budget", "list", "--month", "2026-03"],
            vec!["pennycoach", "budget", "delete", "Dining", "--month", "2026-03"],
            vec!["pennycoach", "recurring", "--as-of", "2026-03-31"],
            vec!["pennycoach", "recurring", "--lookback-days", "90", "--json"],
            vec!["pennycoach", "subs"],
            vec!["pennycoach", "subs", "--sync"],
            vec!["pennycoach", "subs", "add", "Netflix", "--amount", "15.49"],
            vec!["pennycoach", "subs", "pause", "sub_1"],
            vec!["pennycoach", "insights", "--as-of", "2026-03-15"],
            vec!["pennycoach", "summary"],
            vec!["pennycoach", "summary", "--month", "2026-03", "--json"],
            vec!["pennycoach", "normalize", "SQ *BLUE BOTTLE #4821"],
        ];

        for case in cases {
            let parsed = parse_from(case.clone());
            assert!(parsed.is_ok(), "failed to parse: {case:?}");
        }
    }

    #[test]
    fn json_and_verbose_are_global() {
        let parsed = parse_from(["pennycoach", "tx", "list", "--json", "-v"]);
        assert!(parsed.is_ok());
        if let Ok(cli) = parsed {
            assert!(cli.json);
            assert!(cli.verbose);
        }
    }

    #[test]
    fn tx_add_accepts_negative_refund_amounts() {
        let parsed = parse_from([
            "pennycoach",
            "tx",
            "add",
            "--date",
            "2026-03-02",
            "--merchant",
            "Target",
            "--amount",
            "-19.99",
        ]);
        assert!(parsed.is_ok());
        if let Ok(cli) = parsed {
            assert!(matches!(
                cli.command,
                Commands::Tx {
                    command: TxCommand::Add { amount, .. }
                } if amount < 0.0
            ));
        }
    }

    #[test]
    fn rule_set_flags_parse() {
        let parsed = parse_from([
            "pennycoach",
            "rule",
            "set",
            "Spotify",
            "Music",
            "--subscription",
            "--apply-existing",
        ]);
        assert!(parsed.is_ok());
        if let Ok(cli) = parsed {
            assert!(matches!(
                cli.command,
                Commands::Rule {
                    command: RuleCommand::Set {
                        subscription: true,
                        apply_existing: true,
                        ..
                    }
                }
            ));
        }
    }

    #[test]
    fn subs_without_subcommand_is_the_view() {
        let parsed = parse_from(["pennycoach", "subs", "--sync", "--as-of", "2026-03-31"]);
        assert!(parsed.is_ok());
        if let Ok(cli) = parsed {
            assert!(matches!(
                cli.command,
                Commands::Subs {
                    sync: true,
                    command: None,
                    ..
                }
            ));
        }

        let resume = parse_from(["pennycoach", "subs", "resume", "sub_1"]);
        assert!(resume.is_ok());
        if let Ok(cli) = resume {
            assert!(matches!(
                cli.command,
                Commands::Subs {
                    command: Some(SubsCommand::Resume { .. }),
                    ..
                }
            ));
        }
    }

    #[test]
    fn bare_tx_shows_help() {
        let parsed = parse_from(["pennycoach", "tx"]);
        assert!(parsed.is_err());
        if let Err(err) = parsed {
            assert_eq!(
                err.kind(),
                ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            );
        }
    }

    #[test]
    fn invalid_date_is_rejected() {
        let parsed = parse_from(["pennycoach", "insights", "--as-of", "2026-99-01"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn out_of_range_lookback_is_rejected() {
        let zero = parse_from(["pennycoach", "recurring", "--lookback-days", "0"]);
        assert!(zero.is_err());
        let huge = parse_from(["pennycoach", "recurring", "--lookback-days", "200000000"]);
        assert!(huge.is_err());
        let longest = parse_from(["pennycoach", "recurring", "--lookback-days", "3650"]);
        assert!(longest.is_ok());
    }

    #[test]
    fn import_requires_a_path() {
        let parsed = parse_from(["pennycoach", "import"]);
        assert!(parsed.is_err());
    }
}
