use pennycoach_core::commands;
use pennycoach_core::commands::budgets::{
    BudgetDeleteOptions, BudgetListOptions, BudgetSetOptions,
};
use pennycoach_core::commands::rules::{RuleListOptions, RuleSetOptions};
use pennycoach_core::commands::subscriptions::{
    SubscriptionAddOptions, SubscriptionIdOptions, SubscriptionsViewOptions,
};
use pennycoach_core::commands::summary::SummaryRunOptions;
use pennycoach_core::commands::transactions::{
    TransactionAddOptions, TransactionDeleteOptions, TransactionEditOptions,
    TransactionListOptions,
};
use pennycoach_core::import::AmountSign;
use pennycoach_core::{CoachResult, SuccessEnvelope};

use crate::cli::{BudgetCommand, Cli, Commands, IsoDate, RuleCommand, SubsCommand, TxCommand};

pub fn dispatch(cli: &Cli) -> CoachResult<SuccessEnvelope> {
    match &cli.command {
        Commands::Import {
            dry_run,
            outflow_positive,
            path,
        } => {
            let sign = if *outflow_positive {
                AmountSign::OutflowPositive
            } else {
                AmountSign::Bank
            };
            commands::import::run(path, *dry_run, sign)
        }
        Commands::Tx { command } => dispatch_tx(command),
        Commands::Rule { command } => match command {
            RuleCommand::Set {
                merchant,
                category,
                subscription,
                apply_existing,
            } => commands::rules::set(RuleSetOptions {
                merchant: merchant.clone(),
                category: category.clone(),
                is_subscription: *subscription,
                apply_existing: *apply_existing,
                home_override: None,
            }),
            RuleCommand::List => commands::rules::list(RuleListOptions::default()),
        },
        Commands::Budget { command } => match command {
            BudgetCommand::Set {
                category,
                limit,
                month,
            } => commands::budgets::set(BudgetSetOptions {
                category: category.clone(),
                limit: *limit,
                month: month.clone(),
                home_override: None,
            }),
            BudgetCommand::List { month } => commands::budgets::list(BudgetListOptions {
                month: month.clone(),
                home_override: None,
            }),
            BudgetCommand::Delete { category, month } => {
                commands::budgets::delete(BudgetDeleteOptions {
                    category: category.clone(),
                    month: month.clone(),
                    home_override: None,
                })
            }
        },
        Commands::Recurring {
            as_of,
            lookback_days,
        } => commands::recurring::run(date_str(as_of.as_ref()), *lookback_days),
        Commands::Subs {
            sync,
            as_of,
            command,
        } => match command {
            None => commands::subscriptions::list(SubscriptionsViewOptions {
                as_of: as_of.as_ref().map(|value| value.as_str().to_string()),
                sync: *sync,
                home_override: None,
            }),
            Some(subcommand) => dispatch_subs(subcommand),
        },
        Commands::Insights { as_of } => commands::insights::run(date_str(as_of.as_ref())),
        Commands::Summary { month } => commands::summary::run(SummaryRunOptions {
            month: month.clone(),
            home_override: None,
        }),
        Commands::Normalize { raw } => commands::normalize::run(raw),
    }
}

fn dispatch_tx(command: &TxCommand) -> CoachResult<SuccessEnvelope> {
    match command {
        TxCommand::Add {
            date,
            merchant,
            amount,
            category,
        } => commands::transactions::add(TransactionAddOptions {
            date: date.as_str().to_string(),
            merchant: merchant.clone(),
            amount: *amount,
            category: category.clone(),
            home_override: None,
        }),
        TxCommand::Edit { id, merchant } => {
            commands::transactions::edit_merchant(TransactionEditOptions {
                id: id.clone(),
                merchant: merchant.clone(),
                home_override: None,
            })
        }
        TxCommand::Delete { id } => commands::transactions::delete(TransactionDeleteOptions {
            id: id.clone(),
            home_override: None,
        }),
        TxCommand::List { limit } => commands::transactions::list(TransactionListOptions {
            limit: *limit,
            home_override: None,
        }),
    }
}

fn dispatch_subs(command: &SubsCommand) -> CoachResult<SuccessEnvelope> {
    match command {
        SubsCommand::Add {
            merchant,
            amount,
            last_charge,
        } => commands::subscriptions::add(SubscriptionAddOptions {
            merchant: merchant.clone(),
            amount: *amount,
            last_charge: last_charge.as_ref().map(|value| value.as_str().to_string()),
            home_override: None,
        }),
        SubsCommand::Pause { id } => commands::subscriptions::pause(id_options(id)),
        SubsCommand::Resume { id } => commands::subscriptions::resume(id_options(id)),
        SubsCommand::Delete { id } => commands::subscriptions::delete(id_options(id)),
    }
}

fn id_options(id: &str) -> SubscriptionIdOptions<'static> {
    SubscriptionIdOptions {
        id: id.to_string(),
        home_override: None,
    }
}

fn date_str(value: Option<&IsoDate>) -> Option<&str> {
    value.map(IsoDate::as_str)
}

#[cfg(test)]
mod tests {
    use crate::cli::parse_from;

    use super::dispatch;

    #[test]
    fn normalize_dispatches_without_a_ledger() {
        let parsed = parse_from(["pennycoach", "normalize", "COSTCO WHSE #4821"]);
        assert!(parsed.is_ok());
        if let Ok(cli) = parsed {
            let response = dispatch(&cli);
            assert!(response.is_ok());
            if let Ok(success) = response {
                assert_eq!(success.command, "normalize");
                assert_eq!(success.data["merchant_key"], "Costco whse");
            }
        }
    }

    #[test]
    fn unknown_commands_fail_to_parse() {
        let parsed = parse_from(["pennycoach", "balance"]);
        assert!(parsed.is_err());
    }
}
