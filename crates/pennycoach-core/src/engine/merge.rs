use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;

use crate::engine::normalize::normalize_merchant;
use crate::engine::types::{RecurrenceFinding, Subscription};

/// A subscription row proposed from a finding with no persisted counterpart.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionDraft {
    pub merchant: String,
    pub merchant_key: String,
    pub amount: f64,
    pub last_charge: NaiveDate,
    pub match_count: i64,
}

/// One persisted subscription enriched with what the latest pass observed.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionView {
    pub id: String,
    pub merchant: String,
    pub amount: f64,
    pub last_charge: Option<NaiveDate>,
    pub matches: i64,
    pub active: bool,
}

/// Drafts for findings whose merchant is not already an active subscription.
///
/// Existing rows are never rewritten from here: the store inserts drafts with
/// conflict-ignore semantics, so user-edited amounts and dates survive.
pub fn plan_subscription_upserts(
    findings: &[RecurrenceFinding],
    subscriptions: &[Subscription],
) -> Vec<SubscriptionDraft> {
    let active_keys = subscriptions
        .iter()
        .filter(|subscription| subscription.active)
        .map(|subscription| normalize_merchant(&subscription.merchant))
        .collect::<BTreeSet<String>>();

    findings
        .iter()
        .filter(|finding| !active_keys.contains(&finding.merchant_key))
        .map(|finding| SubscriptionDraft {
            merchant: finding.merchant_key.clone(),
            merchant_key: finding.merchant_key.clone(),
            amount: finding.average_amount,
            last_charge: finding.last_charge_date,
            match_count: finding.occurrence_count,
        })
        .collect()
}

/// Persisted subscriptions are the source of truth; findings only fill gaps.
///
/// Without a finding in the current window, `matches` falls back to the count
/// stored when the row was last synced.
pub fn merge_subscription_view(
    subscriptions: &[Subscription],
    findings: &[RecurrenceFinding],
) -> Vec<SubscriptionView> {
    let by_key = findings
        .iter()
        .map(|finding| (finding.merchant_key.as_str(), finding))
        .collect::<HashMap<&str, &RecurrenceFinding>>();

    let mut rows = subscriptions
        .iter()
        .map(|subscription| {
            let key = normalize_merchant(&subscription.merchant);
            let finding = by_key.get(key.as_str());
            SubscriptionView {
                id: subscription.id.clone(),
                merchant: subscription.merchant.clone(),
                amount: subscription.amount,
                last_charge: subscription
                    .last_charge
                    .or_else(|| finding.map(|value| value.last_charge_date)),
                matches: finding
                    .map(|value| value.occurrence_count)
                    .unwrap_or(subscription.match_count),
                active: subscription.active,
            }
        })
        .collect::<Vec<SubscriptionView>>();

    rows.sort_by(compare_views);
    rows
}

pub fn monthly_total(rows: &[SubscriptionView]) -> f64 {
    rows.iter()
        .filter(|row| row.active)
        .map(|row| row.amount)
        .sum()
}

fn compare_views(left: &SubscriptionView, right: &SubscriptionView) -> Ordering {
    right
        .matches
        .cmp(&left.matches)
        .then_with(|| {
            left.merchant
                .to_lowercase()
                .cmp(&right.merchant.to_lowercase())
        })
        .then_with(|| left.id.cmp(&right.id))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::engine::types::{RecurrenceFinding, Subscription};

    use super::{merge_subscription_view, monthly_total, plan_subscription_upserts};

    fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap_or(NaiveDate::MIN)
    }

    fn finding(key: &str, count: i64, amount: f64, last: &str) -> RecurrenceFinding {
        RecurrenceFinding {
            merchant_key: key.to_string(),
            occurrence_count: count,
            average_amount: amount,
            last_charge_date: date(last),
            is_monthly: true,
        }
    }

    fn subscription(id: &str, merchant: &str, amount: f64, active: bool) -> Subscription {
        Subscription {
            id: id.to_string(),
            merchant: merchant.to_string(),
            merchant_key: merchant.to_string(),
            amount,
            last_charge: None,
            match_count: 0,
            active,
        }
    }

    #[test]
    fn only_unknown_merchants_are_proposed() {
        let findings = vec![
            finding("Netflix", 3, 15.49, "2026-03-05"),
            finding("Spotify", 2, 9.99, "2026-03-12"),
        ];
        let saved = vec![subscription("sub_1", "NETFLIX", 17.99, true)];
        let drafts = plan_subscription_upserts(&findings, &saved);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].merchant_key, "Spotify");
        assert_eq!(drafts[0].amount, 9.99);
        assert_eq!(drafts[0].last_charge, date("2026-03-12"));
    }

    #[test]
    fn paused_subscriptions_do_not_block_proposals() {
        let findings = vec![finding("Netflix", 3, 15.49, "2026-03-05")];
        let saved = vec![subscription("sub_1", "Netflix", 15.49, false)];
        assert_eq!(plan_subscription_upserts(&findings, &saved).len(), 1);
    }

    #[test]
    fn merged_view_keeps_user_amount_and_fills_missing_dates() {
        let findings = vec![finding("Netflix", 4, 15.49, "2026-03-05")];
        let saved = vec![
            subscription("sub_1", "Netflix", 17.99, true),
            subscription("sub_2", "Audible", 14.95, false),
        ];
        let view = merge_subscription_view(&saved, &findings);
        assert_eq!(view.len(), 2);
        assert_eq!(view[0].merchant, "Netflix");
        assert_eq!(view[0].amount, 17.99);
        assert_eq!(view[0].matches, 4);
        assert_eq!(view[0].last_charge, Some(date("2026-03-05")));
        assert_eq!(view[1].merchant, "Audible");
        assert_eq!(view[1].matches, 0);
        assert_eq!(view[1].last_charge, None);
        assert_eq!(monthly_total(&view), 17.99);
    }

    #[test]
    fn stored_match_count_is_used_when_the_window_has_no_finding() {
        let mut netflix = subscription("sub_1", "Netflix", 15.49, true);
        netflix.match_count = 5;
        let mut hulu = subscription("sub_2", "Hulu", 7.99, true);
        hulu.match_count = 2;
        let findings = vec![finding("Netflix", 3, 15.49, "2026-03-05")];

        let view = merge_subscription_view(&[netflix, hulu], &findings);
        assert_eq!(view[0].merchant, "Netflix");
        assert_eq!(view[0].matches, 3);
        assert_eq!(view[1].merchant, "Hulu");
        assert_eq!(view[1].matches, 2);
    }
}
