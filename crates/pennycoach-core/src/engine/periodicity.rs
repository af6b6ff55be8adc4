use chrono::NaiveDate;

use crate::engine::policy::{PERIODICITY_POLICY_V1, PeriodicityPolicy};

/// Decides whether one merchant's charge dates look like a monthly bill.
///
/// Any single gap of 25-35 days is enough on its own, which keeps two-charge
/// histories detectable at the cost of the occasional coincidental match.
/// With three or more charges the gaps may also qualify as a group: mean
/// within 25-35 days and population standard deviation of at most 6 days.
pub fn is_monthly_pattern(dates: &[NaiveDate]) -> bool {
    is_monthly_pattern_with_policy(dates, PERIODICITY_POLICY_V1)
}

fn is_monthly_pattern_with_policy(dates: &[NaiveDate], policy: PeriodicityPolicy) -> bool {
    if dates.len() < 2 {
        return false;
    }

    let gaps = gaps_in_days(dates);
    if gaps.iter().any(|gap| policy.gap_is_monthly(*gap)) {
        return true;
    }

    if gaps.len() >= 2 {
        let (mean, std_dev) = mean_and_std_dev(&gaps);
        return policy.spread_is_monthly(mean, std_dev);
    }

    false
}

fn gaps_in_days(dates: &[NaiveDate]) -> Vec<f64> {
    let mut sorted = dates.to_vec();
    sorted.sort_by(|left, right| right.cmp(left));
    sorted
        .windows(2)
        .map(|pair| (pair[0] - pair[1]).num_days().abs() as f64)
        .collect()
}

fn mean_and_std_dev(values: &[f64]) -> (f64, f64) {
    let count = values.len() as f64;
    let mean = values.iter().sum::<f64>() / count;
    let variance = values
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f64>()
        / count;
    (mean, variance.sqrt())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};

    use super::{gaps_in_days, is_monthly_pattern};

    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 1).unwrap_or(NaiveDate::MIN) + Duration::days(offset)
    }

    #[test]
    fn too_few_dates_are_never_monthly() {
        assert!(!is_monthly_pattern(&[]));
        assert!(!is_monthly_pattern(&[day(0)]));
    }

    #[test]
    fn single_thirty_day_gap_fast_accepts() {
        assert!(is_monthly_pattern(&[day(0), day(30)]));
        assert!(is_monthly_pattern(&[day(30), day(0)]));
    }

    #[test]
    fn any_in_range_gap_accepts_even_with_other_gaps_far_off() {
        // Gaps 10 and 30: mean 20 fails the spread rule, but 30 fast-accepts.
        assert!(is_monthly_pattern(&[day(0), day(10), day(40)]));
    }

    #[test]
    fn weekly_and_quarterly_patterns_are_rejected() {
        assert!(!is_monthly_pattern(&[day(0), day(7), day(14), day(21)]));
        assert!(!is_monthly_pattern(&[day(0), day(91), day(182)]));
        assert!(!is_monthly_pattern(&[day(0), day(24)]));
    }

    #[test]
    fn spread_rule_accepts_noisy_monthly_history_without_any_exact_gap() {
        // Gaps 24, 36, 24, 36: none inside [25, 35], mean 30, std dev 6.
        let dates = [day(0), day(24), day(60), day(84), day(120)];
        assert!(is_monthly_pattern(&dates));
    }

    #[test]
    fn spread_rule_rejects_wide_deviation() {
        // Gaps 20, 40, 20, 40: mean 30, std dev 10.
        let dates = [day(0), day(20), day(60), day(80), day(120)];
        assert!(!is_monthly_pattern(&dates));
    }

    #[test]
    fn gaps_are_taken_from_descending_order() {
        let gaps = gaps_in_days(&[day(5), day(40), day(0)]);
        assert_eq!(gaps, vec![35.0, 5.0]);
    }
}
