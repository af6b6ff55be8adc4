/// Deterministic engine policy identifier.
///
/// Emitted with recurring and insight results so threshold changes stay
/// auditable in diffs and support sessions.
pub const ENGINE_POLICY_VERSION: &str = "coach/v1";

/// Monthly-recurrence thresholds, all in whole days.
#[derive(Debug, Clone, Copy)]
pub struct PeriodicityPolicy {
    pub min_gap_days: f64,
    pub max_gap_days: f64,
    pub max_std_dev_days: f64,
}

impl PeriodicityPolicy {
    pub fn gap_is_monthly(self, gap_days: f64) -> bool {
        gap_days >= self.min_gap_days && gap_days <= self.max_gap_days
    }

    pub fn spread_is_monthly(self, mean_days: f64, std_dev_days: f64) -> bool {
        self.gap_is_monthly(mean_days) && std_dev_days <= self.max_std_dev_days
    }
}

pub const PERIODICITY_POLICY_V1: PeriodicityPolicy = PeriodicityPolicy {
    min_gap_days: 25.0,
    max_gap_days: 35.0,
    max_std_dev_days: 6.0,
};

/// Budget pacing thresholds. Slack values are absolute currency units.
#[derive(Debug, Clone, Copy)]
pub struct PacingPolicy {
    pub overspend_slack: f64,
    pub under_pace_slack: f64,
    pub max_insights: usize,
}

pub const PACING_POLICY_V1: PacingPolicy = PacingPolicy {
    overspend_slack: 10.0,
    under_pace_slack: 20.0,
    max_insights: 5,
};

/// Static hint shown with the under-pace insight; not derived from the gap.
pub const SAVINGS_HINT_RANGE: &str = "$50–$100";

pub const DEFAULT_LOOKBACK_DAYS: i64 = 120;
/// Upper bound for any lookback, from flags or `config.toml`.
pub const MAX_LOOKBACK_DAYS: i64 = 3650;
pub const DISPLAY_FINDINGS_CAP: usize = 12;
pub const DEFAULT_FALLBACK_CATEGORY: &str = "Misc";
