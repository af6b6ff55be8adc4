use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::policy::{
    DEFAULT_FALLBACK_CATEGORY, DEFAULT_LOOKBACK_DAYS, DISPLAY_FINDINGS_CAP, MAX_LOOKBACK_DAYS,
    PACING_POLICY_V1,
};
use crate::{CoachError, CoachResult};

pub const SETTINGS_FILE_NAME: &str = "config.toml";

/// Optional per-ledger tuning read from `<home>/config.toml`.
///
/// Every key may be omitted; missing keys take the built-in defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub lookback_days: i64,
    pub fallback_category: String,
    pub max_insights: usize,
    pub display_findings: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            fallback_category: DEFAULT_FALLBACK_CATEGORY.to_string(),
            max_insights: PACING_POLICY_V1.max_insights,
            display_findings: DISPLAY_FINDINGS_CAP,
        }
    }
}

impl Settings {
    pub fn parse(content: &str, path: &Path) -> CoachResult<Self> {
        let settings = toml::from_str::<Settings>(content)
            .map_err(|error| CoachError::invalid_settings(path, &error.to_string()))?;
        settings.validated(path)
    }

    fn validated(mut self, path: &Path) -> CoachResult<Self> {
        if self.lookback_days <= 0 || self.lookback_days > MAX_LOOKBACK_DAYS {
            return Err(CoachError::invalid_settings(
                path,
                &format!("`lookback_days` must be between 1 and {MAX_LOOKBACK_DAYS} days."),
            ));
        }
        self.fallback_category = self.fallback_category.trim().to_string();
        if self.fallback_category.is_empty() {
            self.fallback_category = DEFAULT_FALLBACK_CATEGORY.to_string();
        }
        Ok(self)
    }
}

pub fn settings_path(home: &Path) -> PathBuf {
    home.join(SETTINGS_FILE_NAME)
}

pub fn load_settings(home: &Path) -> CoachResult<Settings> {
    let path = settings_path(home);
    if !path.exists() {
        return Ok(Settings::default());
    }

    let content = fs::read_to_string(&path)
        .map_err(|error| CoachError::invalid_settings(&path, &error.to_string()))?;
    let settings = Settings::parse(&content, &path)?;
    debug!(path = %path.display(), ?settings, "loaded settings");
    Ok(settings)
}
