use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ArcPath, ArcStr, log::LogLevel};

/// Largest page the backend accepts for the recent-activities feed.
pub const MAX_ACTIVITIES_LIMIT: usize = 100;

/// Options for path-based configuration values.
#[derive(Debug, Clone, Copy)]
pub enum PathOpt {
    /// Directory where log files are stored
    LogDir,
}

/// Options for numeric configuration values.
#[derive(Debug, Clone, Copy)]
pub enum USizeOpt {
    /// Maximum age of log files in days before they are deleted
    MaxAge,
    /// Page size requested from the recent-activities endpoint
    ActivitiesLimit,
}

/// Options for duration configuration values.
#[derive(Debug, Clone, Copy)]
pub enum DurationOpt {
    /// Upper bound for a single HTTP request
    Timeout,
    /// Revalidation interval of the overview resource
    OverviewInterval,
    /// Revalidation interval of the charts resource
    ChartsInterval,
    /// Revalidation interval of the activities resource
    ActivitiesInterval,
    /// Minimum time the refresh indicator stays visible
    RefreshVisible,
}

/// Options for string configuration values.
#[derive(Debug, Clone, Copy)]
pub enum StrOpt {
    /// Base URL of the backend, without the `/api/v1` suffix
    ApiUrl,
}

/// Options for boolean configuration values.
#[derive(Debug, Clone, Copy)]
pub enum BoolOpt {
    /// Revalidate subscribed resources when the terminal regains focus
    RevalidateOnFocus,
}

/// Reasons a configuration file is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("api_url must be an http(s) URL, got `{0}`")]
    InvalidApiUrl(String),
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
    #[error("activities_limit must be between 1 and {MAX_ACTIVITIES_LIMIT}, got {0}")]
    ActivitiesLimitOutOfRange(usize),
}

/// Revalidation intervals, one per dashboard resource, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intervals {
    pub overview_secs: u64,
    pub charts_secs: u64,
    pub activities_secs: u64,
}

impl Default for Intervals {
    fn default() -> Self {
        Self {
            overview_secs: 30,
            charts_secs: 60,
            activities_secs: 15,
        }
    }
}

/// Everything the dashboard reads from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Data {
    api_url: ArcStr,
    /// Request timeout in seconds
    timeout_secs: u64,
    /// Minimum visible duration of the refresh indicator in milliseconds
    refresh_visible_ms: u64,
    activities_limit: usize,
    revalidate_on_focus: bool,
    intervals: Intervals,
    log_dir: ArcPath,
    log_level: LogLevel,
    /// Maximum age of log files in days, 0 disables garbage collection
    max_age: usize,
}

impl Default for Data {
    fn default() -> Self {
        Self {
            api_url: ArcStr::from("http://localhost:8000"),
            timeout_secs: 15,
            refresh_visible_ms: 500,
            activities_limit: 20,
            revalidate_on_focus: true,
            intervals: Intervals::default(),
            log_dir: ArcPath::from("/tmp/logidash/logs"),
            log_level: LogLevel::Warning,
            max_age: 0,
        }
    }
}

impl Data {
    /// Checks the values a hand-edited file can get wrong.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidApiUrl(url.to_string()));
        }
        let durations = [
            ("timeout_secs", self.timeout_secs),
            ("refresh_visible_ms", self.refresh_visible_ms),
            ("intervals.overview_secs", self.intervals.overview_secs),
            ("intervals.charts_secs", self.intervals.charts_secs),
            ("intervals.activities_secs", self.intervals.activities_secs),
        ];
        if let Some((name, _)) = durations.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::ZeroDuration(name));
        }
        if !(1..=MAX_ACTIVITIES_LIMIT).contains(&self.activities_limit) {
            return Err(ConfigError::ActivitiesLimitOutOfRange(self.activities_limit));
        }
        Ok(())
    }

    pub fn path(&self, opt: PathOpt) -> ArcPath {
        match opt {
            PathOpt::LogDir => self.log_dir.clone(),
        }
    }

    pub fn set_path(&mut self, opt: PathOpt, path: ArcPath) {
        match opt {
            PathOpt::LogDir => self.log_dir = path,
        }
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    pub fn set_log_level(&mut self, level: LogLevel) {
        self.log_level = level;
    }

    pub fn usize(&self, opt: USizeOpt) -> usize {
        match opt {
            USizeOpt::MaxAge => self.max_age,
            USizeOpt::ActivitiesLimit => self.activities_limit,
        }
    }

    pub fn set_usize(&mut self, opt: USizeOpt, value: usize) {
        match opt {
            USizeOpt::MaxAge => self.max_age = value,
            USizeOpt::ActivitiesLimit => self.activities_limit = value,
        }
    }

    pub fn duration(&self, opt: DurationOpt) -> Duration {
        match opt {
            DurationOpt::Timeout => Duration::from_secs(self.timeout_secs),
            DurationOpt::OverviewInterval => Duration::from_secs(self.intervals.overview_secs),
            DurationOpt::ChartsInterval => Duration::from_secs(self.intervals.charts_secs),
            DurationOpt::ActivitiesInterval => Duration::from_secs(self.intervals.activities_secs),
            DurationOpt::RefreshVisible => Duration::from_millis(self.refresh_visible_ms),
        }
    }

    /// Sets a duration, truncated to the unit the option is stored in.
    pub fn set_duration(&mut self, opt: DurationOpt, value: Duration) {
        match opt {
            DurationOpt::Timeout => self.timeout_secs = value.as_secs(),
            DurationOpt::OverviewInterval => self.intervals.overview_secs = value.as_secs(),
            DurationOpt::ChartsInterval => self.intervals.charts_secs = value.as_secs(),
            DurationOpt::ActivitiesInterval => self.intervals.activities_secs = value.as_secs(),
            DurationOpt::RefreshVisible => self.refresh_visible_ms = value.as_millis() as u64,
        }
    }

    pub fn str(&self, opt: StrOpt) -> ArcStr {
        match opt {
            StrOpt::ApiUrl => self.api_url.clone(),
        }
    }

    pub fn set_str(&mut self, opt: StrOpt, value: ArcStr) {
        match opt {
            StrOpt::ApiUrl => self.api_url = ArcStr::from(value.trim_end_matches('/')),
        }
    }

    pub fn bool(&self, opt: BoolOpt) -> bool {
        match opt {
            BoolOpt::RevalidateOnFocus => self.revalidate_on_focus,
        }
    }

    pub fn set_bool(&mut self, opt: BoolOpt, value: bool) {
        match opt {
            BoolOpt::RevalidateOnFocus => self.revalidate_on_focus = value,
        }
    }
}
