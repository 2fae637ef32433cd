//! Project configuration for wptree
//!
//! Configuration is stored in `.wptree/config.toml` and controls which
//! sources are loaded, how rows are highlighted, and the filters applied by
//! default.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::classify::{
    Classifier, DEFAULT_CLOSED_COLOR, DEFAULT_OVERDUE_COLOR, DEFAULT_UPCOMING_COLOR,
    DEFAULT_UPCOMING_WEEKS, Palette,
};
use crate::dates::DISPLAY_FORMAT;
use crate::fetch::{DEFAULT_TIMEOUT_SECS, Source};
use crate::filter::{Interval, RowFilter};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Where work packages are loaded from
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Row highlighting and formatting
    #[serde(default)]
    pub display: DisplayConfig,

    /// Filters applied unless overridden on the command line
    #[serde(default)]
    pub filter: FilterConfig,
}

/// Source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// API URLs or local JSON dumps, loaded concurrently
    #[serde(default)]
    pub urls: Vec<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            urls: Vec::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Display configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Rows due within this many weeks are highlighted as upcoming
    #[serde(default = "default_upcoming_weeks")]
    pub upcoming_weeks: i64,

    #[serde(default = "default_closed_color")]
    pub closed_color: String,

    #[serde(default = "default_overdue_color")]
    pub overdue_color: String,

    #[serde(default = "default_upcoming_color")]
    pub upcoming_color: String,

    /// strftime-style format of date columns
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

/// Upper limit for `display.upcoming_weeks`, about ten years
pub const MAX_UPCOMING_WEEKS: i64 = 520;

fn default_upcoming_weeks() -> i64 {
    DEFAULT_UPCOMING_WEEKS
}

fn default_closed_color() -> String {
    DEFAULT_CLOSED_COLOR.to_string()
}

fn default_overdue_color() -> String {
    DEFAULT_OVERDUE_COLOR.to_string()
}

fn default_upcoming_color() -> String {
    DEFAULT_UPCOMING_COLOR.to_string()
}

fn default_date_format() -> String {
    DISPLAY_FORMAT.to_string()
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            upcoming_weeks: default_upcoming_weeks(),
            closed_color: default_closed_color(),
            overdue_color: default_overdue_color(),
            upcoming_color: default_upcoming_color(),
            date_format: default_date_format(),
        }
    }
}

/// Default filter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Rows with these statuses are never shown
    #[serde(default = "default_excluded_statuses")]
    pub excluded_statuses: Vec<String>,

    /// Finish-date range as `START..END` (either side may be empty)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_range: Option<String>,

    /// Keep a row when any descendant's finish date is in range
    #[serde(default = "default_descendants")]
    pub descendants: bool,
}

fn default_excluded_statuses() -> Vec<String> {
    vec!["Retired".to_string()]
}

fn default_descendants() -> bool {
    true
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            excluded_statuses: default_excluded_statuses(),
            end_range: None,
            descendants: default_descendants(),
        }
    }
}

impl Config {
    /// Load configuration from .wptree/config.toml
    /// Returns default config if file doesn't exist
    pub fn load(dir: &Path) -> anyhow::Result<Self> {
        let config_path = dir.join("config.toml");

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|e| anyhow::anyhow!("Failed to read config: {}", e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config: {}", e))?;

        Ok(config)
    }

    /// Save configuration to .wptree/config.toml
    pub fn save(&self, dir: &Path) -> anyhow::Result<()> {
        let config_path = dir.join("config.toml");

        let content = toml::to_string_pretty(self)
            .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

        fs::write(&config_path, content)
            .map_err(|e| anyhow::anyhow!("Failed to write config: {}", e))?;

        Ok(())
    }

    /// Initialize default config file if it doesn't exist
    pub fn init(dir: &Path) -> anyhow::Result<bool> {
        let config_path = dir.join("config.toml");

        if config_path.exists() {
            return Ok(false); // Already exists
        }

        let config = Self::default();
        config.save(dir)?;
        Ok(true) // Created new
    }

    pub fn sources(&self) -> Vec<Source> {
        self.sources.urls.iter().map(|s| Source::parse(s)).collect()
    }

    pub fn palette(&self) -> Palette {
        Palette {
            closed: self.display.closed_color.clone(),
            overdue: self.display.overdue_color.clone(),
            upcoming: self.display.upcoming_color.clone(),
        }
    }

    /// Classifier for a render at `now`.
    ///
    /// `display.upcoming_weeks` must lie in `0..=MAX_UPCOMING_WEEKS`.
    pub fn classifier(&self, now: NaiveDateTime) -> anyhow::Result<Classifier> {
        let weeks = self.display.upcoming_weeks;
        let window = Duration::try_weeks(weeks)
            .filter(|_| (0..=MAX_UPCOMING_WEEKS).contains(&weeks))
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Invalid display.upcoming_weeks: {} (expected 0 to {})",
                    weeks,
                    MAX_UPCOMING_WEEKS
                )
            })?;
        Ok(Classifier::new(now)
            .with_window(window)
            .with_palette(self.palette()))
    }

    /// Filters configured for this project
    pub fn row_filter(&self) -> anyhow::Result<RowFilter> {
        let end_range = match &self.filter.end_range {
            Some(text) => {
                let interval: Interval = text
                    .parse()
                    .map_err(|e| anyhow::anyhow!("Invalid filter.end_range: {}", e))?;
                interval
                    .check_dates()
                    .map_err(|e| anyhow::anyhow!("Invalid filter.end_range: {}", e))?;
                Some(interval)
            }
            None => None,
        };
        Ok(RowFilter {
            end_range,
            progress: None,
            excluded_statuses: self.filter.excluded_statuses.clone(),
            descendants: self.filter.descendants,
        })
    }
}
