use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::throttle::RateLimitConfig;

pub const DEFAULT_BASE_URL: &str = "https://www.hamropatro.com/calendar";

/// Settings for one acquisition session.
///
/// Durations are stored in milliseconds so a config file reads the same as
/// the command-line flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScrapeConfig {
    /// Years to acquire, in the order they are fetched.
    pub years: Vec<i32>,
    /// Months fetched for every year, in the listed order.
    pub months: Vec<u32>,
    /// Minimum gap between two month requests.
    pub request_delay: u64,
    /// Transport-level retries inside one fetch. A failed month still aborts
    /// the run.
    pub max_retries: u32,
    /// Per-fetch timeout.
    pub timeout: u64,
    /// Also write one file per year when exporting.
    pub save_individual_years: bool,
    /// Cap for the backoff delay.
    pub max_delay: u64,
    pub exponential_backoff: bool,
    /// Root of the paginated month pages.
    pub base_url: String,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            years: (2000..=2090).collect(),
            months: (1..=12).collect(),
            request_delay: 1_000,
            max_retries: 3,
            timeout: 30_000,
            save_individual_years: false,
            max_delay: 30_000,
            exponential_backoff: true,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl ScrapeConfig {
    /// Load a JSON config file. Missing keys fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::file_system(format!("Failed to read config {}: {e}", path.display()))
                .with_source(e)
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|e| {
            AppError::config(format!("Invalid config {}: {e}", path.display())).with_source(e)
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_years(mut self, years: impl IntoIterator<Item = i32>) -> Self {
        self.years = years.into_iter().collect();
        self
    }

    pub fn with_months(mut self, months: impl IntoIterator<Item = u32>) -> Self {
        self.months = months.into_iter().collect();
        self
    }

    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay.as_millis() as u64;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout.as_millis() as u64;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout)
    }

    /// Rate limiter settings derived from this config.
    pub fn rate_limit(&self) -> RateLimitConfig {
        let config = RateLimitConfig::new(self.request_delay())
            .with_max_delay(Duration::from_millis(self.max_delay));
        if self.exponential_backoff {
            config
        } else {
            config.without_backoff()
        }
    }

    /// Number of (year, month) units this config describes.
    pub fn unit_count(&self) -> usize {
        self.years.len() * self.months.len()
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.years.is_empty() {
            return Err(AppError::config("At least one year is required"));
        }
        if self.months.is_empty() {
            return Err(AppError::config("At least one month is required"));
        }
        if let Some(m) = self.months.iter().find(|m| !(1..=12).contains(*m)) {
            return Err(AppError::config(format!(
                "Invalid month {m}: must be between 1 and 12"
            )));
        }
        if let Some(y) = first_duplicate(&self.years) {
            return Err(AppError::config(format!("Year {y} is listed twice")));
        }
        if let Some(m) = first_duplicate(&self.months) {
            return Err(AppError::config(format!("Month {m} is listed twice")));
        }
        if self.timeout == 0 {
            return Err(AppError::config("timeout must be greater than 0"));
        }
        if self.max_delay < self.request_delay {
            return Err(AppError::config(format!(
                "maxDelay ({} ms) must not be smaller than requestDelay ({} ms)",
                self.max_delay, self.request_delay
            )));
        }
        Ok(())
    }
}

fn first_duplicate<T: Copy + Eq + std::hash::Hash>(items: &[T]) -> Option<T> {
    let mut seen = HashSet::new();
    items.iter().copied().find(|item| !seen.insert(*item))
}

/// Parse a year list such as `"2081"`, `"2079-2081"` or `"2070,2075-2077"`.
pub fn parse_years(list: &str) -> Result<Vec<i32>, AppError> {
    parse_ranges(list, "year")?
        .into_iter()
        .map(|y| {
            i32::try_from(y).map_err(|_| AppError::config(format!("Year {y} is out of range")))
        })
        .collect()
}

/// Parse a month list such as `"1-12"` or `"1,4,9-10"`.
pub fn parse_months(list: &str) -> Result<Vec<u32>, AppError> {
    parse_ranges(list, "month")?
        .into_iter()
        .map(|m| match u32::try_from(m) {
            Ok(m) if (1..=12).contains(&m) => Ok(m),
            _ => Err(AppError::config(format!(
                "Invalid month {m}: must be between 1 and 12"
            ))),
        })
        .collect()
}

fn parse_ranges(list: &str, what: &str) -> Result<Vec<i64>, AppError> {
    let parse = |s: &str| {
        s.trim()
            .parse::<i64>()
            .map_err(|_| AppError::config(format!("Invalid {what} '{}' in '{list}'", s.trim())))
    };

    let mut out = Vec::new();
    for part in list.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.split_once('-') {
            Some((start, end)) => {
                let (start, end) = (parse(start)?, parse(end)?);
                if start > end {
                    return Err(AppError::config(format!(
                        "Invalid {what} range '{part}': start is after end"
                    )));
                }
                out.extend(start..=end);
            }
            None => out.push(parse(part)?),
        }
    }
    if out.is_empty() {
        return Err(AppError::config(format!("No {what}s given in '{list}'")));
    }
    Ok(out)
}
