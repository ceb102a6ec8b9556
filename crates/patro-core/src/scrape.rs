use std::fmt;

use serde::Serialize;

use crate::config::ScrapeConfig;
use crate::error::AppError;
use crate::models::{CalendarData, CalendarMonth};
use crate::throttle::RateLimiter;
use crate::traits::{FetcherFactory, PageFetcher, ProgressReporter};
use crate::validate::Validator;

/// Lifecycle of an acquisition session.
///
/// ```text
/// UNINITIALIZED --initialize--> READY --scrape--> SCRAPING --+--> COMPLETED
///                                                            +--> FAILED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Ready,
    Scraping,
    Completed,
    Failed,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Uninitialized => "uninitialized",
            SessionState::Ready => "ready",
            SessionState::Scraping => "scraping",
            SessionState::Completed => "completed",
            SessionState::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Completed | SessionState::Failed)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Emitted before each unit starts. `completed_*` are the zero-based indices
/// of the unit about to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeProgress {
    pub current_year: i32,
    pub current_month: u32,
    pub total_years: usize,
    pub total_months: usize,
    pub completed_years: usize,
    pub completed_months: usize,
}

impl ScrapeProgress {
    pub fn total_units(&self) -> usize {
        self.total_years * self.total_months
    }

    /// Units finished before this one.
    pub fn completed_units(&self) -> usize {
        self.completed_years * self.total_months + self.completed_months
    }

    pub fn percent(&self) -> f64 {
        match self.total_units() {
            0 => 100.0,
            total => self.completed_units() as f64 * 100.0 / total as f64,
        }
    }
}

/// Drives one acquisition session across the configured year × month matrix.
///
/// Units run strictly one after another: the rate limiter wait, the fetch,
/// then per-month validation. The first failing unit aborts the run.
pub struct Orchestrator<FF: FetcherFactory> {
    config: ScrapeConfig,
    factory: FF,
    fetcher: Option<FF::Fetcher>,
    rate_limiter: RateLimiter,
    validator: Validator,
    state: SessionState,
}

impl<FF: FetcherFactory> Orchestrator<FF> {
    pub fn new(config: ScrapeConfig, factory: FF) -> Self {
        let rate_limiter = RateLimiter::new(config.rate_limit());
        Self {
            config,
            factory,
            fetcher: None,
            rate_limiter,
            validator: Validator::default(),
            state: SessionState::Uninitialized,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    /// Acquire the fetch resource. On failure the session stays
    /// uninitialized and a `Network` error is returned.
    pub async fn initialize(&mut self) -> Result<(), AppError> {
        if self.fetcher.is_some() {
            tracing::debug!(state = %self.state, "Fetch resource already acquired");
            return Ok(());
        }

        match self.factory.connect().await {
            Ok(fetcher) => {
                self.fetcher = Some(fetcher);
                self.state = SessionState::Ready;
                tracing::info!("Fetch resource acquired");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to acquire fetch resource");
                Err(AppError::network(format!(
                    "Failed to initialize fetcher: {}",
                    e.message()
                ))
                .with_source(e))
            }
        }
    }

    /// Fetch and validate every configured unit, years outer and months
    /// inner, in configured order.
    ///
    /// Returns the complete dataset, or the first unit's error. No partial
    /// dataset is returned.
    pub async fn scrape<R>(&mut self, reporter: &R) -> Result<CalendarData, AppError>
    where
        R: ProgressReporter + ?Sized,
    {
        if self.state != SessionState::Ready || self.fetcher.is_none() {
            return Err(AppError::network(format!(
                "Scraper not initialized (state: {}); call initialize() first",
                self.state
            )));
        }

        self.state = SessionState::Scraping;
        let result = self.scrape_matrix(reporter).await;
        self.state = match result {
            Ok(_) => SessionState::Completed,
            Err(_) => SessionState::Failed,
        };
        result
    }

    async fn scrape_matrix<R>(&mut self, reporter: &R) -> Result<CalendarData, AppError>
    where
        R: ProgressReporter + ?Sized,
    {
        let years = self.config.years.clone();
        let months = self.config.months.clone();
        tracing::info!(
            years = years.len(),
            months = months.len(),
            units = years.len() * months.len(),
            "Starting acquisition"
        );

        let mut data = CalendarData::new();
        for (year_idx, &year) in years.iter().enumerate() {
            let mut accumulated = Vec::with_capacity(months.len());
            for (month_idx, &month) in months.iter().enumerate() {
                reporter.report(&ScrapeProgress {
                    current_year: year,
                    current_month: month,
                    total_years: years.len(),
                    total_months: months.len(),
                    completed_years: year_idx,
                    completed_months: month_idx,
                });
                accumulated.push(self.scrape_unit(year, month).await?);
            }
            data.insert(year, accumulated);
        }

        Ok(data)
    }

    /// One unit: wait, fetch, validate, record.
    async fn scrape_unit(&mut self, year: i32, month: u32) -> Result<CalendarMonth, AppError> {
        self.rate_limiter.wait_for_next_request().await;

        let fetcher = self
            .fetcher
            .as_mut()
            .ok_or_else(|| AppError::network("Fetch resource released during scrape"))?;

        tracing::debug!(year, month, "Fetching month");
        let days = match fetcher.fetch_month(year, month).await {
            Ok(days) => days,
            Err(e) => {
                let err = e.classify_fetch_error();
                self.rate_limiter.record_error();
                tracing::error!(year, month, kind = %err.kind(), error = %err, "Fetch failed");
                return Err(err);
            }
        };

        let calendar_month = CalendarMonth::new(month, days);
        let report = self.validator.validate_month(&calendar_month);
        for warning in &report.warnings {
            tracing::warn!(year, month, "{warning}");
        }
        if !report.is_valid {
            self.rate_limiter.record_error();
            let err = AppError::validation(format!(
                "Validation failed for {year}/{month:02}: {}",
                report.errors.join("; ")
            ));
            tracing::error!(year, month, error = %err, "Month rejected");
            return Err(err);
        }

        self.rate_limiter.record_success();
        tracing::info!(
            year,
            month,
            days = calendar_month.days.len(),
            holidays = calendar_month.holidays().count(),
            "Month scraped"
        );
        Ok(calendar_month)
    }

    /// Release the fetch resource. Safe from any state; repeated calls are
    /// no-ops.
    pub async fn close(&mut self) {
        if let Some(fetcher) = self.fetcher.take() {
            fetcher.close().await;
            tracing::info!("Fetch resource released");
        }
        if !self.state.is_terminal() {
            self.state = SessionState::Uninitialized;
        }
    }
}

/// Run a complete acquisition: initialize, scrape, always close, then
/// validate the whole dataset against the configured months.
///
/// Returns the dataset only if every unit succeeded and the dataset-level
/// pass reports no errors.
pub async fn acquire<FF, R>(
    config: ScrapeConfig,
    factory: FF,
    reporter: &R,
) -> Result<CalendarData, AppError>
where
    FF: FetcherFactory,
    R: ProgressReporter + ?Sized,
{
    config.validate()?;
    let validator = Validator::for_months(&config.months);

    let mut orchestrator = Orchestrator::new(config, factory);
    let result = match orchestrator.initialize().await {
        Ok(()) => orchestrator.scrape(reporter).await,
        Err(e) => Err(e),
    };
    orchestrator.close().await;
    let data = result?;

    let warnings = validator.validate_data(&data).into_result()?;
    tracing::info!(
        years = data.len(),
        days = data.day_count(),
        warnings = warnings.len(),
        "Acquisition complete"
    );
    Ok(data)
}
