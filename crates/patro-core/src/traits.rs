use std::future::Future;
use std::path::Path;

use crate::error::AppError;
use crate::models::{CalendarData, CalendarDay};
use crate::scrape::ScrapeProgress;

/// Acquires the fetch resource (browser process, HTTP client, ...) for one
/// acquisition session.
pub trait FetcherFactory: Send + Sync {
    type Fetcher: PageFetcher;

    fn connect(&self) -> impl Future<Output = Result<Self::Fetcher, AppError>> + Send;
}

/// Loads one month page and extracts its raw day records.
///
/// Failures that the implementation cannot classify itself should be
/// returned as [`crate::ErrorKind::Unclassified`]; the orchestrator maps them
/// to `Timeout` or `Network`.
pub trait PageFetcher: Send {
    fn fetch_month(
        &mut self,
        year: i32,
        month: u32,
    ) -> impl Future<Output = Result<Vec<CalendarDay>, AppError>> + Send;

    /// Release the underlying resource.
    fn close(self) -> impl Future<Output = ()> + Send;
}

/// Writes a finished dataset to disk.
pub trait Exporter {
    /// Write `data` to `output`, creating missing parent directories.
    ///
    /// With `include_all_fields == false`, `tithi`/`event` are omitted from
    /// days where they carry no meaningful value.
    fn export(
        &self,
        data: &CalendarData,
        output: &Path,
        include_all_fields: bool,
    ) -> Result<(), AppError>;
}

/// Receives a progress record before each unit starts.
pub trait ProgressReporter {
    fn report(&self, progress: &ScrapeProgress) {
        let _ = progress;
    }
}

impl<F> ProgressReporter for F
where
    F: Fn(&ScrapeProgress),
{
    fn report(&self, progress: &ScrapeProgress) {
        self(progress)
    }
}

/// Reporter that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {}

/// Reporter that uses the `tracing` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgressReporter;

impl ProgressReporter for TracingProgressReporter {
    fn report(&self, progress: &ScrapeProgress) {
        tracing::info!(
            year = progress.current_year,
            month = progress.current_month,
            unit = progress.completed_units() + 1,
            total = progress.total_units(),
            "Scraping {}/{:02} ({:.0}%)",
            progress.current_year,
            progress.current_month,
            progress.percent()
        );
    }
}
