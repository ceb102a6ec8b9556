pub mod config;
pub mod error;
pub mod models;
pub mod numerals;
pub mod scrape;
pub mod throttle;
pub mod traits;
pub mod validate;

#[cfg(test)]
pub(crate) mod testutil;

pub use config::ScrapeConfig;
pub use error::{AppError, ErrorKind};
pub use models::{CalendarData, CalendarDay, CalendarMonth, CalendarYear};
pub use numerals::{is_meaningful, native_to_arabic};
pub use scrape::{Orchestrator, ScrapeProgress, SessionState, acquire};
pub use throttle::{RateLimitConfig, RateLimiter};
pub use traits::{
    Exporter, FetcherFactory, NoProgress, PageFetcher, ProgressReporter, TracingProgressReporter,
};
pub use validate::{ValidationResult, Validator};
