//! Test utilities: mock fetch collaborators and calendar fixtures.
//!
//! Mocks use `Arc<Mutex<_>>` so tests can inspect recorded calls after the
//! orchestrator has consumed its clone.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::error::AppError;
use crate::models::{CalendarDay, CalendarMonth, CalendarYear};
use crate::traits::{FetcherFactory, PageFetcher};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Render `n` with Devanagari digits.
pub fn to_native(n: u32) -> String {
    const DIGITS: [char; 10] = ['०', '१', '२', '३', '४', '५', '६', '७', '८', '९'];
    n.to_string()
        .chars()
        .map(|c| c.to_digit(10).map_or(c, |d| DIGITS[d as usize]))
        .collect()
}

/// A well-formed day whose numerals agree.
pub fn make_day(n: u32) -> CalendarDay {
    CalendarDay {
        is_holiday: n % 7 == 0,
        tithi: Some("प्रतिपदा".to_string()),
        event: None,
        day: to_native(n),
        day_in_en: n.to_string(),
        en: ((n + 12) % 30 + 1).to_string(),
    }
}

/// `count` well-formed sequential days starting at 1.
pub fn make_days(count: u32) -> Vec<CalendarDay> {
    (1..=count).map(make_day).collect()
}

/// A 30-day month.
pub fn make_month(month: u32) -> CalendarMonth {
    CalendarMonth::new(month, make_days(30))
}

/// Twelve 30-day months numbered 1 to 12.
pub fn make_year() -> CalendarYear {
    (1..=12).map(make_month).collect()
}

// ---------------------------------------------------------------------------
// MockFetcherFactory / MockPageFetcher
// ---------------------------------------------------------------------------

type Response = Result<Vec<CalendarDay>, AppError>;

/// Shared record of what the mock fetcher was asked to do.
#[derive(Default)]
pub struct FetchLog {
    pub connects: usize,
    pub requests: Vec<(i32, u32)>,
    pub closes: usize,
}

/// Mock factory whose fetchers pop scripted responses.
///
/// When the script runs out, fetchers return 30 well-formed days.
#[derive(Clone)]
pub struct MockFetcherFactory {
    responses: Arc<Mutex<VecDeque<Response>>>,
    connect_error: Arc<Mutex<Option<AppError>>>,
    pub log: Arc<Mutex<FetchLog>>,
}

impl MockFetcherFactory {
    /// Every fetch succeeds with 30 days.
    pub fn new() -> Self {
        Self::with_responses(Vec::new())
    }

    pub fn with_responses(responses: Vec<Response>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses.into())),
            connect_error: Arc::new(Mutex::new(None)),
            log: Arc::new(Mutex::new(FetchLog::default())),
        }
    }

    pub fn with_error(error: AppError) -> Self {
        Self::with_responses(vec![Err(error)])
    }

    /// Factory whose `connect` fails once with `error`.
    pub fn with_connect_error(error: AppError) -> Self {
        let factory = Self::new();
        *factory.connect_error.lock().unwrap() = Some(error);
        factory
    }
}

impl FetcherFactory for MockFetcherFactory {
    type Fetcher = MockPageFetcher;

    async fn connect(&self) -> Result<MockPageFetcher, AppError> {
        self.log.lock().unwrap().connects += 1;
        if let Some(e) = self.connect_error.lock().unwrap().take() {
            return Err(e);
        }
        Ok(MockPageFetcher {
            responses: Arc::clone(&self.responses),
            log: Arc::clone(&self.log),
        })
    }
}

pub struct MockPageFetcher {
    responses: Arc<Mutex<VecDeque<Response>>>,
    log: Arc<Mutex<FetchLog>>,
}

impl PageFetcher for MockPageFetcher {
    async fn fetch_month(&mut self, year: i32, month: u32) -> Result<Vec<CalendarDay>, AppError> {
        self.log.lock().unwrap().requests.push((year, month));
        let next = self.responses.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(make_days(30)))
    }

    async fn close(self) {
        self.log.lock().unwrap().closes += 1;
    }
}
