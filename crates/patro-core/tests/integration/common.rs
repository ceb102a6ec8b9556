use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use patro_core::{AppError, CalendarDay, FetcherFactory, PageFetcher};

const DIGITS: [char; 10] = ['०', '१', '२', '३', '४', '५', '६', '७', '८', '९'];

pub fn native(n: u32) -> String {
    n.to_string()
        .chars()
        .map(|c| c.to_digit(10).map_or(c, |d| DIGITS[d as usize]))
        .collect()
}

pub fn days(count: u32) -> Vec<CalendarDay> {
    (1..=count)
        .map(|n| CalendarDay {
            is_holiday: n % 7 == 6,
            tithi: (n % 2 == 0).then(|| "एकादशी".to_string()),
            event: (n == 1).then(|| "नयाँ वर्ष".to_string()),
            day: native(n),
            day_in_en: n.to_string(),
            en: ((n + 13) % 31 + 1).to_string(),
        })
        .collect()
}

/// Serves a fixed page per (year, month); unknown units fail unclassified.
#[derive(Clone, Default)]
pub struct SiteFactory {
    pages: Arc<HashMap<(i32, u32), Vec<CalendarDay>>>,
    pub fetched: Arc<Mutex<Vec<(i32, u32)>>>,
    pub closed: Arc<Mutex<bool>>,
}

impl SiteFactory {
    pub fn new(pages: impl IntoIterator<Item = ((i32, u32), Vec<CalendarDay>)>) -> Self {
        Self {
            pages: Arc::new(pages.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Every month of `years` present with `count` days.
    pub fn full(years: &[i32], count: u32) -> Self {
        Self::new(
            years
                .iter()
                .flat_map(|&y| (1..=12).map(move |m| ((y, m), days(count)))),
        )
    }
}

pub struct SitePage {
    site: SiteFactory,
}

impl FetcherFactory for SiteFactory {
    type Fetcher = SitePage;

    async fn connect(&self) -> Result<SitePage, AppError> {
        Ok(SitePage { site: self.clone() })
    }
}

impl PageFetcher for SitePage {
    async fn fetch_month(&mut self, year: i32, month: u32) -> Result<Vec<CalendarDay>, AppError> {
        self.site.fetched.lock().unwrap().push((year, month));
        self.site
            .pages
            .get(&(year, month))
            .cloned()
            .ok_or_else(|| AppError::unclassified(format!("HTTP 404 for {year}/{month}")))
    }

    async fn close(self) {
        *self.site.closed.lock().unwrap() = true;
    }
}
