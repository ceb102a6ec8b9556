pub mod fetcher;
pub mod parser;

#[cfg(feature = "browser")]
pub mod browser_fetcher;

#[cfg(feature = "browser")]
pub use browser_fetcher::{BrowserFetcherFactory, BrowserPageFetcher};
pub use fetcher::{HttpFetcherFactory, HttpPageFetcher, month_url};
pub use parser::{CalendarPageParser, PageSelectors};
