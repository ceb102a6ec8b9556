use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use patro_core::config::ScrapeConfig;
use patro_core::error::AppError;
use patro_core::models::CalendarDay;
use patro_core::traits::{FetcherFactory, PageFetcher};
use tokio::task::JoinHandle;
use url::Url;

use crate::fetcher::month_url;
use crate::parser::CalendarPageParser;

/// Launches a headless Chromium per session and renders month pages before
/// extracting them.
///
/// Use this when the calendar grid is filled in by JavaScript. Navigation
/// failures are returned unclassified so the orchestrator can tell timeouts
/// from other transport errors.
#[derive(Clone)]
pub struct BrowserFetcherFactory {
    base_url: Url,
    timeout: Duration,
    wait_for: String,
    parser: Arc<CalendarPageParser>,
}

impl BrowserFetcherFactory {
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| AppError::config(format!("Invalid base URL '{base_url}': {e}")))?;
        Ok(Self {
            base_url,
            timeout: Duration::from_secs(30),
            wait_for: "ul.dates".to_string(),
            parser: Arc::new(CalendarPageParser::new()?),
        })
    }

    pub fn from_config(config: &ScrapeConfig) -> Result<Self, AppError> {
        Ok(Self::new(&config.base_url)?.with_timeout(config.timeout()))
    }

    /// Navigation timeout per month page.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Element that must be present before the DOM is read.
    pub fn wait_for(mut self, selector: impl Into<String>) -> Self {
        self.wait_for = selector.into();
        self
    }

    /// Real Chrome/Chromium binary, if one is installed somewhere known.
    ///
    /// The snap wrapper at `/snap/bin/chromium` drops headless flags, so the
    /// binary inside the snap is preferred. `CHROME_BIN` overrides the search.
    fn find_chrome_binary() -> Option<PathBuf> {
        if let Ok(p) = std::env::var("CHROME_BIN") {
            let path = PathBuf::from(p);
            if path.exists() {
                return Some(path);
            }
        }

        [
            "/snap/chromium/current/usr/lib/chromium-browser/chrome",
            "/var/lib/flatpak/exports/bin/org.chromium.Chromium",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/google-chrome",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
        ]
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
    }
}

impl FetcherFactory for BrowserFetcherFactory {
    type Fetcher = BrowserPageFetcher;

    async fn connect(&self) -> Result<BrowserPageFetcher, AppError> {
        let mut builder = BrowserConfig::builder().no_sandbox().disable_default_args();
        if let Some(bin) = Self::find_chrome_binary() {
            tracing::info!("Using Chrome binary: {}", bin.display());
            builder = builder.chrome_executable(bin);
        }

        let config = builder
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--no-first-run")
            .build()
            .map_err(|e| AppError::network(format!("Browser config error: {e}")))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| AppError::network(format!("Failed to launch browser: {e}")))?;

        // The CDP connection only makes progress while the handler is polled.
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    tracing::warn!("Browser CDP handler error: {event:?}");
                    break;
                }
            }
        });

        Ok(BrowserPageFetcher {
            browser,
            handler,
            factory: self.clone(),
        })
    }
}

/// One browser process. Each month opens and closes its own tab.
pub struct BrowserPageFetcher {
    browser: Browser,
    handler: JoinHandle<()>,
    factory: BrowserFetcherFactory,
}

impl BrowserPageFetcher {
    async fn render(&self, url: &Url) -> Result<String, AppError> {
        let page = self
            .browser
            .new_page(url.as_str())
            .await
            .map_err(|e| AppError::unclassified(format!("Failed to navigate to {url}: {e}")))?;

        let rendered = async {
            page.find_element(self.factory.wait_for.as_str())
                .await
                .map_err(|e| AppError::unclassified(format!("Calendar grid did not render: {e}")))?;
            page.content()
                .await
                .map_err(|e| AppError::unclassified(format!("Failed to read page content: {e}")))
        }
        .await;

        if let Err(e) = page.close().await {
            tracing::debug!(error = %e, "Failed to close tab");
        }
        rendered
    }
}

impl PageFetcher for BrowserPageFetcher {
    async fn fetch_month(&mut self, year: i32, month: u32) -> Result<Vec<CalendarDay>, AppError> {
        let url = month_url(&self.factory.base_url, year, month)?;
        let timeout = self.factory.timeout;

        let html = match tokio::time::timeout(timeout, self.render(&url)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(AppError::unclassified(format!(
                    "Navigation timeout of {} ms exceeded for {url}",
                    timeout.as_millis()
                )));
            }
        };

        self.factory.parser.parse(&html).map_err(|e| {
            AppError::parsing(format!("{year}/{month:02}: {}", e.message())).with_source(e)
        })
    }

    async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            tracing::warn!(error = %e, "Failed to close browser");
        }
        if let Err(e) = self.browser.wait().await {
            tracing::debug!(error = %e, "Browser process did not exit cleanly");
        }
        self.handler.abort();
        tracing::info!("Browser closed");
    }
}
