use std::sync::Arc;
use std::time::Duration;

use patro_core::config::ScrapeConfig;
use patro_core::error::AppError;
use patro_core::models::CalendarDay;
use patro_core::traits::{FetcherFactory, PageFetcher};
use reqwest::{Client, StatusCode};
use url::Url;

use crate::parser::CalendarPageParser;

const USER_AGENT: &str = "Patro/0.1 (calendar archiver)";

/// URL of one month page: `{base}/{year}/{month}/`.
pub fn month_url(base: &Url, year: i32, month: u32) -> Result<Url, AppError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| AppError::config(format!("Base URL '{base}' cannot hold a path")))?
        .pop_if_empty()
        .push(&year.to_string())
        .push(&month.to_string())
        .push("");
    Ok(url)
}

/// Builds [`HttpPageFetcher`]s that download month pages with reqwest and
/// extract them with [`CalendarPageParser`].
#[derive(Clone)]
pub struct HttpFetcherFactory {
    base_url: Url,
    timeout: Duration,
    max_retries: u32,
    retry_delay: Duration,
    parser: Arc<CalendarPageParser>,
}

impl HttpFetcherFactory {
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| AppError::config(format!("Invalid base URL '{base_url}': {e}")))?;
        match base_url.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(AppError::config(format!(
                    "URL scheme '{scheme}' is not allowed (only http/https)"
                )));
            }
        }

        Ok(Self {
            base_url,
            timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_delay: Duration::from_millis(500),
            parser: Arc::new(CalendarPageParser::new()?),
        })
    }

    /// Factory honoring `baseUrl`, `timeout` and `maxRetries`.
    pub fn from_config(config: &ScrapeConfig) -> Result<Self, AppError> {
        Ok(Self::new(&config.base_url)?
            .with_timeout(config.timeout())
            .with_max_retries(config.max_retries))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Extra attempts for transport failures within a single fetch.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Base pause between retries; attempt `n` waits `n` times this.
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

impl FetcherFactory for HttpFetcherFactory {
    type Fetcher = HttpPageFetcher;

    async fn connect(&self) -> Result<HttpPageFetcher, AppError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(self.timeout)
            .build()
            .map_err(|e| {
                AppError::network(format!("Failed to build HTTP client: {e}")).with_source(e)
            })?;

        tracing::debug!(base_url = %self.base_url, "HTTP client ready");
        Ok(HttpPageFetcher {
            client,
            factory: self.clone(),
        })
    }
}

/// One HTTP session. Holds a pooled reqwest client.
pub struct HttpPageFetcher {
    client: Client,
    factory: HttpFetcherFactory,
}

impl HttpPageFetcher {
    async fn download(&self, url: &Url) -> Result<String, AppError> {
        let timeout_ms = self.factory.timeout.as_millis();
        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            let err = if e.is_timeout() {
                AppError::timeout(format!("Request timed out after {timeout_ms} ms for {url}"))
            } else if e.is_connect() {
                AppError::network(format!("Connection failed: {e}"))
            } else {
                AppError::unclassified(e.to_string())
            };
            err.with_source(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = format!("HTTP {} for {url}", status.as_u16());
            return Err(if is_transient(status) {
                AppError::network(message)
            } else {
                AppError::unclassified(message)
            });
        }

        response.text().await.map_err(|e| {
            let err = if e.is_timeout() {
                AppError::timeout(format!("Timed out reading body of {url}"))
            } else {
                AppError::network(format!("Failed to read response body: {e}"))
            };
            err.with_source(e)
        })
    }
}

fn is_transient(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

impl PageFetcher for HttpPageFetcher {
    async fn fetch_month(&mut self, year: i32, month: u32) -> Result<Vec<CalendarDay>, AppError> {
        let url = month_url(&self.factory.base_url, year, month)?;

        let mut attempt = 0;
        let html = loop {
            match self.download(&url).await {
                Ok(html) => break html,
                Err(e) if e.is_retryable() && attempt < self.factory.max_retries => {
                    attempt += 1;
                    let pause = self.factory.retry_delay * attempt;
                    tracing::warn!(
                        year,
                        month,
                        attempt,
                        delay_ms = pause.as_millis() as u64,
                        error = %e,
                        "Retrying month page"
                    );
                    tokio::time::sleep(pause).await;
                }
                Err(e) => return Err(e),
            }
        };

        let days = self.factory.parser.parse(&html).map_err(|e| {
            AppError::parsing(format!("{year}/{month:02}: {}", e.message())).with_source(e)
        })?;
        tracing::debug!(year, month, days = days.len(), "Parsed month page");
        Ok(days)
    }

    async fn close(self) {
        tracing::debug!("HTTP session closed");
    }
}
