use std::time::Duration;

use pricewatch_core::error::AppError;
use pricewatch_core::traits::Fetcher;
use reqwest::Client;
use url::Url;

/// Where and how the fetcher talks to the source site.
///
/// `list_url` is the region-selectable listing page (`?site=` appended per
/// region); `page_url` is the main pricing page whose navigation carries
/// category data.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub list_url: String,
    pub page_url: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            list_url: "https://www.datadoghq.com/pricing/list/".to_string(),
            page_url: "https://www.datadoghq.com/pricing/".to_string(),
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl FetchConfig {
    /// Read overrides from the environment.
    ///
    /// - `PRICEWATCH_LIST_URL` / `PRICEWATCH_PAGE_URL` (optional)
    /// - `PRICEWATCH_HTTP_TIMEOUT_SECS` (optional, defaults to 30)
    pub fn from_env() -> Result<Self, AppError> {
        let mut config = Self::default();
        if let Ok(list_url) = std::env::var("PRICEWATCH_LIST_URL") {
            config.list_url = validated_url(&list_url)?;
        }
        if let Ok(page_url) = std::env::var("PRICEWATCH_PAGE_URL") {
            config.page_url = validated_url(&page_url)?;
        }
        if let Ok(raw) = std::env::var("PRICEWATCH_HTTP_TIMEOUT_SECS") {
            let secs: u64 = raw.parse().map_err(|_| {
                AppError::ConfigError(format!(
                    "Invalid PRICEWATCH_HTTP_TIMEOUT_SECS '{raw}': must be a positive integer"
                ))
            })?;
            if secs == 0 {
                return Err(AppError::ConfigError(
                    "PRICEWATCH_HTTP_TIMEOUT_SECS must be at least 1".into(),
                ));
            }
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}

fn validated_url(raw: &str) -> Result<String, AppError> {
    let parsed =
        Url::parse(raw).map_err(|e| AppError::ConfigError(format!("Invalid URL '{raw}': {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(raw.to_string()),
        scheme => Err(AppError::ConfigError(format!(
            "URL scheme '{scheme}' is not allowed (only http/https)"
        ))),
    }
}

/// HTTP fetcher using reqwest.
///
/// Downloads the listing and category pages with a browser-like User-Agent
/// (the listing site serves a reduced page to unknown agents). Retry and
/// backoff policy belongs to callers.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    config: FetchConfig,
    timeout_secs: u64,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, AppError> {
        Self::with_config(FetchConfig::default())
    }

    pub fn with_config(config: FetchConfig) -> Result<Self, AppError> {
        let timeout_secs = config.timeout.as_secs();
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            config,
            timeout_secs,
        })
    }

    async fn get_text(&self, url: &str) -> Result<String, AppError> {
        tracing::debug!(url, "fetching");
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout(self.timeout_secs)
            } else if e.is_connect() {
                AppError::NetworkError(format!("Connection failed: {e}"))
            } else {
                AppError::HttpError(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::HttpError(format!(
                "HTTP {} for {}",
                status.as_u16(),
                url
            )));
        }

        response
            .text()
            .await
            .map_err(|e| AppError::HttpError(format!("Failed to read response body: {e}")))
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch_listing(&self, site: &str) -> Result<String, AppError> {
        self.get_text(&self.listing_url(site)).await
    }

    async fn fetch_category_page(&self) -> Result<String, AppError> {
        self.get_text(&self.config.page_url).await
    }

    fn listing_url(&self, site: &str) -> String {
        format!("{}?site={site}", self.config.list_url)
    }
}
