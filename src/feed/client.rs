use crate::config::FeedConfig;
use crate::error::{Result, SpotSyncError};
use crate::feed::{PriceFeed, PricePoint, SPOT_PRICE_PATH, decode_response};
use crate::logging::{StructuredLogger, get_logger};
use crate::time_window::FetchWindow;
use reqwest::header::{ACCEPT, USER_AGENT};
use std::time::Duration;

/// HTTP client for the spot price feed
pub struct FeedClient {
    http: reqwest::Client,
    base_url: String,
    price_list_key: String,
    logger: StructuredLogger,
}

impl FeedClient {
    /// Build a client with the configured request timeout
    pub fn new(cfg: &FeedConfig) -> Result<Self> {
        if cfg.timeout_secs == 0 {
            return Err(SpotSyncError::validation(
                "feed.timeout_secs",
                "Must be greater than 0",
            ));
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            price_list_key: cfg.price_list_key.clone(),
            logger: get_logger("feed"),
        })
    }

    /// Full URL of the spot price endpoint
    pub fn endpoint_url(&self) -> String {
        format!("{}{}", self.base_url, SPOT_PRICE_PATH)
    }
}

#[async_trait::async_trait]
impl PriceFeed for FeedClient {
    async fn fetch(&self, window: &FetchWindow) -> Result<Vec<PricePoint>> {
        let (from, to) = window.query_bounds();
        self.logger
            .with_field("from", &from)
            .with_field("to", &to)
            .debug("Requesting spot prices");

        let resp = self
            .http
            .get(self.endpoint_url())
            .query(&[
                ("priceListKey", self.price_list_key.as_str()),
                ("from", from.as_str()),
                ("to", to.as_str()),
            ])
            .header(ACCEPT, "application/json")
            .header(
                USER_AGENT,
                format!("spotsync/{}", env!("APP_VERSION")),
            )
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SpotSyncError::network(format!(
                "price feed returned HTTP {}",
                status
            )));
        }

        let body = resp.bytes().await?;
        let points = decode_response(&body)?;
        self.logger
            .with_field("points", points.len())
            .debug("Decoded spot price series");
        Ok(points)
    }
}
