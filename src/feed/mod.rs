//! Spot price feed integration
//!
//! Fetches the hourly spot price series for a [`FetchWindow`] and normalizes
//! it into [`PricePoint`]s. Any failure is terminal for the whole fetch; no
//! partial series is ever returned.

pub mod client;
pub mod decode;
pub mod types;

pub use client::FeedClient;
pub use decode::decode_response;
pub use types::PricePoint;

use crate::error::Result;
use crate::time_window::FetchWindow;

/// Endpoint path appended to the configured base URL
pub const SPOT_PRICE_PATH: &str = "/spot-price-anonymous";

/// Source of spot price series
#[async_trait::async_trait]
pub trait PriceFeed: Send + Sync {
    async fn fetch(&self, window: &FetchWindow) -> Result<Vec<PricePoint>>;
}
