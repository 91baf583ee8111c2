pub mod fetcher;
pub mod types;
pub mod yahoo;

use crate::errors::FeedError;
use async_trait::async_trait;
use types::PriceSeries;

/// Upstream history capability. One call is one attempt; retries live in
/// `fetcher::MarketDataFetcher`.
///
/// Send + Sync required so fetches can run concurrently on tokio.
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Closing prices for `symbol` over `period` sampled at `interval`
    /// (provider notation, e.g. "1y" / "1d").
    async fn fetch_history(
        &self,
        symbol: &str,
        period: &str,
        interval: &str,
    ) -> Result<PriceSeries, FeedError>;
}
