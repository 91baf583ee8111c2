use super::types::PriceSeries;
use super::HistoryProvider;
use crate::errors::{EngineError, EngineResult, FeedError};
use std::time::Duration;

/// Default pause between failed attempts.
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(2);

/// Default attempt budget per symbol.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Bounded-retry history fetcher.
///
/// Fixed backoff between failures: no jitter, no growth. The worst case
/// blocks the calling task for (max_attempts - 1) * backoff.
pub struct MarketDataFetcher<P> {
    provider: P,
    backoff: Duration,
}

impl<P: HistoryProvider> MarketDataFetcher<P> {
    pub fn new(provider: P) -> Self {
        Self::with_backoff(provider, DEFAULT_BACKOFF)
    }

    pub fn with_backoff(provider: P, backoff: Duration) -> Self {
        Self { provider, backoff }
    }

    #[inline]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Fetch a non-empty series, retrying provider errors and empty
    /// responses. Returns `DataUnavailable` after `max_attempts` consecutive
    /// failures. A budget of 0 still makes one attempt.
    pub async fn fetch(
        &self,
        symbol: &str,
        period: &str,
        interval: &str,
        max_attempts: u32,
    ) -> EngineResult<PriceSeries> {
        let attempts = max_attempts.max(1);
        let mut last_error: Option<FeedError> = None;

        for attempt in 1..=attempts {
            let outcome = match self.provider.fetch_history(symbol, period, interval).await {
                Ok(series) if !series.is_empty() => Ok(series),
                Ok(_) => Err(FeedError::Empty),
                Err(e) => Err(e),
            };

            match outcome {
                Ok(series) => {
                    tracing::debug!(
                        symbol = %symbol,
                        provider = self.provider.name(),
                        attempt,
                        points = series.len(),
                        "history fetched"
                    );
                    return Ok(series);
                }
                Err(e) => {
                    tracing::debug!(
                        symbol = %symbol,
                        provider = self.provider.name(),
                        attempt,
                        max_attempts = attempts,
                        error = %e,
                        "history fetch failed"
                    );
                    last_error = Some(e);
                }
            }

            if attempt < attempts {
                tokio::time::sleep(self.backoff).await;
            }
        }

        Err(EngineError::DataUnavailable {
            symbol: symbol.to_string(),
            attempts,
            last_error: last_error.map(|e| e.to_string()),
        })
    }
}
