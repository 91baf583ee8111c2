use super::types::{PricePoint, PriceSeries};
use super::HistoryProvider;
use crate::errors::FeedError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Url};
use std::time::Duration;

/// Yahoo Finance chart API client. One request per `fetch_history` call;
/// retrying is the fetcher's job.
#[derive(Clone)]
pub struct YahooChartClient {
    client: Client,
    base_url: String,
}

impl YahooChartClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .user_agent("Mozilla/5.0 (compatible; rusty_premium/0.1)")
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn chart_url(&self, symbol: &str, period: &str, interval: &str) -> Result<Url, FeedError> {
        let mut url = Url::parse(&format!("{}/v8/finance/chart", self.base_url))
            .map_err(|e| FeedError::Parse(format!("base url: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| FeedError::Parse("base url cannot carry a path".into()))?
            .push(symbol);
        url.query_pairs_mut()
            .append_pair("range", period)
            .append_pair("interval", interval);
        Ok(url)
    }
}

#[async_trait]
impl HistoryProvider for YahooChartClient {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    async fn fetch_history(
        &self,
        symbol: &str,
        period: &str,
        interval: &str,
    ) -> Result<PriceSeries, FeedError> {
        let url = self.chart_url(symbol, period, interval)?;

        let resp = self.client.get(url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FeedError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await?;
        parse_chart(&body)
    }
}

// Chart response shape (trimmed):
// {
//   "chart": {
//     "result": [{
//       "timestamp": [1700000000, 1700086400],
//       "indicators": { "quote": [{ "close": [189.7, null] }] }
//     }],
//     "error": null
//   }
// }

#[derive(serde::Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(serde::Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(serde::Deserialize)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(serde::Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(serde::Deserialize)]
struct Indicators {
    quote: Vec<QuoteBlock>,
}

#[derive(serde::Deserialize)]
struct QuoteBlock {
    close: Option<Vec<Option<f64>>>,
}

/// Parse a chart payload into a series. Rows with a null close (halts,
/// partial bars) are dropped.
fn parse_chart(body: &str) -> Result<PriceSeries, FeedError> {
    let resp: ChartResponse = serde_json::from_str(body)?;

    if let Some(err) = resp.chart.error {
        return Err(FeedError::Upstream(format!(
            "{}: {}",
            err.code.unwrap_or_default(),
            err.description.unwrap_or_default()
        )));
    }

    let Some(result) = resp.chart.result.and_then(|r| r.into_iter().next()) else {
        return Err(FeedError::Empty);
    };

    let timestamps = result.timestamp.unwrap_or_default();
    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .and_then(|q| q.close)
        .unwrap_or_default();

    if timestamps.len() != closes.len() {
        return Err(FeedError::Parse(format!(
            "{} timestamps vs {} closes",
            timestamps.len(),
            closes.len()
        )));
    }

    let mut points = Vec::with_capacity(timestamps.len());
    for (ts, close) in timestamps.into_iter().zip(closes) {
        let Some(close) = close else { continue };
        let timestamp = DateTime::<Utc>::from_timestamp(ts, 0)
            .ok_or_else(|| FeedError::Parse(format!("timestamp out of range: {ts}")))?;
        points.push(PricePoint { timestamp, close });
    }

    Ok(PriceSeries::new(points)?)
}
