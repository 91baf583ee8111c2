use crate::config::{AppConfig, RateBounds};
use crate::errors::{EngineError, EngineResult};
use crate::market::fetcher::MarketDataFetcher;
use crate::market::types::PriceSeries;
use crate::market::HistoryProvider;
use crate::models::black_scholes::BlackScholesEuropean;
use crate::models::volatility::VolatilityEstimator;
use crate::models::{OptionFlavor, PricingModel, PricingRequest};

/// What the caller asks for. Strike and maturity are validated by the
/// pricing model, not here.
#[derive(Debug, Clone)]
pub struct QuoteRequest {
    pub symbol: String,
    pub strike: f64,
    pub maturity: f64,
    pub flavor: OptionFlavor,
}

/// A priced option plus the market inputs that produced it.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Quote {
    pub symbol: String,
    pub flavor: OptionFlavor,
    pub spot: f64,
    pub strike: f64,
    pub maturity: f64,
    pub rate: f64,
    pub volatility: f64,
    pub price: f64,
    pub model: &'static str,
}

/// Where to fetch what, and how to turn it into model inputs.
#[derive(Debug, Clone)]
pub struct QuoteSettings {
    pub history_period: String,
    pub history_interval: String,
    pub rate_symbol: String,
    pub rate_period: String,
    pub max_attempts: u32,
    pub rate_bounds: RateBounds,
}

impl From<&AppConfig> for QuoteSettings {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            history_period: cfg.history_period.clone(),
            history_interval: cfg.history_interval.clone(),
            rate_symbol: cfg.rate_symbol.clone(),
            rate_period: cfg.rate_period.clone(),
            max_attempts: cfg.max_attempts,
            rate_bounds: cfg.rate_bounds,
        }
    }
}

/// fetch underlying + rate proxy -> estimate vol -> price.
/// All-or-nothing: any failure aborts the quote.
pub struct Quoter<P> {
    fetcher: MarketDataFetcher<P>,
    estimator: VolatilityEstimator,
    model: BlackScholesEuropean,
    settings: QuoteSettings,
}

impl<P: HistoryProvider> Quoter<P> {
    pub fn new(
        fetcher: MarketDataFetcher<P>,
        estimator: VolatilityEstimator,
        settings: QuoteSettings,
    ) -> Self {
        Self {
            fetcher,
            estimator,
            model: BlackScholesEuropean::new(),
            settings,
        }
    }

    pub fn from_config(provider: P, cfg: &AppConfig) -> EngineResult<Self> {
        Ok(Self::new(
            MarketDataFetcher::with_backoff(provider, cfg.backoff),
            VolatilityEstimator::new(cfg.periods_per_year)?,
            QuoteSettings::from(cfg),
        ))
    }

    pub async fn quote(&self, req: &QuoteRequest) -> EngineResult<Quote> {
        let s = &self.settings;

        // Independent series; fetch both at once.
        let (underlying, rate_series) = tokio::try_join!(
            self.fetcher
                .fetch(&req.symbol, &s.history_period, &s.history_interval, s.max_attempts),
            self.fetcher
                .fetch(&s.rate_symbol, &s.rate_period, &s.history_interval, s.max_attempts),
        )?;

        let spot = spot_price(&underlying)?;
        let rate = rate_from_yield_index(&rate_series, s.rate_bounds)?;
        let volatility = self.estimator.estimate(&underlying)?;

        tracing::debug!(
            symbol = %req.symbol,
            spot,
            rate,
            volatility,
            points = underlying.len(),
            "model inputs ready"
        );

        let price = self.model.price(&PricingRequest {
            spot,
            strike: req.strike,
            maturity: req.maturity,
            rate,
            volatility,
            flavor: req.flavor,
        })?;

        Ok(Quote {
            symbol: req.symbol.clone(),
            flavor: req.flavor,
            spot,
            strike: req.strike,
            maturity: req.maturity,
            rate,
            volatility,
            price,
            model: self.model.name(),
        })
    }
}

/// Latest close rounded to cents. Sub-cent closes (which would round to
/// zero) are returned unrounded.
pub fn spot_price(series: &PriceSeries) -> EngineResult<f64> {
    let last = series
        .last()
        .ok_or(EngineError::InsufficientData { points: 0 })?;
    let rounded = (last.close * 100.0).round() / 100.0;
    Ok(if rounded > 0.0 { rounded } else { last.close })
}

/// Decimal rate from a yield index quoted in percent (^TNX 4.25 -> 0.0425).
///
/// Only the latest close is used and its age is not checked.
pub fn rate_from_yield_index(series: &PriceSeries, bounds: RateBounds) -> EngineResult<f64> {
    let last = series
        .last()
        .ok_or(EngineError::InsufficientData { points: 0 })?;
    let rate = last.close / 100.0;
    if rate < bounds.min || rate > bounds.max {
        return Err(EngineError::RateOutOfBounds {
            rate,
            min: bounds.min,
            max: bounds.max,
        });
    }
    Ok(rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FeedError;
    use crate::market::fetcher::tests::StubProvider;
    use async_trait::async_trait;
    use std::time::Duration;

    /// Serves the underlying and the rate proxy by symbol.
    struct TwoSymbolProvider {
        underlying: Vec<f64>,
        rate_proxy: Vec<f64>,
    }

    #[async_trait]
    impl HistoryProvider for TwoSymbolProvider {
        fn name(&self) -> &'static str {
            "two-symbol"
        }

        async fn fetch_history(
            &self,
            symbol: &str,
            _period: &str,
            _interval: &str,
        ) -> Result<PriceSeries, FeedError> {
            let closes = if symbol == "^TNX" { &self.rate_proxy } else { &self.underlying };
            Ok(PriceSeries::from_daily_closes(closes)?)
        }
    }

    fn settings() -> QuoteSettings {
        QuoteSettings::from(&AppConfig::default())
    }

    #[tokio::test]
    async fn test_quote_end_to_end() {
        let provider = TwoSymbolProvider {
            underlying: vec![100.0, 102.0, 99.5, 101.0, 103.456],
            rate_proxy: vec![4.1, 4.25],
        };
        let quoter = Quoter::new(
            MarketDataFetcher::new(provider),
            VolatilityEstimator::default(),
            settings(),
        );
        let req = QuoteRequest {
            symbol: "AAPL".into(),
            strike: 100.0,
            maturity: 0.5,
            flavor: OptionFlavor::Call,
        };

        let quote = quoter.quote(&req).await.unwrap();

        assert_eq!(quote.spot, 103.46);
        assert!((quote.rate - 0.0425).abs() < 1e-12);
        assert!(quote.volatility > 0.0);
        assert_eq!(quote.model, "Black-Scholes");

        let expected = BlackScholesEuropean::new()
            .price(&PricingRequest {
                spot: 103.46,
                strike: 100.0,
                maturity: 0.5,
                rate: quote.rate,
                volatility: quote.volatility,
                flavor: OptionFlavor::Call,
            })
            .unwrap();
        assert_eq!(quote.price, expected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quote_fails_when_data_unavailable() {
        let quoter = Quoter::new(
            MarketDataFetcher::with_backoff(StubProvider::always_failing(), Duration::from_secs(2)),
            VolatilityEstimator::default(),
            settings(),
        );
        let req = QuoteRequest {
            symbol: "GONE".into(),
            strike: 10.0,
            maturity: 1.0,
            flavor: OptionFlavor::Put,
        };

        let err = quoter.quote(&req).await.unwrap_err();
        assert!(matches!(err, EngineError::DataUnavailable { .. }), "err={err:?}");
    }

    #[tokio::test]
    async fn test_quote_rejects_short_history() {
        let provider = TwoSymbolProvider {
            underlying: vec![100.0],
            rate_proxy: vec![4.0],
        };
        let quoter = Quoter::new(MarketDataFetcher::new(provider), VolatilityEstimator::default(), settings());
        let req = QuoteRequest {
            symbol: "NEW".into(),
            strike: 100.0,
            maturity: 1.0,
            flavor: OptionFlavor::Call,
        };

        let err = quoter.quote(&req).await.unwrap_err();
        assert!(matches!(err, EngineError::InsufficientData { points: 1 }));
    }

    #[tokio::test]
    async fn test_quote_rejects_flat_history() {
        let provider = TwoSymbolProvider {
            underlying: vec![100.0, 100.0, 100.0],
            rate_proxy: vec![4.0],
        };
        let quoter = Quoter::new(MarketDataFetcher::new(provider), VolatilityEstimator::default(), settings());
        let req = QuoteRequest {
            symbol: "PEG".into(),
            strike: 100.0,
            maturity: 1.0,
            flavor: OptionFlavor::Call,
        };

        let err = quoter.quote(&req).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidParameters(_)));
    }

    #[test]
    fn test_rate_proxy_scaling_and_bounds() {
        let bounds = RateBounds::default();
        let s = PriceSeries::from_daily_closes(&[3.9, 4.5]).unwrap();
        assert!((rate_from_yield_index(&s, bounds).unwrap() - 0.045).abs() < 1e-12);

        let absurd = PriceSeries::from_daily_closes(&[45.0]).unwrap();
        assert!(matches!(
            rate_from_yield_index(&absurd, bounds),
            Err(EngineError::RateOutOfBounds { .. })
        ));

        let empty = PriceSeries::new(Vec::new()).unwrap();
        assert!(rate_from_yield_index(&empty, bounds).is_err());
    }

    #[test]
    fn test_spot_rounds_to_cents() {
        let s = PriceSeries::from_daily_closes(&[10.0, 189.98765]).unwrap();
        assert_eq!(spot_price(&s).unwrap(), 189.99);
    }

    #[test]
    fn test_sub_cent_spot_not_rounded_to_zero() {
        let s = PriceSeries::from_daily_closes(&[0.004, 0.0031]).unwrap();
        assert_eq!(spot_price(&s).unwrap(), 0.0031);
    }

    #[tokio::test]
    async fn test_quote_sub_cent_underlying() {
        let provider = TwoSymbolProvider {
            underlying: vec![0.0040, 0.0042, 0.0039, 0.0041],
            rate_proxy: vec![4.0],
        };
        let quoter = Quoter::new(MarketDataFetcher::new(provider), VolatilityEstimator::default(), settings());
        let req = QuoteRequest {
            symbol: "PENNY".into(),
            strike: 0.004,
            maturity: 0.25,
            flavor: OptionFlavor::Call,
        };

        let quote = quoter.quote(&req).await.unwrap();
        assert_eq!(quote.spot, 0.0041);
        assert!(quote.price > 0.0);
    }
}
