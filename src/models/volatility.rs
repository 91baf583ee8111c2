use crate::errors::{EngineError, EngineResult};
use crate::market::types::PriceSeries;
use statrs::statistics::Statistics;

/// Trading days per year, the annualization factor for daily closes.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Close-to-close historical volatility.
///
/// sigma_annual = stdev(ln(P_i / P_{i-1})) * sqrt(periods_per_year)
///
/// Sample standard deviation (n - 1 denominator). Pure: same series in,
/// same estimate out.
#[derive(Debug, Clone, Copy)]
pub struct VolatilityEstimator {
    periods_per_year: f64,
}

impl VolatilityEstimator {
    pub fn new(periods_per_year: f64) -> EngineResult<Self> {
        if !periods_per_year.is_finite() || periods_per_year <= 0.0 {
            return Err(EngineError::Config(format!(
                "periods per year must be > 0, got {periods_per_year}"
            )));
        }
        Ok(Self { periods_per_year })
    }

    /// Annualization matching a provider sampling interval.
    pub fn for_interval(interval: &str) -> EngineResult<Self> {
        let periods = match interval {
            "1d" => TRADING_DAYS_PER_YEAR,
            "5d" => TRADING_DAYS_PER_YEAR / 5.0,
            "1wk" => 52.0,
            "1mo" => 12.0,
            "3mo" => 4.0,
            other => {
                return Err(EngineError::Config(format!(
                    "no annualization factor for interval {other:?}; set it explicitly"
                )))
            }
        };
        Self::new(periods)
    }

    #[inline]
    pub fn periods_per_year(&self) -> f64 {
        self.periods_per_year
    }

    /// Annualized volatility of `series`.
    ///
    /// Needs at least two log returns (three closes): a single return has no
    /// sample deviation.
    pub fn estimate(&self, series: &PriceSeries) -> EngineResult<f64> {
        let returns = log_returns(series);
        if returns.len() < 2 {
            return Err(EngineError::InsufficientData {
                points: series.len(),
            });
        }

        let per_period = returns.iter().std_dev();
        if !per_period.is_finite() {
            return Err(EngineError::InvalidSeries(format!(
                "non-finite return deviation over {} points",
                series.len()
            )));
        }

        Ok(per_period * self.periods_per_year.sqrt())
    }
}

impl Default for VolatilityEstimator {
    fn default() -> Self {
        Self {
            periods_per_year: TRADING_DAYS_PER_YEAR,
        }
    }
}

/// ln(P_i / P_{i-1}) for consecutive closes; n closes give n - 1 returns.
pub fn log_returns(series: &PriceSeries) -> Vec<f64> {
    series
        .points()
        .windows(2)
        .map(|w| (w[1].close / w[0].close).ln())
        .collect()
}
