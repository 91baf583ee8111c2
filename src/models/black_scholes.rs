use crate::errors::{EngineError, EngineResult};
use crate::models::{ModelParams, OptionFlavor, PricingModel, PricingRequest};
use statrs::distribution::{ContinuousCDF, Normal};

/// Black-Scholes European option pricing.
///
/// d1 = (ln(S/K) + (r + sigma^2/2)*T) / (sigma * sqrt(T))
/// d2 = d1 - sigma * sqrt(T)
///
/// Call = S*Phi(d1) - K*e^(-rT)*Phi(d2)
/// Put  = K*e^(-rT)*Phi(-d2) - S*Phi(-d1)
///
/// No dividends, no early exercise.
pub struct BlackScholesEuropean {
    /// Standard normal distribution (created once, reused)
    normal: Normal,
}

impl BlackScholesEuropean {
    pub fn new() -> Self {
        Self {
            normal: Normal::standard(),
        }
    }

    /// (d1, d2) for already-validated parameters.
    #[inline]
    pub fn d1_d2(params: &ModelParams) -> (f64, f64) {
        let d1 = (params.ln_s_k + (params.rate + params.half_sigma_sq) * params.maturity)
            / params.sigma_sqrt_t;
        (d1, d1 - params.sigma_sqrt_t)
    }
}

impl Default for BlackScholesEuropean {
    fn default() -> Self {
        Self::new()
    }
}

impl PricingModel for BlackScholesEuropean {
    #[inline]
    fn name(&self) -> &'static str {
        "Black-Scholes"
    }

    fn price(&self, req: &PricingRequest) -> EngineResult<f64> {
        let params = ModelParams::new(req)?;
        let (d1, d2) = Self::d1_d2(&params);
        let pv_strike = params.strike * params.discount;

        let premium = match req.flavor {
            OptionFlavor::Call => {
                params.spot * self.normal.cdf(d1) - pv_strike * self.normal.cdf(d2)
            }
            OptionFlavor::Put => {
                pv_strike * self.normal.cdf(-d2) - params.spot * self.normal.cdf(-d1)
            }
        };

        if !premium.is_finite() {
            return Err(EngineError::InvalidParameters(format!(
                "non-finite premium {premium} for S={} K={} T={} r={} sigma={}",
                req.spot, req.strike, req.maturity, req.rate, req.volatility
            )));
        }

        // Deep OTM differences can round a hair below zero.
        Ok(premium.max(0.0))
    }
}
