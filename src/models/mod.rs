pub mod black_scholes;
pub mod volatility;

use crate::errors::{EngineError, EngineResult};
use std::str::FromStr;

/// European option flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionFlavor {
    Call,
    Put,
}

impl std::fmt::Display for OptionFlavor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Call => write!(f, "Call"),
            Self::Put => write!(f, "Put"),
        }
    }
}

impl FromStr for OptionFlavor {
    type Err = EngineError;

    fn from_str(s: &str) -> EngineResult<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "C" | "CALL" => Ok(Self::Call),
            "P" | "PUT" => Ok(Self::Put),
            other => Err(EngineError::InvalidParameters(format!(
                "unknown option flavor: {other:?} (expected C or P)"
            ))),
        }
    }
}

/// Everything the formula needs. No field has a default.
#[derive(Debug, Clone, Copy)]
pub struct PricingRequest {
    pub spot: f64,
    pub strike: f64,
    /// Years to expiry.
    pub maturity: f64,
    /// Continuously compounded, decimal (0.045 = 4.5%). May be negative.
    pub rate: f64,
    /// Annualized, decimal.
    pub volatility: f64,
    pub flavor: OptionFlavor,
}

/// Validated request with the shared sub-expressions precomputed.
#[derive(Debug, Clone, Copy)]
pub struct ModelParams {
    pub spot: f64,
    pub strike: f64,
    pub maturity: f64,
    // Precomputed
    pub ln_s_k: f64,
    pub sigma_sqrt_t: f64,
    pub half_sigma_sq: f64,
    pub discount: f64,
    pub rate: f64,
}

impl ModelParams {
    /// Rejects anything that would put NaN or infinity into the formula.
    pub fn new(req: &PricingRequest) -> EngineResult<Self> {
        let check_positive = |name: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(EngineError::InvalidParameters(format!("{name} must be > 0, got {v}")))
            }
        };
        check_positive("spot", req.spot)?;
        check_positive("strike", req.strike)?;
        check_positive("maturity", req.maturity)?;
        check_positive("volatility", req.volatility)?;
        if !req.rate.is_finite() {
            return Err(EngineError::InvalidParameters(format!(
                "rate must be finite, got {}",
                req.rate
            )));
        }

        let sigma_sqrt_t = req.volatility * req.maturity.sqrt();
        if sigma_sqrt_t <= 0.0 {
            // Subnormal sigma * sqrt(T) underflows to zero.
            return Err(EngineError::InvalidParameters(format!(
                "sigma * sqrt(T) underflows: sigma={}, T={}",
                req.volatility, req.maturity
            )));
        }

        let discount = (-req.rate * req.maturity).exp();
        if !discount.is_finite() || discount <= 0.0 {
            // e^(-rT) overflowed or underflowed; K*e^(-rT) is meaningless.
            return Err(EngineError::InvalidParameters(format!(
                "discount factor e^(-rT) out of range: r={}, T={}",
                req.rate, req.maturity
            )));
        }

        Ok(Self {
            spot: req.spot,
            strike: req.strike,
            maturity: req.maturity,
            ln_s_k: (req.spot / req.strike).ln(),
            sigma_sqrt_t,
            half_sigma_sq: 0.5 * req.volatility * req.volatility,
            discount,
            rate: req.rate,
        })
    }
}

/// All pricing models implement this trait.
/// price() must be a pure function: deterministic output from inputs only.
pub trait PricingModel: Send + Sync {
    fn name(&self) -> &'static str;

    /// Theoretical premium, never negative. Fails with `InvalidParameters`
    /// instead of returning NaN or infinity.
    fn price(&self, req: &PricingRequest) -> EngineResult<f64>;
}
