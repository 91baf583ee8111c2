use crate::errors::{EngineError, EngineResult};
use chrono::{DateTime, Utc};

/// One closing price observation.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
}

/// Chronologically ascending closing prices, unique timestamps, all closes > 0.
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Validates ordering, uniqueness and positivity. An empty series is
    /// valid here; the fetcher decides whether empty counts as a failure.
    pub fn new(points: Vec<PricePoint>) -> EngineResult<Self> {
        for (i, p) in points.iter().enumerate() {
            if !p.close.is_finite() || p.close <= 0.0 {
                return Err(EngineError::InvalidSeries(format!(
                    "non-positive close {} at {}",
                    p.close, p.timestamp
                )));
            }
            if i > 0 && points[i - 1].timestamp >= p.timestamp {
                return Err(EngineError::InvalidSeries(format!(
                    "timestamps not strictly ascending at {}",
                    p.timestamp
                )));
            }
        }
        Ok(Self { points })
    }

    /// Daily series starting at the unix epoch. Handy for stubs and tests.
    pub fn from_daily_closes(closes: &[f64]) -> EngineResult<Self> {
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                let timestamp = DateTime::<Utc>::from_timestamp(i as i64 * 86_400, 0)
                    .unwrap_or_default();
                PricePoint { timestamp, close }
            })
            .collect();
        Self::new(points)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn closes(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.close)
    }

    #[inline]
    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(secs: i64, close: f64) -> PricePoint {
        PricePoint {
            timestamp: DateTime::<Utc>::from_timestamp(secs, 0).unwrap(),
            close,
        }
    }

    #[test]
    fn test_accepts_ascending_positive() {
        let s = PriceSeries::new(vec![point(0, 10.0), point(60, 11.0), point(120, 9.5)]).unwrap();
        assert_eq!(s.len(), 3);
        assert_eq!(s.last().unwrap().close, 9.5);
        assert_eq!(s.closes().collect::<Vec<_>>(), vec![10.0, 11.0, 9.5]);
    }

    #[test]
    fn test_rejects_duplicate_timestamp() {
        let err = PriceSeries::new(vec![point(0, 10.0), point(0, 11.0)]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidSeries(_)));
    }

    #[test]
    fn test_rejects_descending() {
        let err = PriceSeries::new(vec![point(60, 10.0), point(0, 11.0)]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidSeries(_)));
    }

    #[test]
    fn test_rejects_non_positive_close() {
        assert!(PriceSeries::new(vec![point(0, 0.0)]).is_err());
        assert!(PriceSeries::new(vec![point(0, -1.0)]).is_err());
        assert!(PriceSeries::new(vec![point(0, f64::NAN)]).is_err());
    }

    #[test]
    fn test_empty_is_valid() {
        let s = PriceSeries::new(Vec::new()).unwrap();
        assert!(s.is_empty());
        assert!(s.last().is_none());
    }
}
