//! Short-term trend estimate used for jump detection
//!
//! An exponential moving average of the raw signal. It never feeds the
//! thresholds directly; the recompute gate compares each new reading against
//! it to spot step changes (a load switching on) between periodic recomputes.

/// Exponential moving average seeded by the first reading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendEstimator {
    alpha: f64,
    estimate: Option<f64>,
}

impl TrendEstimator {
    /// Create an unseeded estimator with smoothing factor `alpha` in (0, 1)
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            estimate: None,
        }
    }

    /// Fold a reading into the estimate and return the new estimate
    ///
    /// The first call seeds the estimate with `value` exactly.
    pub fn update(&mut self, value: f64) -> f64 {
        let next = match self.estimate {
            None => value,
            Some(current) => (1.0 - self.alpha) * current + self.alpha * value,
        };
        self.estimate = Some(next);
        next
    }

    /// Current estimate, `None` until the first reading
    pub fn estimate(&self) -> Option<f64> {
        self.estimate
    }

    /// Smoothing factor
    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_update_seeds_exactly() {
        let mut trend = TrendEstimator::new(0.2);
        assert_eq!(trend.estimate(), None);
        assert_eq!(trend.update(42.5), 42.5);
        assert_eq!(trend.estimate(), Some(42.5));
    }

    #[test]
    fn follows_ema_recurrence() {
        let mut trend = TrendEstimator::new(0.2);
        trend.update(20.0);
        let next = trend.update(30.0);
        assert!((next - 22.0).abs() < 1e-12);
    }

    #[test]
    fn converges_to_constant_input() {
        let mut trend = TrendEstimator::new(0.2);
        trend.update(0.0);
        for _ in 0..200 {
            trend.update(20.0);
        }
        let estimate = trend.estimate().unwrap_or_default();
        assert!((estimate - 20.0).abs() < 1e-9);
    }
}
