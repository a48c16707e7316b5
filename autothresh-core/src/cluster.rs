//! Two-Level Threshold Clustering
//!
//! ## Overview
//!
//! The signal models a bistable load: most of the time it sits near an OFF
//! level or near an ON level, with transitions in between. One-dimensional
//! two-means clustering recovers both levels from the window without any
//! labelled data, and the midpoint between them becomes the switching
//! threshold.
//!
//! ## Algorithm
//!
//! ```text
//! 1. c_lo = min(values), c_hi = max(values)
//! 2. repeat up to max_iterations:
//!      mid = (c_lo + c_hi) / 2
//!      A = { x <= mid },  B = { x > mid }
//!      empty A counts as {min}, empty B counts as {max}
//!      c_lo' = mean(A), c_hi' = mean(B)
//!      stop when both centroids moved less than convergence_epsilon
//! 3. lo, hi = sorted(c_lo, c_hi); reject if hi - lo < min_cluster_gap
//! 4. off = floor((lo + hi) / 2), on = off + 1
//! ```
//!
//! Groups are never materialised; each pass only accumulates sums and counts,
//! so clustering is allocation-free and O(n · iterations).
//!
//! Exactly two clusters, always. The load has two states and a general
//! k-means would leave the problem under-constrained.
//!
//! ## Outcomes
//!
//! Too few samples, a flat signal, centroids closer than the minimum gap, or
//! a midpoint beyond the integer threshold range are not errors: the
//! clusterer reports them and the stored thresholds stay as they were.

use crate::config::CalibratorConfig;
use crate::traits::ThresholdPair;

/// Result of one clustering attempt
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClusterOutcome {
    /// New thresholds were stored
    Changed(ThresholdPair),
    /// Clustering succeeded but matched the stored thresholds
    Unchanged(ThresholdPair),
    /// Fewer samples than the configured minimum
    InsufficientSamples {
        /// Configured minimum
        required: usize,
        /// Samples in the window
        available: usize,
    },
    /// `max - min` of the window is below the spread epsilon
    FlatSignal {
        /// Observed spread
        spread: f64,
    },
    /// Centroids closer than the minimum cluster gap
    ClustersTooClose {
        /// Observed centroid distance
        gap: f64,
    },
    /// Centroid midpoint does not fit an integer threshold pair
    ThresholdOutOfRange {
        /// Observed midpoint
        midpoint: f64,
    },
}

impl ClusterOutcome {
    /// Whether clustering produced a threshold pair (changed or not)
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Changed(_) | Self::Unchanged(_))
    }

    /// Whether the stored thresholds were replaced
    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Changed(_))
    }

    /// The pair clustering produced, if any
    pub fn thresholds(&self) -> Option<ThresholdPair> {
        match self {
            Self::Changed(pair) | Self::Unchanged(pair) => Some(*pair),
            _ => None,
        }
    }
}

/// Final centroids of a two-means run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Centroids {
    /// Lower (OFF level) centroid
    pub lo: f64,
    /// Upper (ON level) centroid
    pub hi: f64,
    /// Refinement passes executed
    pub iterations: usize,
}

/// One-dimensional two-means partitioner that owns the current thresholds
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdClusterer {
    min_samples: usize,
    min_cluster_gap: f64,
    spread_epsilon: f64,
    max_iterations: usize,
    convergence_epsilon: f64,
    thresholds: Option<ThresholdPair>,
}

impl ThresholdClusterer {
    /// Create a clusterer without thresholds
    pub fn new(config: &CalibratorConfig) -> Self {
        Self {
            min_samples: config.min_samples,
            min_cluster_gap: config.min_cluster_gap,
            spread_epsilon: config.spread_epsilon,
            max_iterations: config.max_iterations,
            convergence_epsilon: config.convergence_epsilon,
            thresholds: None,
        }
    }

    /// Currently stored thresholds
    pub fn thresholds(&self) -> Option<ThresholdPair> {
        self.thresholds
    }

    /// Derive thresholds from `values` and store them if they differ
    pub fn recompute(&mut self, values: &[f64]) -> ClusterOutcome {
        let pair = match self.derive(values) {
            Ok(pair) => pair,
            Err(outcome) => return outcome,
        };

        if self.thresholds == Some(pair) {
            ClusterOutcome::Unchanged(pair)
        } else {
            self.thresholds = Some(pair);
            ClusterOutcome::Changed(pair)
        }
    }

    /// Pure part of [`recompute`](Self::recompute): same values, same answer
    pub fn derive(&self, values: &[f64]) -> Result<ThresholdPair, ClusterOutcome> {
        if values.len() < self.min_samples {
            return Err(ClusterOutcome::InsufficientSamples {
                required: self.min_samples,
                available: values.len(),
            });
        }

        let Some((min, max)) = bounds(values) else {
            return Err(ClusterOutcome::InsufficientSamples {
                required: self.min_samples,
                available: 0,
            });
        };

        let spread = max - min;
        if spread < self.spread_epsilon {
            return Err(ClusterOutcome::FlatSignal { spread });
        }

        let centroids = two_means(
            values,
            min,
            max,
            self.max_iterations,
            self.convergence_epsilon,
        );
        let gap = centroids.hi - centroids.lo;
        if gap < self.min_cluster_gap {
            return Err(ClusterOutcome::ClustersTooClose { gap });
        }

        let midpoint = (centroids.lo + centroids.hi) / 2.0;
        ThresholdPair::from_midpoint(midpoint)
            .ok_or(ClusterOutcome::ThresholdOutOfRange { midpoint })
    }
}

/// Minimum and maximum of `values`, `None` when empty
fn bounds(values: &[f64]) -> Option<(f64, f64)> {
    let (&first, rest) = values.split_first()?;
    Some(rest.iter().fold((first, first), |(lo, hi), &x| {
        (if x < lo { x } else { lo }, if x > hi { x } else { hi })
    }))
}

/// Two-means refinement seeded at the window extremes
pub fn two_means(
    values: &[f64],
    min: f64,
    max: f64,
    max_iterations: usize,
    convergence_epsilon: f64,
) -> Centroids {
    let (mut c_lo, mut c_hi) = (min, max);
    let mut iterations = 0;

    while iterations < max_iterations {
        iterations += 1;
        let mid = (c_lo + c_hi) / 2.0;

        let (mut sum_lo, mut n_lo, mut sum_hi, mut n_hi) = (0.0, 0usize, 0.0, 0usize);
        for &x in values {
            if x <= mid {
                sum_lo += x;
                n_lo += 1;
            } else {
                sum_hi += x;
                n_hi += 1;
            }
        }

        // An empty group collapses onto the matching extreme
        let next_lo = if n_lo == 0 { min } else { sum_lo / n_lo as f64 };
        let next_hi = if n_hi == 0 { max } else { sum_hi / n_hi as f64 };

        let converged = libm::fabs(next_lo - c_lo) < convergence_epsilon
            && libm::fabs(next_hi - c_hi) < convergence_epsilon;
        c_lo = next_lo;
        c_hi = next_hi;
        if converged {
            break;
        }
    }

    let (lo, hi) = if c_lo <= c_hi { (c_lo, c_hi) } else { (c_hi, c_lo) };
    Centroids { lo, hi, iterations }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn clusterer() -> ThresholdClusterer {
        ThresholdClusterer::new(&CalibratorConfig::default())
    }

    fn bimodal() -> [f64; 20] {
        let mut values = [10.0; 20];
        for v in values.iter_mut().skip(10) {
            *v = 50.0;
        }
        values
    }

    #[test]
    fn canonical_bimodal_window() {
        let values = bimodal();
        let centroids = two_means(&values, 10.0, 50.0, 10, 1e-6);
        assert!((centroids.lo - 10.0).abs() < 1e-9);
        assert!((centroids.hi - 50.0).abs() < 1e-9);

        let mut clusterer = clusterer();
        let outcome = clusterer.recompute(&values);
        assert_eq!(outcome, ClusterOutcome::Changed(ThresholdPair::from_off(30)));
        assert_eq!(clusterer.thresholds().map(|t| (t.off(), t.on())), Some((30, 31)));
    }

    #[test]
    fn second_run_reports_unchanged() {
        let mut clusterer = clusterer();
        let values = bimodal();
        assert!(clusterer.recompute(&values).is_changed());

        let again = clusterer.recompute(&values);
        assert_eq!(again, ClusterOutcome::Unchanged(ThresholdPair::from_off(30)));
        assert!(again.is_success());
    }

    #[test]
    fn too_few_samples_is_a_no_op() {
        let mut clusterer = clusterer();
        let outcome = clusterer.recompute(&[10.0, 50.0, 10.0]);
        assert_eq!(
            outcome,
            ClusterOutcome::InsufficientSamples { required: 10, available: 3 }
        );
        assert_eq!(clusterer.thresholds(), None);
    }

    #[test]
    fn flat_signal_is_a_no_op() {
        let mut clusterer = clusterer();
        assert!(matches!(
            clusterer.recompute(&[7.0; 12]),
            ClusterOutcome::FlatSignal { .. }
        ));
        assert_eq!(clusterer.thresholds(), None);
    }

    #[test]
    fn narrow_spread_never_produces_thresholds() {
        let config = CalibratorConfig::default().with_min_samples(2);
        let mut clusterer = ThresholdClusterer::new(&config);

        let outcome = clusterer.recompute(&[100.0, 100.0, 100.0, 100.5]);
        assert!(matches!(outcome, ClusterOutcome::ClustersTooClose { gap } if gap < 1.0));
        assert_eq!(clusterer.thresholds(), None);
    }

    #[test]
    fn huge_readings_are_a_no_op() {
        let mut values = [1.0e19; 20];
        for v in values.iter_mut().skip(10) {
            *v = 2.0e19;
        }

        let mut clusterer = clusterer();
        assert!(matches!(
            clusterer.recompute(&values),
            ClusterOutcome::ThresholdOutOfRange { midpoint } if midpoint > 1.0e19
        ));
        assert_eq!(clusterer.thresholds(), None);

        // a usable window afterwards still calibrates
        assert!(clusterer.recompute(&bimodal()).is_changed());
        assert!(matches!(
            clusterer.recompute(&values),
            ClusterOutcome::ThresholdOutOfRange { .. }
        ));
        assert_eq!(clusterer.thresholds(), Some(ThresholdPair::from_off(30)));
    }

    #[test]
    fn failed_recompute_keeps_previous_thresholds() {
        let mut clusterer = clusterer();
        clusterer.recompute(&bimodal());

        clusterer.recompute(&[20.0; 15]);
        assert_eq!(clusterer.thresholds(), Some(ThresholdPair::from_off(30)));
    }

    #[test]
    fn uneven_clusters() {
        // 15 samples around 5, 5 samples around 95
        let mut values = [5.0; 20];
        for (i, v) in values.iter_mut().enumerate() {
            if i % 4 == 0 {
                *v = 95.0;
            }
        }
        let pair = clusterer().derive(&values).ok();
        assert_eq!(pair, Some(ThresholdPair::from_off(50)));
    }

    #[test]
    fn noisy_levels_converge() {
        let values: [f64; 12] = [
            9.5, 10.25, 10.0, 9.75, 10.5, 10.0, 49.0, 51.0, 50.5, 49.5, 50.0, 50.0,
        ];
        let centroids = two_means(&values, 9.5, 51.0, 10, 1e-6);
        assert!(centroids.iterations < 10);
        assert_eq!(
            clusterer().derive(&values).map(|t| t.off()).ok(),
            Some(30)
        );
    }

    proptest! {
        #[test]
        fn recompute_is_deterministic(
            values in proptest::collection::vec(-500.0f64..500.0, 0..64),
        ) {
            let first = clusterer().recompute(&values);
            let second = clusterer().recompute(&values);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn derived_pair_sits_between_centroids(
            low in 0.0f64..100.0,
            offset in 2.0f64..100.0,
            count in 5usize..30,
        ) {
            let mut values = Vec::new();
            values.extend(core::iter::repeat(low).take(count));
            values.extend(core::iter::repeat(low + offset).take(count));

            let pair = clusterer().derive(&values);
            prop_assert!(pair.is_ok());
            if let Ok(pair) = pair {
                prop_assert_eq!(pair.on(), pair.off() + 1);
                prop_assert!(pair.off() as f64 >= libm::floor(low));
                prop_assert!((pair.on() as f64) <= low + offset + 1.0);
            }
        }
    }
}
