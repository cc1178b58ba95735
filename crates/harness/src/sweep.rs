//! Attribute sweep planning.
//!
//! A sweep `(start, stop, step)` covers `start + k * step` for every `k`
//! that stays at or below `stop`. Short sweeps are written exhaustively;
//! longer ones (an LO swept in 1 Hz steps) are sampled at random with a
//! logged seed so that a failing run can be replayed.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index;
use sdr_hil_errors::{ValidationError, validate};
use tracing::info;

use crate::config::SweepConfig;

/// Values to write for one sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepPlan {
    /// Values in ascending order
    pub points: Vec<f64>,
    /// Number of steps the full sweep has
    pub total: u64,
    /// Seed used when the sweep was sampled
    pub seed: Option<u64>,
}

impl SweepPlan {
    /// Whether every step is covered.
    pub fn is_exhaustive(&self) -> bool {
        self.seed.is_none()
    }
}

/// Number of points in `start..=stop` by `step`.
#[allow(
    clippy::cast_possible_truncation,
    reason = "range checked against i64::MAX before the cast"
)]
pub fn step_count(attr: &str, start: f64, stop: f64, step: f64) -> Result<u64, ValidationError> {
    let invalid = |reason: &str| ValidationError::invalid_sweep(attr, reason);
    validate!(
        start.is_finite() && stop.is_finite() && step.is_finite(),
        invalid("bounds must be finite")
    );
    validate!(step > 0.0, invalid("step must be positive"));
    validate!(stop >= start, invalid("stop is below start"));
    // Tolerate representation error on the last step
    let steps = ((stop - start) / step + 1e-9).floor();
    validate!(steps < 9.0e15, invalid("too many steps"));
    u64::try_from(steps as i64)
        .map(|n| n + 1)
        .map_err(|e| invalid(&e.to_string()))
}

/// Plan the values for a sweep.
#[allow(
    clippy::cast_precision_loss,
    reason = "step indices stay below 2^53"
)]
pub fn plan(attr: &str, start: f64, stop: f64, step: f64, config: &SweepConfig) -> Result<SweepPlan, ValidationError> {
    let total = step_count(attr, start, stop, step)?;
    let value_at = |k: u64| start + step * k as f64;
    let max_points = config.max_points.max(1);

    match usize::try_from(total) {
        Ok(n) if n <= max_points => Ok(SweepPlan {
            points: (0..total).map(value_at).collect(),
            total,
            seed: None,
        }),
        Ok(n) => {
            let seed = config.seed.unwrap_or_else(rand::random);
            info!(attr, total, sampled = max_points, seed, "sampling sweep");
            let mut rng = StdRng::seed_from_u64(seed);
            let mut picked = index::sample(&mut rng, n, max_points).into_vec();
            picked.sort_unstable();
            Ok(SweepPlan {
                points: picked
                    .into_iter()
                    .map(|k| value_at(u64::try_from(k).unwrap_or(u64::MAX)))
                    .collect(),
                total,
                seed: Some(seed),
            })
        }
        Err(e) => Err(ValidationError::invalid_sweep(attr, e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn config(max_points: usize, seed: Option<u64>) -> SweepConfig {
        SweepConfig { max_points, seed }
    }

    #[test]
    fn test_hardwaregain_sweep_is_exhaustive() -> Result<(), ValidationError> {
        let plan = plan("tx_hardwaregain_chan0", -40.0, -7.0, 0.25, &SweepConfig::default())?;
        assert!(plan.is_exhaustive());
        assert_eq!(plan.total, 133);
        assert_eq!(plan.points.first().copied(), Some(-40.0));
        assert_eq!(plan.points.last().copied(), Some(-7.0));
        Ok(())
    }

    #[test]
    fn test_lo_sweep_is_sampled() -> Result<(), ValidationError> {
        let plan = plan("rx_lo", 2.3e9, 2.5e9, 1.0, &config(64, Some(7)))?;
        assert_eq!(plan.total, 200_000_001);
        assert_eq!(plan.points.len(), 64);
        assert_eq!(plan.seed, Some(7));
        assert!(plan.points.windows(2).all(|w| matches!(w, [a, b] if a < b)));
        Ok(())
    }

    #[test]
    fn test_same_seed_same_points() -> Result<(), ValidationError> {
        let a = plan("rx_lo", 2.3e9, 2.5e9, 1.0, &config(16, Some(42)))?;
        let b = plan("rx_lo", 2.3e9, 2.5e9, 1.0, &config(16, Some(42)))?;
        assert_eq!(a, b);
        Ok(())
    }

    #[test]
    fn test_invalid_sweeps() {
        assert!(step_count("x", 0.0, 1.0, 0.0).is_err());
        assert!(step_count("x", 1.0, 0.0, 0.1).is_err());
        assert!(step_count("x", f64::NAN, 1.0, 0.1).is_err());
    }

    #[test]
    fn test_single_point_sweep() -> Result<(), ValidationError> {
        assert_eq!(step_count("x", 5.0, 5.0, 1.0)?, 1);
        Ok(())
    }

    proptest! {
        #[test]
        fn prop_points_on_grid_and_in_range(
            start in -1000i32..1000,
            steps in 0u32..2000,
            max_points in 1usize..300,
            seed in any::<u64>(),
        ) {
            let start = f64::from(start);
            let stop = start + f64::from(steps) * 0.25;
            let plan = plan("attr", start, stop, 0.25, &config(max_points, Some(seed)))?;
            prop_assert_eq!(plan.total, u64::from(steps) + 1);
            prop_assert!(plan.points.len() <= max_points);
            for p in &plan.points {
                prop_assert!(*p >= start && *p <= stop);
                let k = (p - start) / 0.25;
                prop_assert!((k - k.round()).abs() < 1e-9);
            }
        }
    }
}
