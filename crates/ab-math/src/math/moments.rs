//! Population moments and z-score normalization.
//!
//! All callers in this workspace normalize a set of samples against moments
//! computed over that same set, so the population convention (divide by n)
//! is used throughout: it makes the z-scores of a pool average to exactly
//! zero with population standard deviation exactly one.

use serde::Serialize;

/// First and second population moments of a sample set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Moments {
    /// Number of samples.
    pub n: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// Population standard deviation (divide by n).
    pub std_dev: f64,
}

/// Compute population moments over a sample set.
///
/// Returns `None` for an empty input; variance of a single sample is
/// defined (zero) but rarely what a caller wants, so minimum-size policy
/// is left to callers.
pub fn population_moments(values: &[f64]) -> Option<Moments> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some(Moments {
        n: values.len(),
        mean,
        std_dev: variance.sqrt(),
    })
}

/// Number of standard deviations `value` sits from `mean`.
///
/// Callers must guard `std_dev > 0`; this function does not divide by zero
/// on their behalf.
pub fn z_score(value: f64, mean: f64, std_dev: f64) -> f64 {
    debug_assert!(std_dev > 0.0, "z_score requires positive std_dev");
    (value - mean) / std_dev
}

/// Map a z-score onto a target distribution via the affine transform
/// `z * std_dev + mean`.
pub fn from_z(z: f64, mean: f64, std_dev: f64) -> f64 {
    z * std_dev + mean
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn moments_of_known_set() {
        // Population std of {2, 4, 4, 4, 5, 5, 7, 9} is exactly 2.
        let m = population_moments(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(m.n, 8);
        assert!(approx_eq(m.mean, 5.0, 1e-12));
        assert!(approx_eq(m.std_dev, 2.0, 1e-12));
    }

    #[test]
    fn moments_empty_is_none() {
        assert!(population_moments(&[]).is_none());
    }

    #[test]
    fn moments_single_sample_has_zero_std() {
        let m = population_moments(&[42.0]).unwrap();
        assert_eq!(m.n, 1);
        assert!(approx_eq(m.mean, 42.0, 1e-12));
        assert!(approx_eq(m.std_dev, 0.0, 1e-12));
    }

    #[test]
    fn z_score_round_trips_through_from_z() {
        let z = z_score(8.0, 5.0, 1.5);
        assert!(approx_eq(from_z(z, 5.0, 1.5), 8.0, 1e-12));
    }

    #[test]
    fn normalized_pool_has_unit_moments() {
        let samples = [13.0, 7.0, 42.0, 19.0, 3.0, 28.0];
        let m = population_moments(&samples).unwrap();
        let zs: Vec<f64> = samples
            .iter()
            .map(|v| z_score(*v, m.mean, m.std_dev))
            .collect();
        let zm = population_moments(&zs).unwrap();
        assert!(approx_eq(zm.mean, 0.0, 1e-12));
        assert!(approx_eq(zm.std_dev, 1.0, 1e-12));
    }

    proptest! {
        #[test]
        fn prop_mean_within_sample_range(values in prop::collection::vec(-1e6f64..1e6, 1..64)) {
            let m = population_moments(&values).unwrap();
            let lo = values.iter().cloned().fold(f64::INFINITY, f64::min);
            let hi = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            prop_assert!(m.mean >= lo - 1e-6 && m.mean <= hi + 1e-6);
        }

        #[test]
        fn prop_std_dev_non_negative(values in prop::collection::vec(-1e6f64..1e6, 1..64)) {
            let m = population_moments(&values).unwrap();
            prop_assert!(m.std_dev >= 0.0);
        }

        #[test]
        fn prop_shift_invariant_std(values in prop::collection::vec(-1e3f64..1e3, 2..32), shift in -1e3f64..1e3) {
            let m = population_moments(&values).unwrap();
            let shifted: Vec<f64> = values.iter().map(|v| v + shift).collect();
            let ms = population_moments(&shifted).unwrap();
            prop_assert!(approx_eq(m.std_dev, ms.std_dev, 1e-6));
        }

        #[test]
        fn prop_affine_round_trip(value in -1e3f64..1e3, mean in -1e3f64..1e3, std in 0.01f64..1e3) {
            let z = z_score(value, mean, std);
            prop_assert!(approx_eq(from_z(z, mean, std), value, 1e-6));
        }
    }
}
