//! Random number utilities.
//!
//! All randomness in the crate flows through a seedable [`StdRng`] so that
//! runs with a fixed seed are reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Error, Result};

/// Largest supported number of fractional digits.
///
/// `f64` carries roughly 15.9 significant decimal digits; rounding past this
/// point is meaningless.
pub const MAX_PRECISION: u32 = 15;

/// Creates a deterministic RNG from a seed.
pub fn create_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Largest magnitude below which every integer is exactly representable.
const EXACT_INTEGER_LIMIT: f64 = 9_007_199_254_740_992.0; // 2^53

/// Rounds `x` to `precision` fractional digits, half away from zero.
///
/// Values too large to carry `precision` fractional digits are returned
/// unchanged.
pub fn round_to(x: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    let scaled = x * factor;
    if !scaled.is_finite() || scaled.abs() >= EXACT_INTEGER_LIMIT {
        return x;
    }
    scaled.round() / factor
}

/// Draws a value uniformly from `[min, max]` and rounds it to `precision`
/// fractional digits.
///
/// The result always lies within `[min, max]`. If rounding pushes a draw
/// past a bound, the nearest grid value inside the interval is used
/// instead. When no value with `precision` digits exists in the interval
/// (e.g. `[0.2, 0.3]` at precision 0) the unrounded draw is returned.
///
/// # Errors
///
/// [`Error::InvalidArgument`] if a bound is NaN or infinite, if
/// `min > max`, or if `precision` exceeds [`MAX_PRECISION`].
pub fn random_number<R: Rng>(rng: &mut R, min: f64, max: f64, precision: u32) -> Result<f64> {
    if !min.is_finite() {
        return Err(Error::invalid(format!("minimum must be a finite number, got {min}")));
    }
    if !max.is_finite() {
        return Err(Error::invalid(format!("maximum must be a finite number, got {max}")));
    }
    if precision > MAX_PRECISION {
        return Err(Error::invalid(format!(
            "precision must be at most {MAX_PRECISION}, got {precision}"
        )));
    }
    if min > max {
        return Err(Error::invalid(format!(
            "minimum ({min}) must be less than or equal to maximum ({max})"
        )));
    }
    if !(max - min).is_finite() {
        return Err(Error::invalid(format!("range [{min}, {max}] is too wide to sample")));
    }
    Ok(sample_in(rng, min, max, precision))
}

/// Sampling step of [`random_number`] for bounds that are already known
/// to be finite, ordered, and paired with a supported precision.
pub(crate) fn sample_in<R: Rng>(rng: &mut R, min: f64, max: f64, precision: u32) -> f64 {
    if min >= max {
        return min;
    }

    let draw = rng.random_range(min..=max);
    let rounded = round_to(draw, precision);
    if (min..=max).contains(&rounded) {
        return rounded;
    }

    let factor = 10f64.powi(precision as i32);
    let lowest = (min * factor).ceil() / factor;
    let highest = (max * factor).floor() / factor;
    if lowest > highest {
        return draw;
    }
    let snapped = if rounded < min { lowest } else { highest };
    snapped.clamp(min, max)
}

/// Picks `amount` distinct indices from `0..len` uniformly at random.
///
/// `amount` is clamped to `len`.
pub fn distinct_indices<R: Rng>(rng: &mut R, len: usize, amount: usize) -> Vec<usize> {
    rand::seq::index::sample(rng, len, amount.min(len)).into_vec()
}

/// Number of fractional digits needed to print `x` exactly (up to 17).
#[cfg(test)]
pub(crate) fn fractional_digits(x: f64) -> usize {
    let s = format!("{x}");
    s.split_once('.').map_or(0, |(_, frac)| frac.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(round_to(2.5, 0), 3.0);
        assert_eq!(round_to(-2.5, 0), -3.0);
        assert_eq!(round_to(1.234, 2), 1.23);
        assert_eq!(round_to(-1.235, 1), -1.2);
    }

    #[test]
    fn test_round_leaves_huge_values_alone() {
        assert_eq!(round_to(1.5e300, 15), 1.5e300);
        assert_eq!(round_to(-1.0e17, 2), -1.0e17);
        assert_eq!(round_to(f64::MAX, 0), f64::MAX);
    }

    #[test]
    fn test_huge_bounds_sample_uniformly() {
        let mut rng = create_rng(5);
        let draws: Vec<f64> = (0..50)
            .map(|_| random_number(&mut rng, 1.0e300, 2.0e300, 15).unwrap())
            .collect();
        assert!(draws.iter().all(|x| (1.0e300..=2.0e300).contains(x)));
        let at_max = draws.iter().filter(|&&x| x == 2.0e300).count();
        assert!(at_max < 5, "{at_max} of 50 draws collapsed to the upper bound");

        let mut distinct = draws.clone();
        distinct.sort_by(f64::total_cmp);
        distinct.dedup();
        assert!(distinct.len() > 40, "only {} distinct draws", distinct.len());
    }

    #[test]
    fn test_equal_bounds_return_min() {
        let mut rng = create_rng(1);
        assert_eq!(random_number(&mut rng, 0.0, 0.0, 0).unwrap(), 0.0);
        assert_eq!(random_number(&mut rng, 7.25, 7.25, 0).unwrap(), 7.25);
    }

    #[test]
    fn test_min_greater_than_max_fails() {
        let mut rng = create_rng(1);
        let err = random_number(&mut rng, 2.0, 1.0, 0).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_non_numeric_bounds_fail() {
        let mut rng = create_rng(1);
        assert!(random_number(&mut rng, f64::NAN, 1.0, 0).is_err());
        assert!(random_number(&mut rng, 0.0, f64::NAN, 0).is_err());
        assert!(random_number(&mut rng, 0.0, f64::INFINITY, 0).is_err());
        assert!(random_number(&mut rng, -f64::MAX, f64::MAX, 0).is_err());
    }

    #[test]
    fn test_precision_limit() {
        let mut rng = create_rng(1);
        assert!(random_number(&mut rng, 0.0, 1.0, MAX_PRECISION).is_ok());
        assert!(random_number(&mut rng, 0.0, 1.0, MAX_PRECISION + 1).is_err());
    }

    #[test]
    fn test_signed_ranges() {
        let mut rng = create_rng(7);
        for _ in 0..200 {
            let neg = random_number(&mut rng, -10.0, 0.0, 0).unwrap();
            assert!((-10.0..=0.0).contains(&neg));
            let mixed = random_number(&mut rng, -10.0, 10.0, 0).unwrap();
            assert!((-10.0..=10.0).contains(&mixed));
            assert_eq!(mixed.fract(), 0.0);
        }
    }

    #[test]
    fn test_rounding_never_escapes_bounds() {
        let mut rng = create_rng(3);
        for _ in 0..500 {
            let x = random_number(&mut rng, 0.4, 1.6, 0).unwrap();
            assert_eq!(x, 1.0);
        }
    }

    #[test]
    fn test_empty_grid_falls_back_to_raw_draw() {
        let mut rng = create_rng(3);
        let x = random_number(&mut rng, 0.2, 0.3, 0).unwrap();
        assert!((0.2..=0.3).contains(&x));
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let mut a = create_rng(42);
        let mut b = create_rng(42);
        for _ in 0..20 {
            assert_eq!(
                random_number(&mut a, -5.0, 5.0, 3).unwrap(),
                random_number(&mut b, -5.0, 5.0, 3).unwrap()
            );
        }
    }

    #[test]
    fn test_distinct_indices() {
        let mut rng = create_rng(9);
        let mut picked = distinct_indices(&mut rng, 10, 4);
        assert_eq!(picked.len(), 4);
        picked.sort_unstable();
        picked.dedup();
        assert_eq!(picked.len(), 4);
        assert!(picked.iter().all(|&i| i < 10));

        assert_eq!(distinct_indices(&mut rng, 3, 10).len(), 3);
        assert!(distinct_indices(&mut rng, 0, 1).is_empty());
    }

    proptest! {
        #[test]
        fn prop_rounding_law(
            min in -1.0e6..1.0e6f64,
            span in 0.0..1.0e4f64,
            precision in 0u32..6,
            seed in any::<u64>(),
        ) {
            let max = min + span;
            let mut rng = create_rng(seed);
            let x = random_number(&mut rng, min, max, precision).unwrap();
            prop_assert!(x >= min && x <= max, "{x} not in [{min}, {max}]");

            let factor = 10f64.powi(precision as i32);
            let has_grid_point = (min * factor).ceil() <= (max * factor).floor();
            if has_grid_point {
                prop_assert_eq!(round_to(x, precision), x);
            }
        }

        #[test]
        fn prop_integer_precision_has_no_fraction(
            min in -1000i32..1000,
            span in 0i32..1000,
            seed in any::<u64>(),
        ) {
            let mut rng = create_rng(seed);
            let x = random_number(&mut rng, min as f64, (min + span) as f64, 0).unwrap();
            prop_assert_eq!(fractional_digits(x), 0);
        }
    }
}
