//! Numeric guards shared by the processes.

/// Smallest denominator [`zero_fun`] lets through unchanged.
pub const DELTA: f64 = 1e-11;

/// Tolerance used by [`is_one`].
pub const ONE_TOLERANCE: f64 = 1e-9;

/// Smoothly bound `x` away from zero.
///
/// Returns `x` when `x >= DELTA`; otherwise returns
/// `DELTA / (2 - x / DELTA)`, which is positive, continuous at `DELTA`,
/// and tends to zero as `x → −∞`. Used for denominators that may
/// legitimately be zero without producing `inf`/`NaN`.
pub fn zero_fun(x: f64) -> f64 {
    if x >= DELTA {
        x
    } else {
        DELTA / (2.0 - x / DELTA)
    }
}

/// Whether `x` equals one within [`ONE_TOLERANCE`].
pub fn is_one(x: f64) -> bool {
    (x - 1.0).abs() < ONE_TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_fun_passes_large_values_through() {
        assert_eq!(zero_fun(3.5), 3.5);
        assert_eq!(zero_fun(DELTA), DELTA);
    }

    #[test]
    fn zero_fun_of_zero_is_half_delta() {
        assert_eq!(zero_fun(0.0), DELTA / 2.0);
    }

    #[test]
    fn is_one_tolerates_rounding() {
        assert!(is_one(0.1 + 0.2 + 0.7));
        assert!(!is_one(0.99));
    }

    proptest! {
        #[test]
        fn zero_fun_is_positive_and_finite(x in -1e6f64..1e6) {
            let y = zero_fun(x);
            prop_assert!(y > 0.0);
            prop_assert!(y.is_finite());
        }
    }
}
