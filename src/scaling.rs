//! Power-law scaling of the compressibility gap.
//!
//! Only window sizes with a strictly positive gap enter the log-log regression.
//! Non-positive gaps mean no detectable advantage at that scale; clamping them
//! would bias the slope, so they are dropped, and a curve left with fewer than two
//! points has no defined fit.

use crate::errors::{CompressibilityError, CompressibilityResult};
use crate::math_utils::{constants::LOG_GUARD_EPSILON, ols_regression};
use crate::results::{GapCurve, ScalingFit};

/// Minimum number of positive-gap points for a fit.
pub const MIN_FIT_POINTS: usize = 2;

/// Fit `ln(gap + ε) = intercept + b * ln(L)` over positive gaps; `α = 1 - b`.
///
/// # Errors
/// [`CompressibilityError::InsufficientPositiveGapPoints`] when fewer than
/// [`MIN_FIT_POINTS`] gaps are strictly positive.
pub fn fit_scaling_exponent(curve: &GapCurve) -> CompressibilityResult<ScalingFit> {
    let (log_sizes, log_gaps): (Vec<f64>, Vec<f64>) = curve
        .points
        .iter()
        .filter(|p| p.gap > 0.0)
        .map(|p| ((p.window_size as f64).ln(), (p.gap + LOG_GUARD_EPSILON).ln()))
        .unzip();

    if log_sizes.len() < MIN_FIT_POINTS {
        log::debug!(
            "Scaling fit skipped: {} of {} gaps positive",
            log_sizes.len(),
            curve.len()
        );
        return Err(CompressibilityError::InsufficientPositiveGapPoints {
            positive: log_sizes.len(),
            required: MIN_FIT_POINTS,
        });
    }

    let (slope, intercept) = ols_regression(&log_sizes, &log_gaps)?;
    Ok(ScalingFit {
        slope,
        intercept,
        alpha: 1.0 - slope,
        points_used: log_sizes.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_single_positive_point_fails() {
        let curve = GapCurve::from_gaps(&[(128, -1.0), (256, -0.5), (512, 2.0)]);
        match fit_scaling_exponent(&curve) {
            Err(CompressibilityError::InsufficientPositiveGapPoints { positive, required }) => {
                assert_eq!(positive, 1);
                assert_eq!(required, 2);
            }
            other => panic!("Expected InsufficientPositiveGapPoints, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_gaps_are_excluded() {
        let curve = GapCurve::from_gaps(&[(128, 0.0), (256, 0.0), (512, 4.0)]);
        assert!(fit_scaling_exponent(&curve).is_err());
        assert!(fit_scaling_exponent(&GapCurve::default()).is_err());
    }

    #[test]
    fn test_exact_power_law() {
        // gap = 0.01 * L^0.75  =>  b = 0.75, α = 0.25
        let pairs: Vec<(usize, f64)> = [128usize, 256, 512, 1024, 2048]
            .iter()
            .map(|&l| (l, 0.01 * (l as f64).powf(0.75)))
            .collect();
        let fit = fit_scaling_exponent(&GapCurve::from_gaps(&pairs)).unwrap();
        assert_approx_eq!(fit.slope, 0.75, 1e-9);
        assert_approx_eq!(fit.alpha, 0.25, 1e-9);
        assert_approx_eq!(fit.intercept, 0.01f64.ln(), 1e-9);
        assert_eq!(fit.points_used, 5);
    }

    #[test]
    fn test_negative_points_do_not_bias_slope() {
        let fit = fit_scaling_exponent(&GapCurve::from_gaps(&[
            (128, -3.0),
            (256, 2.0),
            (512, 4.0),
        ]))
        .unwrap();
        assert_approx_eq!(fit.slope, 1.0, 1e-9);
        assert_eq!(fit.points_used, 2);
    }
}
