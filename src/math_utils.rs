//! Numerical helpers shared by the synthesis, quantization and fitting stages.

use crate::errors::{validate_all_finite, CompressibilityError, CompressibilityResult};
use statrs::statistics::Statistics;

/// Numerical constants used across the pipeline.
pub mod constants {
    /// Additive guard on standard-deviation and range denominators.
    pub const NORMALIZATION_EPSILON: f64 = 1e-12;
    /// Additive guard inside `ln` for gap values.
    pub const LOG_GUARD_EPSILON: f64 = 1e-12;
    /// Minimum predictor spread accepted by [`super::ols_regression`].
    pub const MIN_PREDICTOR_VARIANCE: f64 = 1e-14;
}

/// Safe comparison for floating point values (NaN sorts last).
pub fn float_total_cmp(a: &f64, b: &f64) -> std::cmp::Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => std::cmp::Ordering::Equal,
        (true, false) => std::cmp::Ordering::Greater,
        (false, true) => std::cmp::Ordering::Less,
        (false, false) => a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal),
    }
}

/// Arithmetic mean; `NaN` for empty input.
pub fn mean(values: &[f64]) -> f64 {
    values.iter().mean()
}

/// Population (ddof = 0) standard deviation; `NaN` for empty input.
pub fn population_std_dev(values: &[f64]) -> f64 {
    values.iter().population_std_dev()
}

/// Minimum and maximum of a slice, `None` when empty.
pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let (lo, hi) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    Some((lo, hi))
}

/// Ordinary least squares fit of `y = intercept + slope * x`.
///
/// Returns `(slope, intercept)`. Two points are enough (the fit is then exact).
/// Data are centered before accumulating sums to avoid cancellation.
pub fn ols_regression(x: &[f64], y: &[f64]) -> CompressibilityResult<(f64, f64)> {
    if x.len() != y.len() || x.len() < 2 {
        return Err(CompressibilityError::InsufficientData {
            required: 2,
            actual: x.len().min(y.len()),
        });
    }
    validate_all_finite(x, "regression predictor")?;
    validate_all_finite(y, "regression response")?;

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let sxy: f64 = x
        .iter()
        .zip(y)
        .map(|(xi, yi)| (xi - mean_x) * (yi - mean_y))
        .sum();
    let sxx: f64 = x.iter().map(|xi| (xi - mean_x) * (xi - mean_x)).sum();

    if sxx / n < constants::MIN_PREDICTOR_VARIANCE {
        return Err(CompressibilityError::NumericalError {
            reason: format!(
                "Predictor variable has zero variance (constant values). X variance: {:.2e}",
                sxx / n
            ),
        });
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    Ok((slope, intercept))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_ols_recovers_exact_line() {
        let x = vec![1.0, 2.0, 3.0, 4.0];
        let y: Vec<f64> = x.iter().map(|v| 0.5 - 2.0 * v).collect();
        let (slope, intercept) = ols_regression(&x, &y).unwrap();
        assert_approx_eq!(slope, -2.0, 1e-12);
        assert_approx_eq!(intercept, 0.5, 1e-12);
    }

    #[test]
    fn test_ols_two_points() {
        let (slope, _) = ols_regression(&[0.0, 2.0], &[1.0, 2.0]).unwrap();
        assert_approx_eq!(slope, 0.5, 1e-12);
    }

    #[test]
    fn test_ols_rejects_degenerate_input() {
        assert!(matches!(
            ols_regression(&[1.0], &[1.0]),
            Err(CompressibilityError::InsufficientData { .. })
        ));
        assert!(matches!(
            ols_regression(&[3.0, 3.0, 3.0], &[1.0, 2.0, 3.0]),
            Err(CompressibilityError::NumericalError { .. })
        ));
        assert!(ols_regression(&[1.0, f64::NAN], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_population_std_dev_matches_definition() {
        let data = [1.0, 2.0, 3.0, 4.0];
        // ddof = 0: sqrt(1.25)
        assert_approx_eq!(population_std_dev(&data), 1.25f64.sqrt(), 1e-12);
        assert_approx_eq!(mean(&data), 2.5, 1e-12);
    }

    #[test]
    fn test_min_max() {
        assert_eq!(min_max(&[]), None);
        assert_eq!(min_max(&[2.0, -1.0, 5.0]), Some((-1.0, 5.0)));
    }
}
