//! Error types and validation functions for compressibility-gap experiments.
//!
//! Every fallible operation in the crate returns [`CompressibilityResult`]. Errors
//! raised before synthesis or at configuration time are fatal for a run, while
//! [`CompressibilityError::InsufficientPositiveGapPoints`] is reported per trial and
//! never aborts a multi-seed sweep.

use thiserror::Error;

/// Error types for the compressibility-gap pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum CompressibilityError {
    /// Magnitude and phase sequences disagree, or the requested signal length is odd
    /// or does not match the number of frequency bins.
    #[error(
        "Invalid spectrum length: {magnitudes} magnitudes and {phases} phases for signal length {signal_length} (expected signal_length/2 - 1 of each, signal_length even)"
    )]
    InvalidSpectrumLength {
        /// Number of magnitudes supplied
        magnitudes: usize,
        /// Number of phases supplied
        phases: usize,
        /// Requested time-domain length
        signal_length: usize,
    },

    /// Standard deviation or value range too close to zero for a stable normalization.
    #[error("Degenerate signal in {stage}: spread {spread:e} is below the normalization guard")]
    DegenerateSignal {
        /// Pipeline stage that detected the degeneracy
        stage: &'static str,
        /// Observed spread (standard deviation or range)
        spread: f64,
    },

    /// Fewer than two window sizes produced a strictly positive gap.
    #[error("Scaling fit undefined: {positive} positive gap points, need at least {required}")]
    InsufficientPositiveGapPoints {
        /// Number of strictly positive gaps
        positive: usize,
        /// Minimum number required for a log-log fit
        required: usize,
    },

    /// The requested compression backend is not compiled into this build.
    #[error("Compression backend unavailable: {backend}")]
    BackendUnavailable {
        /// Backend name
        backend: String,
    },

    /// Invalid parameter value in an experiment configuration.
    #[error("Invalid parameter: {parameter} = {value}, expected {constraint}")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Invalid value provided
        value: f64,
        /// Valid range or constraint description
        constraint: String,
    },

    /// Not enough samples for the requested operation.
    #[error("Insufficient data: need at least {required} points, got {actual}")]
    InsufficientData {
        /// Minimum required data points
        required: usize,
        /// Actual number of data points provided
        actual: usize,
    },

    /// Numerical computation failed (non-finite input, singular regression).
    #[error("Numerical computation failed: {reason}")]
    NumericalError {
        /// Detailed reason for numerical failure
        reason: String,
    },

    /// A compression backend reported an I/O failure while encoding.
    #[error("Compression failed in {backend}: {reason}")]
    CompressionError {
        /// Backend name
        backend: String,
        /// Underlying encoder error
        reason: String,
    },
}

/// Result type for compressibility-gap operations.
pub type CompressibilityResult<T> = Result<T, CompressibilityError>;

/// Validates that a parameter is within expected bounds (inclusive).
///
/// # Example
/// ```rust
/// use compressibility_gap::errors::validate_parameter;
///
/// assert!(validate_parameter(0.5, 0.0, 4.0, "spectrum_power").is_ok());
/// assert!(validate_parameter(f64::NAN, 0.0, 4.0, "spectrum_power").is_err());
/// ```
pub fn validate_parameter(value: f64, min: f64, max: f64, name: &str) -> CompressibilityResult<()> {
    if value.is_nan() {
        return Err(CompressibilityError::InvalidParameter {
            parameter: name.to_string(),
            value,
            constraint: "must not be NaN".to_string(),
        });
    }

    if value < min || value > max {
        Err(CompressibilityError::InvalidParameter {
            parameter: name.to_string(),
            value,
            constraint: format!("[{}, {}]", min, max),
        })
    } else {
        Ok(())
    }
}

/// Validates a time-domain length against the number of positive-frequency bins.
///
/// The signal length must be even and equal to `2 * (bins + 1)`, and the magnitude
/// and phase sequences must have the same length.
pub fn validate_signal_length(
    magnitudes: usize,
    phases: usize,
    signal_length: usize,
) -> CompressibilityResult<()> {
    let shape_ok = magnitudes == phases
        && signal_length % 2 == 0
        && signal_length >= 4
        && magnitudes == signal_length / 2 - 1;

    if shape_ok {
        Ok(())
    } else {
        Err(CompressibilityError::InvalidSpectrumLength {
            magnitudes,
            phases,
            signal_length,
        })
    }
}

/// Validates that all values in a slice are finite.
pub fn validate_all_finite(data: &[f64], name: &str) -> CompressibilityResult<()> {
    if let Some((i, value)) = data.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(CompressibilityError::NumericalError {
            reason: format!("{} contains non-finite value at index {}: {}", name, i, value),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_parameter_out_of_range() {
        match validate_parameter(5.0, 0.0, 4.0, "spectrum_power") {
            Err(CompressibilityError::InvalidParameter { parameter, value, .. }) => {
                assert_eq!(parameter, "spectrum_power");
                assert_eq!(value, 5.0);
            }
            other => panic!("Expected InvalidParameter, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_signal_length_accepts_matching_shape() {
        assert!(validate_signal_length(4095, 4095, 8192).is_ok());
        assert!(validate_signal_length(1, 1, 4).is_ok());
    }

    #[test]
    fn test_validate_signal_length_rejects_bad_shapes() {
        // Mismatched magnitude/phase lengths
        assert!(matches!(
            validate_signal_length(4095, 4094, 8192),
            Err(CompressibilityError::InvalidSpectrumLength { .. })
        ));
        // Odd signal length
        assert!(validate_signal_length(4095, 4095, 8191).is_err());
        // Bin count does not match the length
        assert!(validate_signal_length(100, 100, 8192).is_err());
        assert!(validate_signal_length(0, 0, 2).is_err());
    }

    #[test]
    fn test_validate_all_finite() {
        assert!(validate_all_finite(&[1.0, 2.0], "x").is_ok());
        assert!(validate_all_finite(&[], "x").is_ok());
        assert!(validate_all_finite(&[1.0, f64::INFINITY], "x").is_err());
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        let err = CompressibilityError::InsufficientPositiveGapPoints {
            positive: 1,
            required: 2,
        };
        assert!(err.to_string().contains("1 positive gap points"));

        let err = CompressibilityError::BackendUnavailable {
            backend: "xz".to_string(),
        };
        assert_eq!(err.to_string(), "Compression backend unavailable: xz");
    }
}
