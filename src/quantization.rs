//! 8-bit quantization of signal windows.
//!
//! Samples are companded with `tanh`, min-max normalized to `[0, 1]` and scaled to
//! `[0, 255]`, truncating toward zero. Real and surrogate windows go through the
//! same policy so a code-length gap cannot come from quantization differences.

use crate::errors::{CompressibilityError, CompressibilityResult};
use crate::math_utils::{constants::NORMALIZATION_EPSILON, min_max};

/// A window of 8-bit codes, one per input sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantizedWindow {
    codes: Vec<u8>,
}

impl QuantizedWindow {
    /// Code bytes, ready for a code-length oracle.
    pub fn as_bytes(&self) -> &[u8] {
        &self.codes
    }

    /// Number of codes.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// True for an empty window.
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// True when every code is equal (constant or empty input).
    pub fn is_degenerate(&self) -> bool {
        self.codes.windows(2).all(|w| w[0] == w[1])
    }
}

/// Quantize raw samples to 8-bit codes.
///
/// A constant input does not fail: the range guard maps every sample to code 0.
pub fn quantize(samples: &[f64]) -> QuantizedWindow {
    let companded: Vec<f64> = samples.iter().map(|x| x.tanh()).collect();
    match min_max(&companded) {
        Some((lo, hi)) => encode(&companded, lo, hi),
        None => QuantizedWindow { codes: Vec::new() },
    }
}

/// Quantize, failing with [`CompressibilityError::DegenerateSignal`] when the
/// companded range is below the normalization guard.
pub fn quantize_strict(samples: &[f64]) -> CompressibilityResult<QuantizedWindow> {
    let companded: Vec<f64> = samples.iter().map(|x| x.tanh()).collect();
    let (lo, hi) = min_max(&companded).unwrap_or((0.0, 0.0));
    if hi - lo < NORMALIZATION_EPSILON {
        return Err(CompressibilityError::DegenerateSignal {
            stage: "quantizer",
            spread: hi - lo,
        });
    }
    Ok(encode(&companded, lo, hi))
}

fn encode(companded: &[f64], lo: f64, hi: f64) -> QuantizedWindow {
    let denom = hi - lo + NORMALIZATION_EPSILON;
    let codes = companded
        .iter()
        .map(|&x| ((x - lo) / denom * 255.0) as u8)
        .collect();
    QuantizedWindow { codes }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_span_expected_range() {
        let samples: Vec<f64> = (0..512).map(|i| (i as f64 * 0.05).sin() * 3.0).collect();
        let window = quantize(&samples);
        assert_eq!(window.len(), samples.len());
        // The minimum always maps to 0; the maximum lands just below 255.
        assert_eq!(window.as_bytes().iter().min(), Some(&0));
        assert_eq!(window.as_bytes().iter().max(), Some(&254));
    }

    #[test]
    fn test_quantization_is_monotone() {
        let samples = vec![-3.0, -1.0, -0.2, 0.0, 0.4, 1.5, 10.0];
        let codes = quantize(&samples);
        assert!(codes.as_bytes().windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_constant_input_is_guarded() {
        let window = quantize(&[0.7; 64]);
        assert_eq!(window.len(), 64);
        assert!(window.is_degenerate());
        assert!(window.as_bytes().iter().all(|&c| c == 0));

        assert!(matches!(
            quantize_strict(&[0.7; 64]),
            Err(CompressibilityError::DegenerateSignal { stage: "quantizer", .. })
        ));
        assert!(quantize_strict(&[0.0, 1.0]).is_ok());
    }

    #[test]
    fn test_empty_input() {
        assert!(quantize(&[]).is_empty());
    }
}
