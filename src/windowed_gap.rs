//! Windowed code-length statistics and the real-vs-surrogate gap curve.
//!
//! For a window size `L` the signal is cut into `K = floor(N / L)` non-overlapping
//! windows covering the first `K * L` samples; the trailing remainder is discarded.
//! Every window is quantized from its raw values on its own, then measured by the
//! oracle.

use crate::code_length::CodeLengthOracle;
use crate::errors::{CompressibilityError, CompressibilityResult};
use crate::quantization::{quantize, quantize_strict};
use crate::results::{GapCurve, GapPoint};
use crate::spectral::Signal;

/// Mean code length of one signal at one window size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowStats {
    /// Window length in samples
    pub window_size: usize,
    /// Number of windows measured
    pub num_windows: usize,
    /// Mean code length over the windows (bytes)
    pub mean_code_length: f64,
}

/// Measures windowed code lengths through a single oracle.
pub struct WindowedGapEstimator<'a> {
    oracle: &'a dyn CodeLengthOracle,
    strict_degeneracy: bool,
}

impl<'a> WindowedGapEstimator<'a> {
    /// Estimator using `oracle` for every window, real and surrogate alike.
    pub fn new(oracle: &'a dyn CodeLengthOracle) -> Self {
        Self {
            oracle,
            strict_degeneracy: false,
        }
    }

    /// Fail on constant windows instead of quantizing them to a single code.
    pub fn with_strict_degeneracy(mut self, strict: bool) -> Self {
        self.strict_degeneracy = strict;
        self
    }

    /// Name of the underlying oracle.
    pub fn oracle_name(&self) -> &'static str {
        self.oracle.name()
    }

    fn window_code_length(&self, window: &[f64]) -> CompressibilityResult<usize> {
        let quantized = if self.strict_degeneracy {
            quantize_strict(window)?
        } else {
            let quantized = quantize(window);
            if quantized.is_degenerate() && window.len() > 1 {
                log::warn!(
                    "Constant window of {} samples quantized to a single code",
                    window.len()
                );
            }
            quantized
        };
        self.oracle.code_length(quantized.as_bytes())
    }

    /// Mean code length of `signal` over all full windows of `window_size`.
    pub fn mean_code_length(&self, signal: &Signal, window_size: usize) -> CompressibilityResult<WindowStats> {
        if window_size == 0 {
            return Err(CompressibilityError::InvalidParameter {
                parameter: "window_size".to_string(),
                value: 0.0,
                constraint: "must be positive".to_string(),
            });
        }
        let num_windows = signal.len() / window_size;
        if num_windows == 0 {
            return Err(CompressibilityError::InsufficientData {
                required: window_size,
                actual: signal.len(),
            });
        }

        let mut total = 0usize;
        for k in 0..num_windows {
            let window = signal
                .window(k, window_size)
                .ok_or(CompressibilityError::InsufficientData {
                    required: (k + 1) * window_size,
                    actual: signal.len(),
                })?;
            total += self.window_code_length(window)?;
        }

        Ok(WindowStats {
            window_size,
            num_windows,
            mean_code_length: total as f64 / num_windows as f64,
        })
    }

    /// Gap curve `mean(surrogate) - mean(real)` for each window size, in request order.
    pub fn estimate(
        &self,
        real: &Signal,
        surrogate: &Signal,
        window_sizes: &[usize],
    ) -> CompressibilityResult<GapCurve> {
        if real.len() != surrogate.len() {
            return Err(CompressibilityError::NumericalError {
                reason: format!(
                    "Real and surrogate lengths differ: {} vs {}",
                    real.len(),
                    surrogate.len()
                ),
            });
        }

        let points = window_sizes
            .iter()
            .map(|&window_size| {
                let real_stats = self.mean_code_length(real, window_size)?;
                let surrogate_stats = self.mean_code_length(surrogate, window_size)?;
                let gap = surrogate_stats.mean_code_length - real_stats.mean_code_length;
                log::debug!(
                    "{} L={} K={}: real={:.2} surrogate={:.2} gap={:.3}",
                    self.oracle.name(),
                    window_size,
                    real_stats.num_windows,
                    real_stats.mean_code_length,
                    surrogate_stats.mean_code_length,
                    gap
                );
                Ok(GapPoint {
                    window_size,
                    num_windows: real_stats.num_windows,
                    mean_real_code_length: real_stats.mean_code_length,
                    mean_surrogate_code_length: surrogate_stats.mean_code_length,
                    gap,
                })
            })
            .collect::<CompressibilityResult<Vec<_>>>()?;

        Ok(GapCurve { points })
    }
}

/// Gap curve with the default (epsilon-guarded) quantization policy.
pub fn estimate_gap_curve(
    real: &Signal,
    surrogate: &Signal,
    window_sizes: &[usize],
    oracle: &dyn CodeLengthOracle,
) -> CompressibilityResult<GapCurve> {
    WindowedGapEstimator::new(oracle).estimate(real, surrogate, window_sizes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code_length::GzipOracle;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Oracle reporting the number of distinct codes; counts calls.
    struct DistinctCodes {
        calls: AtomicUsize,
    }

    impl CodeLengthOracle for DistinctCodes {
        fn name(&self) -> &'static str {
            "distinct"
        }

        fn code_length(&self, bytes: &[u8]) -> CompressibilityResult<usize> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut seen = [false; 256];
            bytes.iter().for_each(|&b| seen[b as usize] = true);
            Ok(seen.iter().filter(|&&s| s).count())
        }
    }

    fn ramp(n: usize) -> Signal {
        Signal::from_samples((0..n).map(|i| (i as f64 * 0.37).sin()).collect())
    }

    #[test]
    fn test_trailing_samples_are_discarded() {
        let oracle = DistinctCodes {
            calls: AtomicUsize::new(0),
        };
        let estimator = WindowedGapEstimator::new(&oracle);
        assert_eq!(estimator.oracle_name(), "distinct");
        let stats = estimator.mean_code_length(&ramp(1000), 300).unwrap();
        assert_eq!(stats.num_windows, 3);
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_identical_signals_have_zero_gap() {
        let oracle = GzipOracle::default();
        let signal = ramp(512);
        let curve = estimate_gap_curve(&signal, &signal, &[256, 64, 128], &oracle).unwrap();
        assert_eq!(curve.window_sizes(), vec![256, 64, 128]);
        assert!(curve.gaps().iter().all(|&g| g == 0.0));
        assert_eq!(curve.points[1].num_windows, 8);
    }

    #[test]
    fn test_gap_sign_follows_surrogate_minus_real() {
        let oracle = DistinctCodes {
            calls: AtomicUsize::new(0),
        };
        // Two-level real signal vs rich surrogate: the surrogate uses more codes.
        let real = Signal::from_samples((0..64).map(|i| if i % 2 == 0 { -1.0 } else { 1.0 }).collect());
        let surrogate = ramp(64);
        let curve = WindowedGapEstimator::new(&oracle)
            .estimate(&real, &surrogate, &[16])
            .unwrap();
        assert_eq!(curve.points[0].mean_real_code_length, 2.0);
        assert!(curve.points[0].gap > 0.0);
    }

    #[test]
    fn test_window_larger_than_signal() {
        let oracle = GzipOracle::default();
        let signal = ramp(100);
        assert!(matches!(
            estimate_gap_curve(&signal, &signal, &[128], &oracle),
            Err(CompressibilityError::InsufficientData { required: 128, actual: 100 })
        ));
        assert!(estimate_gap_curve(&signal, &signal, &[0], &oracle).is_err());
        assert!(estimate_gap_curve(&signal, &ramp(50), &[10], &oracle).is_err());
    }

    #[test]
    fn test_strict_mode_rejects_constant_windows() {
        let oracle = GzipOracle::default();
        let constant = Signal::from_samples(vec![0.25; 64]);
        let estimator = WindowedGapEstimator::new(&oracle).with_strict_degeneracy(true);
        assert!(matches!(
            estimator.mean_code_length(&constant, 32),
            Err(CompressibilityError::DegenerateSignal { .. })
        ));
        assert!(WindowedGapEstimator::new(&oracle)
            .mean_code_length(&constant, 32)
            .is_ok());
    }
}
