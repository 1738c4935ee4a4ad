//! # Experiment Configuration
//!
//! Options recognised by the experiment runner, with presets and validation.
//! Validation errors are fatal and raised before any trial runs.

use crate::code_length::{CompressionBackend, DEFAULT_COMPRESSION_LEVEL};
use crate::errors::{validate_parameter, CompressibilityError, CompressibilityResult};
use crate::fft_ops::MAX_FFT_SIZE;
use crate::generators::PhaseLaw;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Phase assignment for the "real" signal of each trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RealPhaseMode {
    /// Deterministic phase law (the diagnostic)
    Locked,
    /// Independent uniform phases, making the real signal another surrogate (null check)
    Random,
}

/// Configuration for a multi-seed compressibility-gap experiment.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExperimentConfig {
    /// Total signal length `N` (even)
    pub signal_length: usize,
    /// Spectral exponent; magnitudes fall off as `f^(-spectrum_power / 2)`
    pub spectrum_power: f64,
    /// Window sizes to sweep, in report order
    pub window_sizes: Vec<usize>,
    /// Seed of the first trial; trial `t` uses `seed + t`
    pub seed: u64,
    /// Number of trials (seeds)
    pub num_trials: usize,
    /// Code-length backend
    pub backend: CompressionBackend,
    /// Backend compression level (0-9)
    pub compression_level: u32,
    /// Coefficients of the locked phase law
    pub phase_law: PhaseLaw,
    /// How the real signal's phases are chosen
    pub real_phase: RealPhaseMode,
    /// Run trials in parallel (requires the `parallel` feature)
    pub parallel: bool,
    /// Fail a trial on degenerate signals instead of epsilon-guarding
    pub strict_degeneracy: bool,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl ExperimentConfig {
    /// Default experiment: N = 8192, power 0.5, sizes 128..2048, 10 seeds, gzip level 6.
    pub fn standard() -> Self {
        Self {
            signal_length: 8192,
            spectrum_power: 0.5,
            window_sizes: vec![128, 256, 512, 1024, 2048],
            seed: 0,
            num_trials: 10,
            backend: CompressionBackend::Fast,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            phase_law: PhaseLaw::default(),
            real_phase: RealPhaseMode::Locked,
            parallel: true,
            strict_degeneracy: false,
        }
    }

    /// Small, fast configuration for smoke tests.
    pub fn quick() -> Self {
        Self {
            signal_length: 2048,
            window_sizes: vec![64, 128, 256, 512],
            num_trials: 4,
            ..Self::standard()
        }
    }

    /// Set the first seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the number of trials.
    pub fn with_trials(mut self, num_trials: usize) -> Self {
        self.num_trials = num_trials;
        self
    }

    /// Select the compression backend.
    pub fn with_backend(mut self, backend: CompressionBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Select the real signal's phase mode.
    pub fn with_real_phase(mut self, mode: RealPhaseMode) -> Self {
        self.real_phase = mode;
        self
    }

    /// Set the window sizes to sweep.
    pub fn with_window_sizes(mut self, window_sizes: Vec<usize>) -> Self {
        self.window_sizes = window_sizes;
        self
    }

    /// Enable or disable parallel trials.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Number of positive-frequency bins, `N/2 - 1`.
    pub fn num_bins(&self) -> usize {
        (self.signal_length / 2).saturating_sub(1)
    }

    /// Seeds of all trials, in order.
    pub fn trial_seeds(&self) -> impl Iterator<Item = u64> + '_ {
        (0..self.num_trials as u64).map(move |t| self.seed.wrapping_add(t))
    }

    /// Validate every option.
    pub fn validate(&self) -> CompressibilityResult<()> {
        if self.signal_length % 2 != 0 || self.signal_length < 4 {
            return Err(CompressibilityError::InvalidSpectrumLength {
                magnitudes: self.num_bins(),
                phases: self.num_bins(),
                signal_length: self.signal_length,
            });
        }
        if self.signal_length > MAX_FFT_SIZE {
            return Err(CompressibilityError::InvalidParameter {
                parameter: "signal_length".to_string(),
                value: self.signal_length as f64,
                constraint: format!("must not exceed the FFT limit of {}", MAX_FFT_SIZE),
            });
        }
        validate_parameter(self.spectrum_power, -16.0, 16.0, "spectrum_power")?;

        if self.window_sizes.is_empty() {
            return Err(CompressibilityError::InvalidParameter {
                parameter: "window_sizes".to_string(),
                value: 0.0,
                constraint: "at least one window size".to_string(),
            });
        }
        for (i, &size) in self.window_sizes.iter().enumerate() {
            validate_parameter(size as f64, 1.0, self.signal_length as f64, "window_size")?;
            if self.window_sizes[..i].contains(&size) {
                return Err(CompressibilityError::InvalidParameter {
                    parameter: "window_size".to_string(),
                    value: size as f64,
                    constraint: "window sizes must be distinct".to_string(),
                });
            }
            if self.signal_length % size != 0 {
                log::debug!(
                    "Window size {} leaves {} trailing samples unmeasured",
                    size,
                    self.signal_length % size
                );
            }
        }

        if self.num_trials == 0 {
            return Err(CompressibilityError::InvalidParameter {
                parameter: "num_trials".to_string(),
                value: 0.0,
                constraint: "must be at least 1".to_string(),
            });
        }
        validate_parameter(self.compression_level as f64, 0.0, 9.0, "compression_level")?;

        if !self.backend.is_available() {
            return Err(CompressibilityError::BackendUnavailable {
                backend: self.backend.codec_name().to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExperimentConfig::default();
        assert_eq!(config.signal_length, 8192);
        assert_eq!(config.spectrum_power, 0.5);
        assert_eq!(config.window_sizes, vec![128, 256, 512, 1024, 2048]);
        assert_eq!(config.backend, CompressionBackend::Fast);
        assert_eq!(config.num_bins(), 4095);
        assert!(config.validate().is_ok());
        assert!(ExperimentConfig::quick().validate().is_ok());
    }

    #[test]
    fn test_trial_seeds() {
        let seeds: Vec<u64> = ExperimentConfig::standard()
            .with_seed(5)
            .with_trials(3)
            .trial_seeds()
            .collect();
        assert_eq!(seeds, vec![5, 6, 7]);
    }

    #[test]
    fn test_rejects_odd_length() {
        let config = ExperimentConfig {
            signal_length: 8191,
            ..ExperimentConfig::standard()
        };
        assert!(matches!(
            config.validate(),
            Err(CompressibilityError::InvalidSpectrumLength { signal_length: 8191, .. })
        ));
    }

    #[test]
    fn test_rejects_length_beyond_fft_limit() {
        let config = ExperimentConfig {
            signal_length: MAX_FFT_SIZE + 2,
            ..ExperimentConfig::standard()
        };
        match config.validate() {
            Err(CompressibilityError::InvalidParameter { parameter, .. }) => {
                assert_eq!(parameter, "signal_length")
            }
            other => panic!("Expected signal_length rejection, got {:?}", other),
        }

        let at_limit = ExperimentConfig {
            signal_length: MAX_FFT_SIZE,
            ..ExperimentConfig::standard()
        };
        assert!(at_limit.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_window_sizes() {
        let base = ExperimentConfig::standard();
        assert!(base.clone().with_window_sizes(vec![]).validate().is_err());
        assert!(base.clone().with_window_sizes(vec![0, 128]).validate().is_err());
        assert!(base.clone().with_window_sizes(vec![16384]).validate().is_err());
        assert!(base.clone().with_window_sizes(vec![128, 128]).validate().is_err());
        // Non-divisible sizes are allowed; the remainder is discarded.
        assert!(base.with_window_sizes(vec![1000, 3000]).validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_scalars() {
        let mut config = ExperimentConfig::standard().with_trials(0);
        assert!(config.validate().is_err());
        config.num_trials = 1;
        config.spectrum_power = f64::INFINITY;
        assert!(config.validate().is_err());
        config.spectrum_power = 0.5;
        config.compression_level = 12;
        assert!(config.validate().is_err());
    }
}
