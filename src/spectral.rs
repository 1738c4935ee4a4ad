//! Spectral synthesis of real signals from magnitude and phase arrays.
//!
//! A [`FrequencySpectrum`] holds the positive-frequency bins `1..N/2-1`. The
//! synthesizer mirrors them into a Hermitian-symmetric array of length `N`
//! (DC and Nyquist set to zero), applies the inverse FFT and rescales the real
//! part to unit standard deviation.
//!
//! Hermitian symmetry makes the imaginary part of the inverse transform vanish up
//! to rounding. That residual is reported by [`synthesize_with_residual`] for
//! inspection but never checked at runtime.

use crate::errors::{validate_all_finite, validate_signal_length, CompressibilityError, CompressibilityResult};
use crate::fft_ops::inverse_fft_normalized;
use crate::math_utils::{constants::NORMALIZATION_EPSILON, population_std_dev};
use num_complex::Complex64;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Magnitudes and phases for frequency bins `1..N/2-1`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FrequencySpectrum {
    magnitudes: Vec<f64>,
    phases: Vec<f64>,
}

impl FrequencySpectrum {
    /// Pair up magnitudes and phases.
    ///
    /// Fails with [`CompressibilityError::InvalidSpectrumLength`] when the lengths
    /// differ, and with `InvalidParameter` on negative or non-finite magnitudes.
    pub fn new(magnitudes: Vec<f64>, phases: Vec<f64>) -> CompressibilityResult<Self> {
        if magnitudes.len() != phases.len() {
            return Err(CompressibilityError::InvalidSpectrumLength {
                magnitudes: magnitudes.len(),
                phases: phases.len(),
                signal_length: 2 * (magnitudes.len() + 1),
            });
        }
        validate_all_finite(&magnitudes, "magnitudes")?;
        validate_all_finite(&phases, "phases")?;
        if let Some(&m) = magnitudes.iter().find(|&&m| m < 0.0) {
            return Err(CompressibilityError::InvalidParameter {
                parameter: "magnitude".to_string(),
                value: m,
                constraint: "must be non-negative".to_string(),
            });
        }
        Ok(Self { magnitudes, phases })
    }

    /// Number of positive-frequency bins.
    pub fn num_bins(&self) -> usize {
        self.magnitudes.len()
    }

    /// Time-domain length implied by the bin count.
    pub fn signal_length(&self) -> usize {
        2 * (self.magnitudes.len() + 1)
    }

    /// Bin magnitudes.
    pub fn magnitudes(&self) -> &[f64] {
        &self.magnitudes
    }

    /// Bin phases.
    pub fn phases(&self) -> &[f64] {
        &self.phases
    }
}

/// An immutable real-valued time series.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Signal {
    samples: Vec<f64>,
}

impl Signal {
    /// Wrap raw samples.
    pub fn from_samples(samples: Vec<f64>) -> Self {
        Self { samples }
    }

    /// Sample values.
    pub fn as_slice(&self) -> &[f64] {
        &self.samples
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when the signal has no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The `k`-th non-overlapping window of length `window_size`, if it fits.
    pub fn window(&self, k: usize, window_size: usize) -> Option<&[f64]> {
        let start = k.checked_mul(window_size)?;
        let end = start.checked_add(window_size)?;
        self.samples.get(start..end)
    }

    /// Population standard deviation.
    pub fn std_dev(&self) -> f64 {
        population_std_dev(&self.samples)
    }

    /// Consume the signal, returning its samples.
    pub fn into_samples(self) -> Vec<f64> {
        self.samples
    }
}

/// Synthesized signal together with the largest imaginary residual of the inverse FFT.
#[derive(Debug, Clone)]
pub struct SynthesisOutput {
    /// Unit-variance real signal
    pub signal: Signal,
    /// `max |Im(x_t)|` before normalization
    pub max_imaginary_residual: f64,
    /// Standard deviation of the real part before normalization
    pub raw_std_dev: f64,
}

/// Synthesize a real, unit-variance signal of length `signal_length`.
pub fn synthesize(spectrum: &FrequencySpectrum, signal_length: usize) -> CompressibilityResult<Signal> {
    synthesize_with_residual(spectrum, signal_length).map(|out| out.signal)
}

/// Synthesize and also report the imaginary residual and the pre-normalization spread.
pub fn synthesize_with_residual(
    spectrum: &FrequencySpectrum,
    signal_length: usize,
) -> CompressibilityResult<SynthesisOutput> {
    validate_signal_length(spectrum.magnitudes.len(), spectrum.phases.len(), signal_length)?;

    let n = signal_length;
    let mut buffer = vec![Complex64::new(0.0, 0.0); n];
    for (i, (&m, &phi)) in spectrum.magnitudes.iter().zip(&spectrum.phases).enumerate() {
        let k = i + 1;
        let z = Complex64::from_polar(m, phi);
        buffer[k] = z;
        buffer[n - k] = z.conj();
    }

    inverse_fft_normalized(&mut buffer)?;

    let max_imaginary_residual = buffer.iter().fold(0.0f64, |acc, c| acc.max(c.im.abs()));
    let real: Vec<f64> = buffer.iter().map(|c| c.re).collect();
    let raw_std_dev = population_std_dev(&real);
    if raw_std_dev < NORMALIZATION_EPSILON {
        log::warn!(
            "Synthesized signal has near-zero spread ({:e}); normalization is epsilon-guarded",
            raw_std_dev
        );
    }

    let scale = 1.0 / (raw_std_dev + NORMALIZATION_EPSILON);
    let samples = real.into_iter().map(|x| x * scale).collect();

    Ok(SynthesisOutput {
        signal: Signal::from_samples(samples),
        max_imaginary_residual,
        raw_std_dev,
    })
}
