//! Magnitude and phase laws for synthetic spectra.
//!
//! The real signal uses a deterministic phase law whose phase is a nonlinear
//! function of the frequency index. That couples neighbouring bins, which an
//! i.i.d. random phase draw (the surrogate) cannot reproduce even though both
//! share the exact same magnitudes.

use crate::errors::{validate_parameter, CompressibilityResult};
use crate::secure_rng::SecureRng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Quadratic phase law `phase(f) = (linear * f + quadratic * f^2) mod 2π`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PhaseLaw {
    /// Coefficient of `f`
    pub linear: f64,
    /// Coefficient of `f^2`
    pub quadratic: f64,
}

impl Default for PhaseLaw {
    fn default() -> Self {
        Self {
            linear: 0.3,
            quadratic: 0.02,
        }
    }
}

impl PhaseLaw {
    /// Phase of frequency bin `f`, reduced to `[0, 2π)`.
    pub fn phase(&self, f: usize) -> f64 {
        let f = f as f64;
        (self.linear * f + self.quadratic * f * f).rem_euclid(TAU)
    }
}

/// Frequency bins `1..=n_bins` as used by every law in this module.
pub fn frequency_bins(n_bins: usize) -> impl Iterator<Item = usize> {
    1..=n_bins
}

/// Power-law magnitudes `|X(f)| = f^(-spectrum_power / 2)` for bins `1..=n_bins`,
/// giving a power spectral density proportional to `1 / f^spectrum_power`.
pub fn power_law_magnitudes(n_bins: usize, spectrum_power: f64) -> CompressibilityResult<Vec<f64>> {
    validate_parameter(spectrum_power, -16.0, 16.0, "spectrum_power")?;
    Ok(frequency_bins(n_bins)
        .map(|f| (f as f64).powf(-spectrum_power / 2.0))
        .collect())
}

/// Deterministic locked phases for bins `1..=n_bins`.
pub fn locked_phases(n_bins: usize, law: &PhaseLaw) -> Vec<f64> {
    frequency_bins(n_bins).map(|f| law.phase(f)).collect()
}

/// Independent uniform phases on `[0, 2π)` for bins `1..=n_bins`.
pub fn random_phases(n_bins: usize, rng: &mut SecureRng) -> Vec<f64> {
    let mut phases = vec![0.0; n_bins];
    rng.fill_uniform(&mut phases, 0.0, TAU);
    phases
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_locked_phase_law_values() {
        let law = PhaseLaw::default();
        let phases = locked_phases(4, &law);
        assert_eq!(phases.len(), 4);
        assert_approx_eq!(phases[0], 0.32, 1e-12);
        assert_approx_eq!(phases[1], 0.68, 1e-12);
        // f = 100: 30 + 200 = 230, reduced mod 2π
        assert_approx_eq!(law.phase(100), 230.0f64.rem_euclid(TAU), 1e-9);
        assert!(locked_phases(4095, &law)
            .iter()
            .all(|&p| (0.0..TAU).contains(&p)));
    }

    #[test]
    fn test_random_phases_reproducible() {
        let a = random_phases(64, &mut SecureRng::with_seed(3));
        let b = random_phases(64, &mut SecureRng::with_seed(3));
        assert_eq!(a, b);
        assert!(a.iter().all(|&p| (0.0..TAU).contains(&p)));
    }

    #[test]
    fn test_power_law_magnitudes() {
        let mags = power_law_magnitudes(4, 0.5).unwrap();
        assert_approx_eq!(mags[0], 1.0, 1e-12);
        assert_approx_eq!(mags[3], 4.0f64.powf(-0.25), 1e-12);
        assert!(mags.windows(2).all(|w| w[1] <= w[0]));

        // Flat spectrum
        let flat = power_law_magnitudes(8, 0.0).unwrap();
        assert!(flat.iter().all(|&m| m == 1.0));

        assert!(power_law_magnitudes(8, f64::NAN).is_err());
    }
}
