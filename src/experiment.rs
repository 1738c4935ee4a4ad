//! Multi-seed experiment driver.
//!
//! Each trial builds a locked-phase "real" signal and a random-phase surrogate
//! with the same magnitudes, rank-maps the surrogate onto the real marginal,
//! measures the windowed gap curve and fits its scaling exponent. Trials share
//! nothing but the read-only configuration and oracle, so they may run in parallel;
//! their outcomes are collected in seed order and folded once.
//!
//! A trial whose fit fails (for example with too few positive gaps) is recorded
//! as skipped and does not abort the run. Its gap curve, if computed, still
//! enters the mean gap curve so the average is not biased toward positive gaps.

use crate::code_length::{CodeLengthOracle, CompressionBackend};
use crate::config::{ExperimentConfig, RealPhaseMode};
use crate::errors::{CompressibilityError, CompressibilityResult};
use crate::generators::{locked_phases, power_law_magnitudes, random_phases};
use crate::math_utils::{constants::NORMALIZATION_EPSILON, mean};
use crate::results::{ExperimentSummary, GapCurve, GapPoint, TrialFailure, TrialResult};
use crate::scaling::fit_scaling_exponent;
use crate::secure_rng::SecureRng;
use crate::spectral::{synthesize_with_residual, FrequencySpectrum, Signal};
use crate::surrogates::rank_map_to;
use crate::windowed_gap::WindowedGapEstimator;
use statrs::statistics::Statistics;

/// Real and marginal-matched surrogate signals of one trial.
#[derive(Debug, Clone)]
pub struct TrialSignals {
    /// Signal built from the configured real phase mode
    pub real: Signal,
    /// Random-phase signal carrying the real signal's values
    pub surrogate: Signal,
}

/// Outcome of one trial: a fitted result or a recorded failure.
pub type TrialOutcome = Result<TrialResult, TrialFailure>;

/// Build the real and surrogate signals for `seed`.
///
/// Surrogate phases are drawn first, so a given seed yields the same surrogate
/// phases in both real phase modes.
pub fn build_trial_signals(config: &ExperimentConfig, seed: u64) -> CompressibilityResult<TrialSignals> {
    let n_bins = config.num_bins();
    let magnitudes = power_law_magnitudes(n_bins, config.spectrum_power)?;

    let mut rng = SecureRng::with_seed(seed);
    let surrogate_phases = random_phases(n_bins, &mut rng);
    let real_phases = match config.real_phase {
        RealPhaseMode::Locked => locked_phases(n_bins, &config.phase_law),
        RealPhaseMode::Random => random_phases(n_bins, &mut rng),
    };

    let real = synthesize_checked(config, FrequencySpectrum::new(magnitudes.clone(), real_phases)?, "real")?;
    let raw_surrogate = synthesize_checked(config, FrequencySpectrum::new(magnitudes, surrogate_phases)?, "surrogate")?;
    let surrogate = rank_map_to(&real, &raw_surrogate)?;

    Ok(TrialSignals { real, surrogate })
}

fn synthesize_checked(
    config: &ExperimentConfig,
    spectrum: FrequencySpectrum,
    label: &str,
) -> CompressibilityResult<Signal> {
    let out = synthesize_with_residual(&spectrum, config.signal_length)?;
    if out.raw_std_dev < NORMALIZATION_EPSILON && config.strict_degeneracy {
        return Err(CompressibilityError::DegenerateSignal {
            stage: "synthesizer",
            spread: out.raw_std_dev,
        });
    }
    log::trace!(
        "{} signal: raw std {:.3e}, imaginary residual {:.3e}",
        label,
        out.raw_std_dev,
        out.max_imaginary_residual
    );
    Ok(out.signal)
}

/// Gap curve of a single trial.
pub fn compute_gap_curve(
    config: &ExperimentConfig,
    seed: u64,
    oracle: &dyn CodeLengthOracle,
) -> CompressibilityResult<GapCurve> {
    let signals = build_trial_signals(config, seed)?;
    WindowedGapEstimator::new(oracle)
        .with_strict_degeneracy(config.strict_degeneracy)
        .estimate(&signals.real, &signals.surrogate, &config.window_sizes)
}

/// Run one trial. Every error becomes a [`TrialFailure`] carrying the seed.
pub fn run_trial(config: &ExperimentConfig, seed: u64, oracle: &dyn CodeLengthOracle) -> TrialOutcome {
    let gap_curve = compute_gap_curve(config, seed, oracle).map_err(|e| TrialFailure {
        seed,
        gap_curve: None,
        reason: e.to_string(),
    })?;

    match fit_scaling_exponent(&gap_curve) {
        Ok(fit) => {
            log::debug!("seed {}: b = {:.3}, alpha = {:.3}", seed, fit.slope, fit.alpha);
            Ok(TrialResult { seed, gap_curve, fit })
        }
        Err(e) => Err(TrialFailure {
            seed,
            gap_curve: Some(gap_curve),
            reason: e.to_string(),
        }),
    }
}

fn run_trials(config: &ExperimentConfig, oracle: &dyn CodeLengthOracle) -> Vec<TrialOutcome> {
    let seeds: Vec<u64> = config.trial_seeds().collect();

    #[cfg(feature = "parallel")]
    {
        if config.parallel {
            use rayon::prelude::*;
            // Indexed collect keeps seed order, so the fold below is deterministic.
            return seeds
                .into_par_iter()
                .map(|seed| run_trial(config, seed, oracle))
                .collect();
        }
    }

    #[cfg(not(feature = "parallel"))]
    {
        if config.parallel {
            log::debug!("`parallel` feature disabled; running trials sequentially");
        }
    }

    seeds.into_iter().map(|seed| run_trial(config, seed, oracle)).collect()
}

/// Element-wise sum of two gap curves over the same window sizes.
fn add_curves(sum: GapCurve, next: &GapCurve) -> CompressibilityResult<GapCurve> {
    if sum.is_empty() {
        return Ok(next.clone());
    }
    if sum.window_sizes() != next.window_sizes() {
        return Err(CompressibilityError::NumericalError {
            reason: "Cannot accumulate gap curves over different window sizes".to_string(),
        });
    }
    let points = sum
        .points
        .iter()
        .zip(&next.points)
        .map(|(a, b)| GapPoint {
            window_size: a.window_size,
            num_windows: a.num_windows,
            mean_real_code_length: a.mean_real_code_length + b.mean_real_code_length,
            mean_surrogate_code_length: a.mean_surrogate_code_length + b.mean_surrogate_code_length,
            gap: a.gap + b.gap,
        })
        .collect();
    Ok(GapCurve { points })
}

fn scale_curve(curve: GapCurve, count: usize) -> GapCurve {
    if count == 0 {
        return curve;
    }
    let inv = 1.0 / count as f64;
    let points = curve
        .points
        .into_iter()
        .map(|p| GapPoint {
            mean_real_code_length: p.mean_real_code_length * inv,
            mean_surrogate_code_length: p.mean_surrogate_code_length * inv,
            gap: p.gap * inv,
            ..p
        })
        .collect();
    GapCurve { points }
}

#[derive(Default)]
struct Accumulator {
    gap_sum: GapCurve,
    curves: usize,
    trials: Vec<TrialResult>,
    failures: Vec<TrialFailure>,
}

impl Accumulator {
    fn absorb(self, outcome: TrialOutcome) -> CompressibilityResult<Self> {
        let Accumulator {
            gap_sum,
            curves,
            mut trials,
            mut failures,
        } = self;

        let (gap_sum, curves) = match &outcome {
            Ok(trial) => (add_curves(gap_sum, &trial.gap_curve)?, curves + 1),
            Err(TrialFailure {
                gap_curve: Some(curve),
                ..
            }) => (add_curves(gap_sum, curve)?, curves + 1),
            Err(_) => (gap_sum, curves),
        };

        match outcome {
            Ok(trial) => trials.push(trial),
            Err(failure) => {
                log::warn!("Trial with seed {} skipped: {}", failure.seed, failure.reason);
                failures.push(failure);
            }
        }

        Ok(Accumulator {
            gap_sum,
            curves,
            trials,
            failures,
        })
    }
}

/// Aggregate trial outcomes (in order) into a summary.
pub fn summarize(
    backend: CompressionBackend,
    trials_requested: usize,
    outcomes: Vec<TrialOutcome>,
) -> CompressibilityResult<ExperimentSummary> {
    let acc = outcomes
        .into_iter()
        .try_fold(Accumulator::default(), Accumulator::absorb)?;

    let slopes: Vec<f64> = acc.trials.iter().map(|t| t.fit.slope).collect();
    let alphas: Vec<f64> = acc.trials.iter().map(|t| t.fit.alpha).collect();
    let mean_slope = (!slopes.is_empty()).then(|| mean(&slopes));
    let mean_alpha = (!alphas.is_empty()).then(|| mean(&alphas));
    let slope_std_dev = (slopes.len() >= 2).then(|| slopes.iter().std_dev());

    let mean_gap_curve = scale_curve(acc.gap_sum, acc.curves);
    let mean_curve_fit = match fit_scaling_exponent(&mean_gap_curve) {
        Ok(fit) => Some(fit),
        Err(e) => {
            log::debug!("Mean gap curve has no scaling fit: {}", e);
            None
        }
    };

    Ok(ExperimentSummary {
        backend,
        trials_requested,
        trials: acc.trials,
        failures: acc.failures,
        mean_gap_curve,
        curves_averaged: acc.curves,
        mean_slope,
        mean_alpha,
        slope_std_dev,
        mean_curve_fit,
    })
}

/// Run every trial of `config` and aggregate the results.
///
/// # Errors
/// Configuration errors (`InvalidSpectrumLength`, `InvalidParameter`) and
/// `BackendUnavailable` are fatal. Per-trial failures are recorded in the summary.
pub fn run_experiment(config: &ExperimentConfig) -> CompressibilityResult<ExperimentSummary> {
    config.validate()?;
    let oracle = config.backend.oracle(config.compression_level)?;
    log::info!(
        "Running {} trials: N={}, power={}, backend={} (level {})",
        config.num_trials,
        config.signal_length,
        config.spectrum_power,
        config.backend,
        config.compression_level
    );

    let outcomes = run_trials(config, oracle.as_ref());
    let summary = summarize(config.backend, config.num_trials, outcomes)?;
    log::info!("{}", summary);
    Ok(summary)
}

/// Run the experiment once per available backend, in [`CompressionBackend::ALL`] order.
pub fn compare_backends(config: &ExperimentConfig) -> CompressibilityResult<Vec<ExperimentSummary>> {
    let mut summaries = Vec::with_capacity(CompressionBackend::ALL.len());
    for backend in CompressionBackend::ALL {
        if !backend.is_available() {
            log::warn!("Backend {} not compiled in; skipping", backend);
            continue;
        }
        summaries.push(run_experiment(&config.clone().with_backend(backend))?);
    }
    Ok(summaries)
}
