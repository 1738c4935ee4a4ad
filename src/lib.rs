//! # Compressibility Gap
//!
//! Compression-based detection of phase structure that linear analysis cannot see.
//!
//! A "real" signal and a surrogate are built from the same magnitude spectrum. The
//! real signal gets a deterministic, frequency-coupled phase law, the surrogate gets
//! independent random phases and is then rank-mapped onto the real signal's values,
//! so the two agree in power spectrum and in marginal distribution. Any difference
//! in lossless code length between them comes from phase structure. Measuring that
//! difference over several window sizes and regressing `ln(gap)` on `ln(L)` gives a
//! scaling exponent `α = 1 - b`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use compressibility_gap::{run_experiment, CompressionBackend, ExperimentConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExperimentConfig::standard()
//!         .with_backend(CompressionBackend::Fast)
//!         .with_trials(10);
//!
//!     let summary = run_experiment(&config)?;
//!     println!("{}", summary);
//!     for point in &summary.mean_gap_curve.points {
//!         println!("L = {:5}: gap = {:.2} bytes", point.window_size, point.gap);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! - [`generators`]: power-law magnitudes, locked and random phase laws
//! - [`spectral`]: Hermitian-symmetric inverse FFT synthesis, unit variance
//! - [`surrogates`]: rank mapping onto a reference marginal
//! - [`quantization`]: `tanh` companding and 8-bit codes per window
//! - [`code_length`]: pluggable compressed-length oracles (gzip, xz)
//! - [`windowed_gap`]: mean code length per window size and the gap curve
//! - [`scaling`]: log-log fit of the gap curve
//! - [`experiment`]: multi-seed driver and aggregation

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod config;
pub mod errors;
pub mod fft_ops;
pub mod math_utils;
pub mod results;
pub mod secure_rng;

// Pipeline stages
pub mod code_length;
pub mod experiment;
pub mod generators;
pub mod quantization;
pub mod scaling;
pub mod spectral;
pub mod surrogates;
pub mod windowed_gap;

pub use config::{ExperimentConfig, RealPhaseMode};
pub use errors::{CompressibilityError, CompressibilityResult};
pub use results::{ExperimentSummary, GapCurve, GapPoint, ScalingFit, TrialFailure, TrialResult};

pub use code_length::{CodeLengthOracle, CompressionBackend, GzipOracle, DEFAULT_COMPRESSION_LEVEL};
#[cfg(feature = "lzma")]
pub use code_length::XzOracle;
pub use experiment::{
    build_trial_signals, compare_backends, compute_gap_curve, run_experiment, run_trial,
    summarize, TrialOutcome, TrialSignals,
};
pub use generators::{locked_phases, power_law_magnitudes, random_phases, PhaseLaw};
pub use quantization::{quantize, quantize_strict, QuantizedWindow};
pub use scaling::{fit_scaling_exponent, MIN_FIT_POINTS};
pub use spectral::{synthesize, synthesize_with_residual, FrequencySpectrum, Signal, SynthesisOutput};
pub use surrogates::{rank_map_to, rank_order};
pub use windowed_gap::{estimate_gap_curve, WindowStats, WindowedGapEstimator};
