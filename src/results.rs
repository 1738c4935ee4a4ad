//! # Result Structures
//!
//! Plain, immutable data produced by the pipeline. Reporting layers (plots,
//! tables) consume these directly without touching pipeline internals.

use crate::code_length::CompressionBackend;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// Code-length statistics at one window size.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GapPoint {
    /// Window length in samples
    pub window_size: usize,
    /// Number of non-overlapping windows measured per signal
    pub num_windows: usize,
    /// Mean code length of the real windows (bytes)
    pub mean_real_code_length: f64,
    /// Mean code length of the surrogate windows (bytes)
    pub mean_surrogate_code_length: f64,
    /// Surrogate minus real mean code length; positive means the real signal compresses better
    pub gap: f64,
}

/// Gap per window size, in the order the sizes were requested.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GapCurve {
    /// Points in request order
    pub points: Vec<GapPoint>,
}

impl GapCurve {
    /// Build a curve from bare `(window_size, gap)` pairs.
    pub fn from_gaps(pairs: &[(usize, f64)]) -> Self {
        let points = pairs
            .iter()
            .map(|&(window_size, gap)| GapPoint {
                window_size,
                num_windows: 0,
                mean_real_code_length: 0.0,
                mean_surrogate_code_length: 0.0,
                gap,
            })
            .collect();
        Self { points }
    }

    /// Window sizes in order.
    pub fn window_sizes(&self) -> Vec<usize> {
        self.points.iter().map(|p| p.window_size).collect()
    }

    /// Gaps in order.
    pub fn gaps(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.gap).collect()
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the curve has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of points with a strictly positive gap.
    pub fn positive_points(&self) -> usize {
        self.points.iter().filter(|p| p.gap > 0.0).count()
    }
}

/// Log-log power-law fit of gap against window size.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScalingFit {
    /// Slope `b` of `ln(gap)` on `ln(window size)`
    pub slope: f64,
    /// Intercept of the regression
    pub intercept: f64,
    /// Scaling exponent `α = 1 - b`
    pub alpha: f64,
    /// Number of positive-gap points used
    pub points_used: usize,
}

/// A trial that produced a gap curve and a scaling fit.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrialResult {
    /// Seed of this trial
    pub seed: u64,
    /// Gap curve
    pub gap_curve: GapCurve,
    /// Scaling fit of the gap curve
    pub fit: ScalingFit,
}

/// A trial excluded from slope statistics.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrialFailure {
    /// Seed of this trial
    pub seed: u64,
    /// Gap curve, when the pipeline got that far
    pub gap_curve: Option<GapCurve>,
    /// Failure description
    pub reason: String,
}

/// Aggregate statistics over all trials of one experiment.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExperimentSummary {
    /// Backend used for every trial
    pub backend: CompressionBackend,
    /// Number of trials requested
    pub trials_requested: usize,
    /// Trials whose scaling fit succeeded
    pub trials: Vec<TrialResult>,
    /// Trials skipped from slope statistics
    pub failures: Vec<TrialFailure>,
    /// Mean gap curve over every trial that produced a curve
    pub mean_gap_curve: GapCurve,
    /// Number of curves in `mean_gap_curve`
    pub curves_averaged: usize,
    /// Mean slope over successful trials
    pub mean_slope: Option<f64>,
    /// Mean `α` over successful trials
    pub mean_alpha: Option<f64>,
    /// Standard deviation of the slope over successful trials
    pub slope_std_dev: Option<f64>,
    /// Scaling fit of the mean gap curve, if it has two positive points
    pub mean_curve_fit: Option<ScalingFit>,
}

impl ExperimentSummary {
    /// Number of trials skipped from slope statistics.
    pub fn skipped_trials(&self) -> usize {
        self.failures.len()
    }

    /// Number of trials with a scaling fit.
    pub fn successful_trials(&self) -> usize {
        self.trials.len()
    }
}

fn fmt_optional(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}", v))
}

impl fmt::Display for ExperimentSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let gaps: Vec<String> = self
            .mean_gap_curve
            .points
            .iter()
            .map(|p| format!("{:.1}", p.gap))
            .collect();
        write!(
            f,
            "[{}] sizes={:?}, mean_gaps=[{}], mean_b={}, mean_alpha={}",
            self.backend,
            self.mean_gap_curve.window_sizes(),
            gaps.join(", "),
            fmt_optional(self.mean_slope),
            fmt_optional(self.mean_alpha),
        )?;
        if !self.failures.is_empty() {
            write!(f, ", skipped={}/{}", self.failures.len(), self.trials_requested)?;
        }
        Ok(())
    }
}
