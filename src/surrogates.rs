//! Marginal matching of surrogate signals.
//!
//! [`rank_map_to`] replaces every sample of a target by the reference value of the
//! same rank. The output carries exactly the reference's multiset of values (same
//! histogram, same empirical CDF) in the target's temporal rank order, so it is a
//! monotone transform of the target that leaves its rank autocorrelation intact.

use crate::errors::{CompressibilityError, CompressibilityResult};
use crate::math_utils::float_total_cmp;
use crate::spectral::Signal;
use std::cmp::Ordering;

/// Orders `(value, index)` pairs by value, breaking ties by index.
fn value_then_index(a: &(f64, usize), b: &(f64, usize)) -> Ordering {
    match float_total_cmp(&a.0, &b.0) {
        Ordering::Equal => a.1.cmp(&b.1),
        ord => ord,
    }
}

/// Ascending rank (0-based) of every element; equal values are ranked by position.
pub fn rank_order(values: &[f64]) -> Vec<usize> {
    let mut indexed: Vec<(f64, usize)> = values.iter().copied().zip(0..).collect();
    indexed.sort_unstable_by(value_then_index);

    let mut ranks = vec![0; values.len()];
    for (rank, &(_, original_index)) in indexed.iter().enumerate() {
        ranks[original_index] = rank;
    }
    ranks
}

/// Map `target` onto the sorted values of `reference`, keeping the target's ranks.
pub fn rank_map_to(reference: &Signal, target: &Signal) -> CompressibilityResult<Signal> {
    if reference.len() != target.len() {
        return Err(CompressibilityError::NumericalError {
            reason: format!(
                "Mismatched lengths in rank matching: reference {}, target {}",
                reference.len(),
                target.len()
            ),
        });
    }

    let mut reference_sorted = reference.as_slice().to_vec();
    reference_sorted.sort_unstable_by(float_total_cmp);

    let mapped = rank_order(target.as_slice())
        .into_iter()
        .map(|rank| reference_sorted[rank])
        .collect();
    Ok(Signal::from_samples(mapped))
}
