//! FFT plan caching.
//!
//! Every trial synthesizes two signals of the same length, so inverse plans are
//! built once per length and shared through a process-wide LRU cache.

use crate::errors::{CompressibilityError, CompressibilityResult};
use lru::LruCache;
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::num::NonZeroUsize;
use std::sync::{Arc, LazyLock, Mutex};

type FftPlanCache = LruCache<FftCacheKey, Arc<dyn Fft<f64>>>;

/// Maximum number of cached plans
const MAX_CACHE_ENTRIES: NonZeroUsize = match NonZeroUsize::new(64) {
    Some(n) => n,
    None => unreachable!(),
};
/// Maximum FFT size (2^24 points)
pub(crate) const MAX_FFT_SIZE: usize = 1 << 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct FftCacheKey {
    size: usize,
    is_forward: bool,
}

static FFT_CACHE: LazyLock<Mutex<FftPlanCache>> =
    LazyLock::new(|| Mutex::new(LruCache::new(MAX_CACHE_ENTRIES)));

fn get_cached_fft_plan(size: usize, is_forward: bool) -> CompressibilityResult<Arc<dyn Fft<f64>>> {
    if size == 0 || size > MAX_FFT_SIZE {
        return Err(CompressibilityError::InvalidParameter {
            parameter: "fft_size".to_string(),
            value: size as f64,
            constraint: format!("must be in [1, {}]", MAX_FFT_SIZE),
        });
    }

    let cache_key = FftCacheKey { size, is_forward };

    // A poisoned lock only means another thread panicked mid-insert; plans stay valid.
    let mut cache = match FFT_CACHE.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };

    if let Some(cached_fft) = cache.get(&cache_key) {
        return Ok(Arc::clone(cached_fft));
    }

    let mut planner = FftPlanner::new();
    let new_fft = if is_forward {
        planner.plan_fft_forward(size)
    } else {
        planner.plan_fft_inverse(size)
    };

    cache.put(cache_key, Arc::clone(&new_fft));
    Ok(new_fft)
}

/// Get cached FFT plan for forward transform.
pub fn get_cached_fft_forward(size: usize) -> CompressibilityResult<Arc<dyn Fft<f64>>> {
    get_cached_fft_plan(size, true)
}

/// Get cached FFT plan for inverse transform.
pub fn get_cached_fft_inverse(size: usize) -> CompressibilityResult<Arc<dyn Fft<f64>>> {
    get_cached_fft_plan(size, false)
}

/// In-place inverse FFT with `1/n` normalization (rustfft leaves transforms unscaled).
pub fn inverse_fft_normalized(buffer: &mut [Complex<f64>]) -> CompressibilityResult<()> {
    let n = buffer.len();
    let plan = get_cached_fft_inverse(n)?;
    plan.process(buffer);

    let scale = 1.0 / n as f64;
    for value in buffer.iter_mut() {
        *value *= scale;
    }
    Ok(())
}

/// Number of cached plans and cache capacity.
pub fn get_fft_cache_stats() -> (usize, usize) {
    let cache = match FFT_CACHE.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    (cache.len(), cache.cap().get())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_forward_inverse_round_trip() {
        let original: Vec<Complex<f64>> = (0..16)
            .map(|i| Complex::new((i as f64 * 0.7).sin(), 0.0))
            .collect();
        let mut buffer = original.clone();

        get_cached_fft_forward(16).unwrap().process(&mut buffer);
        inverse_fft_normalized(&mut buffer).unwrap();

        for (a, b) in original.iter().zip(&buffer) {
            assert_approx_eq!(a.re, b.re, 1e-12);
            assert_approx_eq!(b.im, 0.0, 1e-12);
        }
    }

    #[test]
    fn test_plan_cache_reuses_plans() {
        let a = get_cached_fft_inverse(96).unwrap();
        let b = get_cached_fft_inverse(96).unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        let (len, cap) = get_fft_cache_stats();
        assert!(len >= 1);
        assert_eq!(cap, 64);
    }

    #[test]
    fn test_rejects_zero_size() {
        assert!(get_cached_fft_inverse(0).is_err());
    }
}
