use crate::stats::averages::mean;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use statrs::distribution::{ContinuousCDF, Normal, StudentsT};

/// Number of resamples for the bootstrap interval.
const BOOTSTRAP_SAMPLES: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalMethod {
    Normal,
    /// t-distribution; better for small samples.
    T,
    /// Percentile bootstrap, deterministic resampling.
    Bootstrap,
}

/// Confidence interval for the mean of a sample. Returns (mean, lower, upper).
///
/// Policy: samples of 30 or more always use the normal approximation, even
/// when `T` or `Bootstrap` is requested -- at that size the approximations
/// agree and the closed form is cheaper. Fewer than two observations yield a
/// degenerate interval at the mean.
pub fn confidence_interval(
    values: &[f64],
    confidence: f64,
    method: IntervalMethod,
) -> (f64, f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0, 0.0);
    }

    let m = mean(values);
    let n = values.len();
    if n < 2 {
        return (m, m, m);
    }

    if method == IntervalMethod::Normal || n >= 30 {
        let std_err = sample_std(values) / (n as f64).sqrt();
        let z = normal_critical(confidence);
        let margin = z * std_err;
        return (m, m - margin, m + margin);
    }

    match method {
        IntervalMethod::T => {
            let std_err = sample_std(values) / (n as f64).sqrt();
            let df = (n - 1) as f64;
            let t = match StudentsT::new(0.0, 1.0, df) {
                Ok(dist) => dist.inverse_cdf((1.0 + confidence) / 2.0),
                Err(_) => normal_critical(confidence),
            };
            let margin = t * std_err;
            (m, m - margin, m + margin)
        }
        IntervalMethod::Bootstrap | IntervalMethod::Normal => {
            // Seed from the data itself so repeated calls on the same sample
            // return identical intervals.
            let mut rng = StdRng::seed_from_u64(data_seed(values));
            let mut boot_means = Vec::with_capacity(BOOTSTRAP_SAMPLES);
            for _ in 0..BOOTSTRAP_SAMPLES {
                let resample_mean = (0..n)
                    .map(|_| values[rng.gen_range(0..n)])
                    .sum::<f64>()
                    / n as f64;
                boot_means.push(resample_mean);
            }
            boot_means.sort_by(|a, b| a.total_cmp(b));

            let alpha = 1.0 - confidence;
            let lower = percentile(&boot_means, 100.0 * alpha / 2.0);
            let upper = percentile(&boot_means, 100.0 * (1.0 - alpha / 2.0));
            (m, lower, upper)
        }
    }
}

#[inline]
fn normal_critical(confidence: f64) -> f64 {
    match Normal::new(0.0, 1.0) {
        Ok(dist) => dist.inverse_cdf((1.0 + confidence) / 2.0),
        Err(_) => 1.96,
    }
}

/// Sample standard deviation (ddof = 1).
fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / (n - 1) as f64;
    var.sqrt()
}

/// Linear-interpolated percentile over a sorted slice.
fn percentile(sorted: &[f64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = pct / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    let frac = rank - lo as f64;
    sorted[lo] * (1.0 - frac) + sorted[hi] * frac
}

/// Deterministic seed from the sample contents.
fn data_seed(values: &[f64]) -> u64 {
    let mut h: u64 = 0xcbf29ce484222325;
    for v in values {
        for b in v.to_bits().to_le_bytes() {
            h ^= b as u64;
            h = h.wrapping_mul(0x100000001b3);
        }
    }
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_interval_contains_mean() {
        let values: Vec<f64> = (0..50).map(|i| 10.0 + (i % 5) as f64).collect();
        let (m, lo, hi) = confidence_interval(&values, 0.95, IntervalMethod::Normal);
        assert!(lo < m && m < hi, "interval must bracket the mean: {lo} {m} {hi}");
    }

    #[test]
    fn test_t_wider_than_normal_for_small_samples() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let (_, n_lo, n_hi) = confidence_interval(&values, 0.95, IntervalMethod::Normal);
        let (_, t_lo, t_hi) = confidence_interval(&values, 0.95, IntervalMethod::T);
        assert!(
            t_hi - t_lo > n_hi - n_lo,
            "t interval should be wider at n=5: t={} normal={}",
            t_hi - t_lo,
            n_hi - n_lo
        );
    }

    #[test]
    fn test_large_sample_forces_normal() {
        let values: Vec<f64> = (0..40).map(|i| i as f64).collect();
        let t = confidence_interval(&values, 0.95, IntervalMethod::T);
        let normal = confidence_interval(&values, 0.95, IntervalMethod::Normal);
        assert_eq!(t, normal, "n >= 30 must use the normal approximation");
    }

    #[test]
    fn test_bootstrap_deterministic() {
        let values = [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0];
        let a = confidence_interval(&values, 0.95, IntervalMethod::Bootstrap);
        let b = confidence_interval(&values, 0.95, IntervalMethod::Bootstrap);
        assert_eq!(a, b, "bootstrap must be reproducible on identical input");
        assert!(a.1 <= a.0 && a.0 <= a.2);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(confidence_interval(&[], 0.95, IntervalMethod::Normal), (0.0, 0.0, 0.0));
        let single = confidence_interval(&[7.0], 0.95, IntervalMethod::Bootstrap);
        assert_eq!(single, (7.0, 7.0, 7.0));
    }

    #[test]
    fn test_percentile_interpolation() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert!((percentile(&sorted, 0.0) - 1.0).abs() < 1e-12);
        assert!((percentile(&sorted, 100.0) - 4.0).abs() < 1e-12);
        assert!((percentile(&sorted, 50.0) - 2.5).abs() < 1e-12);
    }
}
