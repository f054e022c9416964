use chrono::{DateTime, Utc};
use statrs::distribution::{Beta, ContinuousCDF};

/// Robust and Bayesian averaging routines for small, noisy sports samples.

/// Time-weighted average with exponential decay: weight = exp(-days_ago / half_life).
///
/// Returns (weighted_mean, effective_sample_size). The reference date defaults
/// to the most recent date in the series. Mismatched or empty inputs yield
/// (0.0, 0.0).
pub fn time_weighted_average(
    values: &[f64],
    dates: &[DateTime<Utc>],
    half_life_days: f64,
    reference_date: Option<DateTime<Utc>>,
) -> (f64, f64) {
    if values.is_empty() || values.len() != dates.len() {
        return (0.0, 0.0);
    }

    let reference = match reference_date.or_else(|| dates.iter().max().copied()) {
        Some(r) => r,
        None => return (0.0, 0.0),
    };

    let weights: Vec<f64> = dates
        .iter()
        .map(|d| {
            let days_ago = (reference - *d).num_days() as f64;
            (-days_ago / half_life_days).exp()
        })
        .collect();

    let total_weight: f64 = weights.iter().sum();
    if total_weight == 0.0 {
        return (0.0, 0.0);
    }

    let weighted_avg: f64 = values
        .iter()
        .zip(&weights)
        .map(|(v, w)| v * w / total_weight)
        .sum();

    (weighted_avg, effective_sample_size(&weights))
}

/// Kish's effective sample size: (sum w)^2 / sum(w^2).
pub fn effective_sample_size(weights: &[f64]) -> f64 {
    if weights.is_empty() {
        return 0.0;
    }
    let sum: f64 = weights.iter().sum();
    let sum_sq: f64 = weights.iter().map(|w| w * w).sum();
    if sum_sq == 0.0 {
        return 0.0;
    }
    (sum * sum) / sum_sq
}

/// Beta-Binomial posterior win rate with shrinkage toward the prior.
///
/// The required estimator for small-sample records (e.g. a 3-game coaching
/// head-to-head) where the raw ratio would be wildly overconfident.
///
/// Returns (posterior_mean, lower, upper) where the bounds are the 95%
/// credible interval of the Beta posterior.
pub fn bayesian_win_rate(
    wins: u32,
    losses: u32,
    prior_wins: f64,
    prior_losses: f64,
    prior_strength: f64,
) -> (f64, f64, f64) {
    let alpha = prior_wins * prior_strength + wins as f64;
    let beta = prior_losses * prior_strength + losses as f64;

    let posterior_mean = if alpha + beta > 0.0 {
        alpha / (alpha + beta)
    } else {
        0.5
    };

    let (lower, upper) = match Beta::new(alpha, beta) {
        Ok(dist) => (dist.inverse_cdf(0.025), dist.inverse_cdf(0.975)),
        Err(_) => (0.0, 1.0),
    };

    (posterior_mean, lower, upper)
}

/// Weighted win rate over parallel win/loss counts. 0.5 on degenerate input.
pub fn weighted_win_rate(wins: &[f64], losses: &[f64], weights: Option<&[f64]>) -> f64 {
    if wins.is_empty() || wins.len() != losses.len() {
        return 0.5;
    }

    let uniform = vec![1.0; wins.len()];
    let weights = weights.unwrap_or(&uniform);

    let weighted_wins: f64 = wins.iter().zip(weights).map(|(w, wt)| w * wt).sum();
    let weighted_games: f64 = wins
        .iter()
        .zip(losses)
        .zip(weights)
        .map(|((w, l), wt)| (w + l) * wt)
        .sum();

    if weighted_games == 0.0 {
        return 0.5;
    }
    weighted_wins / weighted_games
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RobustMethod {
    /// Drop the top and bottom trim fraction before averaging.
    Trimmed,
    /// Clip outliers to the trim boundaries instead of dropping them.
    Winsorized,
    /// Plain median; ignores the trim fraction.
    Median,
}

/// Outlier-resistant average. Returns (average, population_std_dev).
/// A trim fraction that rounds to zero dropped elements degrades to the
/// plain mean.
pub fn robust_average(values: &[f64], method: RobustMethod, trim_percent: f64) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }

    match method {
        RobustMethod::Median => {
            let mut sorted = values.to_vec();
            sorted.sort_by(|a, b| a.total_cmp(b));
            let n = sorted.len();
            let median = if n % 2 == 0 {
                (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
            } else {
                sorted[n / 2]
            };
            (median, population_std(values))
        }
        RobustMethod::Trimmed => {
            let n_trim = (values.len() as f64 * trim_percent) as usize;
            if n_trim == 0 || values.len() <= 2 * n_trim {
                return (mean(values), population_std(values));
            }
            let mut sorted = values.to_vec();
            sorted.sort_by(|a, b| a.total_cmp(b));
            let trimmed = &sorted[n_trim..sorted.len() - n_trim];
            (mean(trimmed), population_std(trimmed))
        }
        RobustMethod::Winsorized => {
            let n_win = (values.len() as f64 * trim_percent) as usize;
            if n_win == 0 || 2 * n_win >= values.len() {
                return (mean(values), population_std(values));
            }
            let mut sorted = values.to_vec();
            sorted.sort_by(|a, b| a.total_cmp(b));
            let lower = sorted[n_win];
            let upper = sorted[sorted.len() - 1 - n_win];
            let winsorized: Vec<f64> = values.iter().map(|v| v.clamp(lower, upper)).collect();
            (mean(&winsorized), population_std(&winsorized))
        }
    }
}

/// Shrinkage estimator: pull a small-sample observation toward the population
/// mean. shrinkage = pop_var / (pop_var + sample_var / n); larger n or a
/// tighter sample means less shrinkage.
pub fn regression_to_mean(
    observed: f64,
    sample_size: u32,
    population_mean: f64,
    population_variance: f64,
    sample_variance: Option<f64>,
) -> f64 {
    if sample_size == 0 {
        return population_mean;
    }

    let sample_variance = sample_variance.unwrap_or(population_variance);
    let shrinkage =
        population_variance / (population_variance + sample_variance / sample_size as f64);

    shrinkage * population_mean + (1.0 - shrinkage) * observed
}

#[inline]
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

#[inline]
fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 10, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_time_weighted_favors_recent() {
        let values = [10.0, 20.0];
        let dates = [day(1), day(28)];
        let (avg, ess) = time_weighted_average(&values, &dates, 7.0, None);
        assert!(avg > 19.0, "recent value should dominate with short half-life: {avg}");
        assert!(ess > 1.0 && ess < 2.0, "ESS between 1 and n: {ess}");
    }

    #[test]
    fn test_time_weighted_equal_dates_is_plain_mean() {
        let values = [10.0, 20.0, 30.0];
        let dates = [day(5), day(5), day(5)];
        let (avg, ess) = time_weighted_average(&values, &dates, 30.0, None);
        assert!((avg - 20.0).abs() < 1e-9);
        assert!((ess - 3.0).abs() < 1e-9, "equal weights mean full ESS: {ess}");
    }

    #[test]
    fn test_time_weighted_mismatched_input() {
        let (avg, ess) = time_weighted_average(&[1.0], &[], 30.0, None);
        assert_eq!((avg, ess), (0.0, 0.0));
    }

    #[test]
    fn test_bayesian_shrinks_perfect_record() {
        // One win, zero losses: naive rate is 1.0; posterior must sit strictly
        // between the uniform prior and the naive estimate.
        let (mean, lower, upper) = bayesian_win_rate(1, 0, 1.0, 1.0, 2.0);
        assert!(mean > 0.5 && mean < 1.0, "shrinkage failed: {mean}");
        assert!(upper - lower > 0.0, "interval must be non-degenerate at n=1");
        assert!(lower >= 0.0 && upper <= 1.0);
    }

    #[test]
    fn test_bayesian_converges_with_data() {
        let (small, _, _) = bayesian_win_rate(3, 1, 1.0, 1.0, 2.0);
        let (large, _, _) = bayesian_win_rate(300, 100, 1.0, 1.0, 2.0);
        assert!(
            (large - 0.75).abs() < (small - 0.75).abs(),
            "more data should move the posterior toward the observed rate"
        );
    }

    #[test]
    fn test_weighted_win_rate_plain() {
        let rate = weighted_win_rate(&[3.0, 1.0], &[1.0, 3.0], None);
        assert!((rate - 0.5).abs() < 1e-9);
        assert_eq!(weighted_win_rate(&[], &[], None), 0.5);
    }

    #[test]
    fn test_robust_trimmed_drops_outlier() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 100.0];
        let (trimmed, _) = robust_average(&values, RobustMethod::Trimmed, 0.1);
        let (plain, _) = robust_average(&values, RobustMethod::Trimmed, 0.0);
        assert!(trimmed < plain, "trim should discard the outlier: {trimmed} vs {plain}");
    }

    #[test]
    fn test_robust_zero_trim_falls_back_to_mean() {
        let values = [2.0, 4.0, 6.0];
        let (avg, _) = robust_average(&values, RobustMethod::Trimmed, 0.1);
        assert!((avg - 4.0).abs() < 1e-9, "0 dropped elements means plain mean: {avg}");
    }

    #[test]
    fn test_robust_median_and_winsorized() {
        let values = [1.0, 2.0, 3.0, 1000.0];
        let (median, _) = robust_average(&values, RobustMethod::Median, 0.0);
        assert!((median - 2.5).abs() < 1e-9);
        let (win, _) = robust_average(&values, RobustMethod::Winsorized, 0.25);
        assert!(win < 300.0, "winsorizing should cap the outlier: {win}");
    }

    #[test]
    fn test_regression_to_mean_formula() {
        // shrinkage = 0.01 / (0.01 + 0.04/2) = 1/3:
        // estimate = 0.5/3 + 0.9 * 2/3 = 0.7666...
        let estimate = regression_to_mean(0.9, 2, 0.5, 0.01, Some(0.04));
        assert!((estimate - (0.5 / 3.0 + 0.9 * 2.0 / 3.0)).abs() < 1e-9);
        assert!(estimate > 0.5 && estimate < 0.9, "estimate sits between prior and observed");
        assert_eq!(regression_to_mean(0.9, 0, 0.5, 0.01, None), 0.5, "no data means the prior");
        // sample_variance defaults to the population variance.
        let defaulted = regression_to_mean(0.9, 4, 0.5, 0.02, None);
        let explicit = regression_to_mean(0.9, 4, 0.5, 0.02, Some(0.02));
        assert_eq!(defaulted, explicit);
    }

    #[test]
    fn test_effective_sample_size() {
        assert!((effective_sample_size(&[1.0, 1.0, 1.0, 1.0]) - 4.0).abs() < 1e-9);
        let skewed = effective_sample_size(&[1.0, 0.01, 0.01]);
        assert!(skewed < 1.1, "one dominant weight collapses the ESS: {skewed}");
        assert_eq!(effective_sample_size(&[]), 0.0);
    }
}
