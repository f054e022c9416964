use std::collections::HashMap;

/// Probability algebra primitives.
///
/// Everything here is a pure function on f64s. Probabilities are kept inside
/// the open interval (0, 1) in internal code paths -- callers clamp with
/// `clamp_open` before converting to log-odds so the conversions stay finite.

/// Floor used when taking logs of raw scores and when clamping probabilities
/// into the open interval.
pub const PROB_FLOOR: f64 = 1e-10;

/// Log-odds shift per unit of probability-scale adjustment. Equal to
/// 1 / (p * (1 - p)) at p = 0.5, so a +0.05 adjustment moves an even game by
/// about five points and tapers off toward the extremes.
const LOGIT_SCALE: f64 = 4.0;

/// ln(p / (1 - p)). Returns the infinite sentinel (not an error) outside the
/// open interval; production paths clamp inputs with `clamp_open` first.
#[inline]
pub fn probability_to_log_odds(p: f64) -> f64 {
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }
    (p / (1.0 - p)).ln()
}

/// Logistic function: 1 / (1 + e^-x). Total, no failure mode.
#[inline]
pub fn log_odds_to_probability(log_odds: f64) -> f64 {
    1.0 / (1.0 + (-log_odds).exp())
}

/// Clamp a probability into the open interval so log-odds stay finite.
#[inline]
pub fn clamp_open(p: f64) -> f64 {
    p.clamp(PROB_FLOOR, 1.0 - PROB_FLOOR)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeMethod {
    /// Log-space normalization, robust to very small or zero inputs.
    Softmax,
    /// Divide by the sum; an all-zero input falls back to uniform.
    Linear,
}

/// Normalize raw scores into a distribution that sums to 1.0.
pub fn normalize_probabilities(
    scores: &HashMap<String, f64>,
    method: NormalizeMethod,
) -> HashMap<String, f64> {
    if scores.is_empty() {
        return HashMap::new();
    }

    match method {
        NormalizeMethod::Softmax => {
            // Work in log space, subtracting the max log-score for stability.
            let max_log = scores
                .values()
                .map(|&p| p.max(PROB_FLOOR).ln())
                .fold(f64::NEG_INFINITY, f64::max);
            let exp_scores: HashMap<String, f64> = scores
                .iter()
                .map(|(k, &p)| (k.clone(), (p.max(PROB_FLOOR).ln() - max_log).exp()))
                .collect();
            let total: f64 = exp_scores.values().sum();
            exp_scores.into_iter().map(|(k, v)| (k, v / total)).collect()
        }
        NormalizeMethod::Linear => {
            let total: f64 = scores.values().sum();
            if total == 0.0 {
                let uniform = 1.0 / scores.len() as f64;
                return scores.keys().map(|k| (k.clone(), uniform)).collect();
            }
            scores.iter().map(|(k, &v)| (k.clone(), v / total)).collect()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombineMethod {
    /// Weighted average in log-odds space. The statistically sound way to
    /// merge independent estimates of the same outcome -- use this whenever
    /// two or more probabilities are blended.
    LogOdds,
    /// Weighted geometric mean.
    Geometric,
}

/// Combine multiple probability estimates for the same outcome.
/// Empty input or zero total weight yields the uninformative 0.5.
pub fn combine_probabilities(
    probs: &[f64],
    weights: Option<&[f64]>,
    method: CombineMethod,
) -> f64 {
    if probs.is_empty() {
        return 0.5;
    }

    let uniform = vec![1.0; probs.len()];
    let weights = weights.unwrap_or(&uniform);
    let total_weight: f64 = weights.iter().sum();
    if total_weight == 0.0 {
        return 0.5;
    }

    match method {
        CombineMethod::LogOdds => {
            let weighted: f64 = probs
                .iter()
                .zip(weights)
                .map(|(&p, &w)| probability_to_log_odds(clamp_open(p)) * w)
                .sum();
            log_odds_to_probability(weighted / total_weight)
        }
        CombineMethod::Geometric => {
            let weighted_log: f64 = probs
                .iter()
                .zip(weights)
                .map(|(&p, &w)| p.max(PROB_FLOOR).ln() * w)
                .sum();
            (weighted_log / total_weight).exp()
        }
    }
}

/// Apply a probability-scale adjustment to `p` in log-odds space.
///
/// All signal adjusters compose through this one function so their effects
/// add in a single domain regardless of where each rule set was calibrated.
#[inline]
pub fn shift_probability(p: f64, adjustment: f64) -> f64 {
    let lo = probability_to_log_odds(clamp_open(p));
    log_odds_to_probability(lo + adjustment * LOGIT_SCALE)
}
