use crate::config::ModelConfig;
use crate::data::matchups::MatchupSource;
use crate::data::{PlayerInjury, PlayerStats, TeamStats};
use crate::predict::{round2, round3, PlayerPropPrediction};
use crate::stats::algebra::{combine_probabilities, CombineMethod};
use statrs::distribution::{ContinuousCDF, Normal};
use std::sync::Arc;

/// Weight of the calculated over-probability vs. the historical over-rate.
const CALC_BLEND_WEIGHT: f64 = 0.7;
const HISTORY_BLEND_WEIGHT: f64 = 0.3;

/// Player-prop predictor. Produces a predicted stat value and an over/under
/// probability against an optional betting line.
pub struct PropPredictor {
    sigma_ratio: f64,
    matchups: Arc<dyn MatchupSource>,
    normal: Normal,
}

/// Inputs for one prop prediction.
pub struct PropQuery<'a> {
    pub player_name: &'a str,
    pub prop_type: &'a str,
    pub player_stats: &'a PlayerStats,
    pub opponent_stats: &'a TeamStats,
    /// Fallback per-game average when the stat line lacks this prop.
    pub historical_avg: f64,
    pub line: Option<f64>,
    pub opponent_team: Option<&'a str>,
    pub opponent_coach: Option<&'a str>,
    pub injury: Option<&'a PlayerInjury>,
}

impl PropPredictor {
    pub fn new(cfg: &ModelConfig, matchups: Arc<dyn MatchupSource>) -> Self {
        // Normal::new(0, 1) only fails for non-positive std-dev.
        let normal = Normal::new(0.0, 1.0).unwrap_or(Normal::standard());
        Self {
            sigma_ratio: cfg.prop_sigma_ratio,
            matchups,
            normal,
        }
    }

    pub fn predict_prop(&self, query: &PropQuery<'_>) -> PlayerPropPrediction {
        let base_avg = query
            .player_stats
            .prop_average(query.prop_type)
            .unwrap_or(query.historical_avg);

        // Opponent defensive quality scales the baseline into [0.7, 1.3].
        let defense = query.opponent_stats.defense_vs(query.prop_type);
        let matchup_factor = (1.0 + (0.5 - defense) * 0.3).clamp(0.7, 1.3);

        // Historical matchup data takes precedence over the defensive factor
        // when both opponent identifiers are known.
        let historical_matchup = match (query.opponent_team, query.opponent_coach) {
            (Some(team), Some(coach)) => Some(self.matchups.matchup_adjustment(
                query.player_name,
                team,
                coach,
                query.prop_type,
                base_avg,
            )),
            _ => None,
        };

        let mut predicted_value = match &historical_matchup {
            Some(adjustment) => adjustment.adjusted_prediction,
            None => base_avg * matchup_factor,
        };

        if let Some(injury) = query.injury {
            predicted_value *= 1.0 - injury.status.impact_multiplier();
        }
        predicted_value = predicted_value.max(0.0);

        let over_probability = match query.line {
            Some(line) => {
                let calculated = self.over_probability(predicted_value, line);
                match &historical_matchup {
                    Some(adjustment) if adjustment.historical_games > 0 => {
                        // Blend the model estimate with the observed over-rate,
                        // merged in log-odds space like any pair of estimates
                        // for the same outcome.
                        let games = adjustment.historical_games as f64;
                        let team_games = games * 0.6;
                        let coach_games = games * 0.4;
                        let historical_rate = (adjustment.team_over_rate * team_games
                            + adjustment.coach_over_rate * coach_games)
                            / games;
                        combine_probabilities(
                            &[calculated, historical_rate],
                            Some(&[CALC_BLEND_WEIGHT, HISTORY_BLEND_WEIGHT]),
                            CombineMethod::LogOdds,
                        )
                    }
                    _ => calculated,
                }
            }
            None => 0.5,
        };

        let base_confidence = (query.player_stats.consistency * 0.9).min(0.95);
        let confidence_boost = historical_matchup
            .as_ref()
            .map(|a| a.confidence_boost)
            .unwrap_or(0.0);
        let confidence = (base_confidence + confidence_boost).min(0.95);

        let over = round3(over_probability);
        PlayerPropPrediction {
            player_name: query.player_name.to_string(),
            prop_type: query.prop_type.to_string(),
            predicted_value: round2(predicted_value),
            over_probability: over,
            under_probability: round3(1.0 - over),
            confidence: round3(confidence),
            historical_avg: round2(query.historical_avg),
            matchup_factor: round3(matchup_factor),
            historical_matchup,
        }
    }

    /// P(actual > line) under a normal approximation whose spread scales with
    /// the predicted value. A degenerate sigma reads as a coin flip.
    fn over_probability(&self, predicted_value: f64, line: f64) -> f64 {
        let sigma = self.sigma_ratio * predicted_value;
        if sigma <= 0.0 {
            return 0.5;
        }
        let z = (line - predicted_value) / sigma;
        1.0 - self.normal.cdf(z)
    }
}
