use crate::config::ModelConfig;
use crate::data::matchups::MatchupSource;
use crate::data::{PlayerInjury, Sport, TeamStats, Weather};
use crate::predict::{round3, GamePrediction};
use crate::signals::coaching::CoachingAdjuster;
use crate::signals::injury::InjuryAdjuster;
use crate::signals::morale::MoraleAdjuster;
use crate::signals::props::{PropAggregateAdjuster, PropSignal};
use crate::signals::weather::WeatherAdjuster;
use crate::signals::{GameContext, SignalAdjuster};
use crate::stats::algebra::{
    normalize_probabilities, shift_probability, NormalizeMethod,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Everything the predictor needs for one game. Borrowed from the caller;
/// missing weather or empty injury lists simply mute those signals.
pub struct PredictionInput<'a> {
    pub sport: Sport,
    pub home_team: &'a str,
    pub away_team: &'a str,
    pub home_stats: &'a TeamStats,
    pub away_stats: &'a TeamStats,
    pub weather: Option<&'a Weather>,
    pub home_injuries: &'a [PlayerInjury],
    pub away_injuries: &'a [PlayerInjury],
}

/// Game outcome predictor. Immutable once constructed; every prediction is a
/// pure single pass over the signal adjusters in a fixed, documented order:
/// weather, coaching, morale, injuries, then (caller-supplied) player props.
pub struct GamePredictor {
    cfg: ModelConfig,
    adjusters: Vec<Box<dyn SignalAdjuster>>,
    prop_aggregate: PropAggregateAdjuster,
}

impl GamePredictor {
    pub fn new(cfg: ModelConfig, matchups: Arc<dyn MatchupSource>) -> Self {
        let adjusters: Vec<Box<dyn SignalAdjuster>> = vec![
            Box::new(WeatherAdjuster::new(&cfg)),
            Box::new(CoachingAdjuster::new(&cfg, matchups)),
            Box::new(MoraleAdjuster::new(&cfg)),
            Box::new(InjuryAdjuster::new(&cfg)),
        ];
        let prop_aggregate = PropAggregateAdjuster::new(&cfg);
        Self {
            cfg,
            adjusters,
            prop_aggregate,
        }
    }

    /// Overall team strength in [0.1, 0.9] from the stat line.
    pub fn team_strength(&self, stats: &TeamStats) -> f64 {
        let strength = stats.win_rate * 0.4
            + (stats.points_per_game / 100.0) * 0.3
            + (1.0 - stats.points_allowed_per_game / 100.0) * 0.2
            + stats.recent_form * 0.1;
        strength.clamp(0.1, 0.9)
    }

    pub fn predict_game(&self, game_id: &str, input: &PredictionInput<'_>) -> GamePrediction {
        let home_strength = self.team_strength(input.home_stats) + self.cfg.home_advantage;
        let away_strength = self.team_strength(input.away_stats);

        // Base probability from normalized strengths.
        let mut scores = HashMap::new();
        scores.insert("home".to_string(), home_strength);
        scores.insert("away".to_string(), away_strength);
        let normalized = normalize_probabilities(&scores, NormalizeMethod::Softmax);
        let mut home_prob = normalized.get("home").copied().unwrap_or(0.5);

        let ctx = GameContext {
            sport: input.sport,
            home_team: input.home_team,
            away_team: input.away_team,
            home_stats: input.home_stats,
            away_stats: input.away_stats,
            home_strength,
            away_strength,
            weather: input.weather,
            home_injuries: input.home_injuries,
            away_injuries: input.away_injuries,
        };

        let mut signals = Vec::with_capacity(self.adjusters.len());
        for adjuster in &self.adjusters {
            match adjuster.evaluate(&ctx) {
                Some(mut impact) => {
                    let before = home_prob;
                    home_prob = self.apply(home_prob, impact.adjustment);
                    impact.applied_delta = home_prob - before;
                    signals.push(impact);
                }
                None => {
                    tracing::debug!(
                        signal = adjuster.name(),
                        game_id = %game_id,
                        "signal skipped, data unavailable"
                    );
                }
            }
        }

        let mut prediction = GamePrediction {
            game_id: game_id.to_string(),
            sport: input.sport,
            home_team: input.home_team.to_string(),
            away_team: input.away_team.to_string(),
            predicted_winner: String::new(),
            home_win_probability: home_prob,
            away_win_probability: 1.0 - home_prob,
            confidence: 0.0,
            signals,
            key_factors: self.static_factors(input),
        };
        self.finalize(&mut prediction);
        prediction
    }

    /// Fold finished per-player prop predictions into an existing game
    /// prediction. Run after `predict_game` when prop data is available.
    pub fn apply_prop_signal(
        &self,
        prediction: &mut GamePrediction,
        home_props: &[PropSignal],
        away_props: &[PropSignal],
    ) {
        let Some(mut impact) = self.prop_aggregate.aggregate(
            &prediction.home_team,
            &prediction.away_team,
            home_props,
            away_props,
        ) else {
            return;
        };

        let before = prediction.home_win_probability;
        let after = self.apply(before, impact.adjustment);
        impact.applied_delta = after - before;
        prediction.home_win_probability = after;
        prediction.away_win_probability = 1.0 - after;
        prediction.signals.push(impact);
        self.finalize(prediction);
    }

    /// One signal application: log-odds shift, then clamp back into the
    /// configured probability band.
    #[inline]
    fn apply(&self, home_prob: f64, adjustment: f64) -> f64 {
        shift_probability(home_prob, adjustment)
            .clamp(self.cfg.prob_floor, self.cfg.prob_ceiling)
    }

    /// Settle the derived fields from the probabilities: renormalize on
    /// drift, pick the argmax winner (ties to home), recompute confidence,
    /// and pull significant signal factors into the key-factor list.
    fn finalize(&self, prediction: &mut GamePrediction) {
        let mut home = prediction.home_win_probability;
        let mut away = prediction.away_win_probability;

        if !home.is_finite() || !away.is_finite() {
            home = 0.5;
            away = 0.5;
        }
        if (home + away - 1.0).abs() > 0.01 {
            let mut scores = HashMap::new();
            scores.insert("home".to_string(), home);
            scores.insert("away".to_string(), away);
            let renormalized = normalize_probabilities(&scores, NormalizeMethod::Softmax);
            home = renormalized["home"];
        }

        home = round3(home);
        away = round3(1.0 - home);

        prediction.home_win_probability = home;
        prediction.away_win_probability = away;
        // Argmax with ties to the home side; this also repairs any
        // winner/probability contradiction introduced by a later signal.
        prediction.predicted_winner = if home >= away {
            prediction.home_team.clone()
        } else {
            prediction.away_team.clone()
        };
        prediction.confidence = round3((home - away).abs());

        let mut key_factors = self.static_factors_from(prediction);
        for impact in &prediction.signals {
            if impact.applied_delta.abs() >= self.cfg.factor_threshold {
                key_factors.extend(impact.factors.iter().take(2).cloned());
            }
        }
        prediction.key_factors = key_factors;
    }

    fn static_factors(&self, input: &PredictionInput<'_>) -> Vec<String> {
        let mut factors = Vec::new();
        if input.home_stats.win_rate > input.away_stats.win_rate + 0.2 {
            factors.push("Home team has significantly better record".to_string());
        } else if input.away_stats.win_rate > input.home_stats.win_rate + 0.2 {
            factors.push("Away team has significantly better record".to_string());
        }
        factors
    }

    fn static_factors_from(&self, prediction: &GamePrediction) -> Vec<String> {
        prediction
            .key_factors
            .iter()
            .filter(|f| f.contains("significantly better record"))
            .cloned()
            .collect()
    }
}
