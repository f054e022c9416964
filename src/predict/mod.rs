pub mod game;
pub mod player;

use crate::data::matchups::MatchupAdjustment;
use crate::data::Sport;
use crate::signals::SignalImpact;
use serde::Serialize;

/// Finished game-outcome prediction.
///
/// Invariants: probabilities sum to 1.0, both sit inside the configured
/// floor/ceiling band, and `predicted_winner` is the argmax side (ties go to
/// the home team).
#[derive(Debug, Clone, Serialize)]
pub struct GamePrediction {
    pub game_id: String,
    pub sport: Sport,
    pub home_team: String,
    pub away_team: String,
    pub predicted_winner: String,
    pub home_win_probability: f64,
    pub away_win_probability: f64,
    pub confidence: f64,
    /// Per-signal impact breakdown, in application order.
    pub signals: Vec<SignalImpact>,
    pub key_factors: Vec<String>,
}

impl GamePrediction {
    /// The factors payload persisted with a stored prediction; downstream
    /// error analysis keys off the per-signal records in here.
    pub fn factors_json(&self) -> serde_json::Value {
        serde_json::json!({
            "signals": self.signals,
            "key_factors": self.key_factors,
        })
    }
}

/// Finished player-prop prediction. over + under sum to 1.0 and the predicted
/// value is never negative.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerPropPrediction {
    pub player_name: String,
    pub prop_type: String,
    pub predicted_value: f64,
    pub over_probability: f64,
    pub under_probability: f64,
    pub confidence: f64,
    pub historical_avg: f64,
    pub matchup_factor: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub historical_matchup: Option<MatchupAdjustment>,
}

#[inline]
pub(crate) fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

#[inline]
pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
