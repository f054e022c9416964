pub mod coaching;
pub mod injury;
pub mod morale;
pub mod props;
pub mod weather;

use crate::data::{PlayerInjury, Sport, TeamStats, Weather};
use smallvec::SmallVec;

/// Everything a signal adjuster may consult for one game. Borrowed, read-only.
pub struct GameContext<'a> {
    pub sport: Sport,
    pub home_team: &'a str,
    pub away_team: &'a str,
    pub home_stats: &'a TeamStats,
    pub away_stats: &'a TeamStats,
    pub home_strength: f64,
    pub away_strength: f64,
    pub weather: Option<&'a Weather>,
    pub home_injuries: &'a [PlayerInjury],
    pub away_injuries: &'a [PlayerInjury],
}

/// One signal's verdict on a game.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SignalImpact {
    pub signal: &'static str,
    /// Signed probability-scale adjustment in the home team's favor, before
    /// log-odds application and clamping.
    pub adjustment: f64,
    /// Realized home-probability change once applied. Filled in by the
    /// predictor; zero until then.
    pub applied_delta: f64,
    /// Human-readable factor strings, most significant first.
    pub factors: SmallVec<[String; 4]>,
    /// Structured per-signal breakdown, persisted with the prediction for
    /// downstream error analysis.
    pub detail: serde_json::Value,
}

impl SignalImpact {
    pub fn new(signal: &'static str, adjustment: f64) -> Self {
        Self {
            signal,
            adjustment,
            applied_delta: 0.0,
            factors: SmallVec::new(),
            detail: serde_json::Value::Null,
        }
    }
}

/// A probability signal consulted during game prediction.
///
/// `evaluate` must be pure with respect to its inputs and must never panic.
/// Returning `None` means the signal's data dependency was unavailable or the
/// signal does not apply; the predictor skips it and the prediction proceeds.
pub trait SignalAdjuster: Send + Sync {
    fn name(&self) -> &'static str;
    fn evaluate(&self, ctx: &GameContext<'_>) -> Option<SignalImpact>;
}
