use crate::data::seed::seeded_rng;
use crate::data::Sport;
use rand::Rng;
use serde::Serialize;
use std::collections::HashMap;

/// Mock bookmaker odds. Real integrations would sit behind the same shape.
#[derive(Debug, Default)]
pub struct OddsProvider;

pub const PLATFORMS: &[&str] = &["bet365", "draftkings", "thescore_bet"];

#[derive(Debug, Clone, Serialize)]
pub struct GameOdds {
    pub platform: String,
    pub home_team_odds: f64,
    pub away_team_odds: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PropOdds {
    pub platform: String,
    pub over_odds: f64,
    pub under_odds: f64,
}

impl OddsProvider {
    pub fn new() -> Self {
        Self
    }

    /// Decimal moneyline odds per platform for a game.
    pub fn get_game_odds(
        &self,
        home_team: &str,
        away_team: &str,
        sport: Sport,
    ) -> HashMap<String, GameOdds> {
        PLATFORMS
            .iter()
            .map(|platform| {
                let mut rng =
                    seeded_rng(&["game_odds", platform, home_team, away_team, sport.as_str()]);
                (
                    platform.to_string(),
                    GameOdds {
                        platform: platform.to_string(),
                        home_team_odds: round2(rng.gen_range(1.5..3.0)),
                        away_team_odds: round2(rng.gen_range(1.5..3.0)),
                    },
                )
            })
            .collect()
    }

    /// Over/under decimal odds per platform for a player prop.
    pub fn get_player_prop_odds(
        &self,
        player: &str,
        prop_type: &str,
        sport: Sport,
    ) -> HashMap<String, PropOdds> {
        PLATFORMS
            .iter()
            .map(|platform| {
                let mut rng =
                    seeded_rng(&["prop_odds", platform, player, prop_type, sport.as_str()]);
                (
                    platform.to_string(),
                    PropOdds {
                        platform: platform.to_string(),
                        over_odds: round2(rng.gen_range(1.7..2.1)),
                        under_odds: round2(rng.gen_range(1.7..2.1)),
                    },
                )
            })
            .collect()
    }

    /// Best available home-side odds across platforms.
    pub fn find_best_odds(odds: &HashMap<String, GameOdds>, home_side: bool) -> Option<&GameOdds> {
        odds.values().max_by(|a, b| {
            let (x, y) = if home_side {
                (a.home_team_odds, b.home_team_odds)
            } else {
                (a.away_team_odds, b.away_team_odds)
            };
            x.total_cmp(&y)
        })
    }
}

#[inline]
fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
