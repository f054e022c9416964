use crate::config::ModelConfig;
use crate::signals::SignalImpact;
use serde::{Deserialize, Serialize};

/// Player-prop aggregate signal.
///
/// Unlike the other adjusters this one cannot be computed from the game
/// context alone -- it consumes finished per-player prop predictions, so the
/// caller invokes it explicitly after the base prediction.
pub struct PropAggregateAdjuster {
    cap: f64,
}

/// The slice of a prop prediction this signal needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropSignal {
    pub player_name: String,
    pub position: String,
    /// Historical-matchup adjustment applied to the player's prediction.
    pub total_adjustment: f64,
    pub over_probability: f64,
}

/// Offensive positions drive outcomes at very different rates.
const POSITION_WEIGHTS: &[(&str, f64)] = &[
    ("QB", 0.40),
    ("RB", 0.25),
    ("WR", 0.20),
    ("TE", 0.15),
];

const DEFAULT_POSITION_WEIGHT: f64 = 0.10;

fn position_weight(position: &str) -> f64 {
    POSITION_WEIGHTS
        .iter()
        .find(|(p, _)| *p == position)
        .map(|(_, w)| *w)
        .unwrap_or(DEFAULT_POSITION_WEIGHT)
}

impl PropAggregateAdjuster {
    pub fn new(cfg: &ModelConfig) -> Self {
        Self {
            cap: cfg.prop_aggregate_cap,
        }
    }

    /// Position-weighted mean of per-player edges. A player's edge is their
    /// historical-matchup adjustment plus how far their over-probability sits
    /// from the coin flip.
    fn team_advantage(props: &[PropSignal]) -> f64 {
        if props.is_empty() {
            return 0.0;
        }
        let mut weighted = 0.0;
        let mut weight_sum = 0.0;
        for prop in props {
            let weight = position_weight(&prop.position);
            let edge = prop.total_adjustment + (prop.over_probability - 0.5);
            weighted += edge * weight;
            weight_sum += weight;
        }
        if weight_sum == 0.0 {
            0.0
        } else {
            weighted / weight_sum
        }
    }

    pub fn aggregate(
        &self,
        home_team: &str,
        away_team: &str,
        home_props: &[PropSignal],
        away_props: &[PropSignal],
    ) -> Option<SignalImpact> {
        if home_props.is_empty() && away_props.is_empty() {
            return None;
        }

        let home_advantage = Self::team_advantage(home_props);
        let away_advantage = Self::team_advantage(away_props);
        let adjustment = (home_advantage - away_advantage).clamp(-self.cap, self.cap);

        let mut impact = SignalImpact::new("player_props", adjustment);
        if adjustment > 0.02 {
            impact.factors.push(format!(
                "{home_team} key players have favorable historical matchups (+{:.1}% advantage)",
                adjustment * 100.0
            ));
        } else if adjustment < -0.02 {
            impact.factors.push(format!(
                "{away_team} key players have favorable historical matchups ({:.1}% advantage)",
                adjustment.abs() * 100.0
            ));
        }

        impact.detail = serde_json::json!({
            "home_advantage": home_advantage,
            "away_advantage": away_advantage,
            "home_props_considered": home_props.len(),
            "away_props_considered": away_props.len(),
            "adjustment": adjustment,
        });

        Some(impact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(position: &str, adjustment: f64, over: f64) -> PropSignal {
        PropSignal {
            player_name: "Player".to_string(),
            position: position.to_string(),
            total_adjustment: adjustment,
            over_probability: over,
        }
    }

    #[test]
    fn test_empty_props_not_applicable() {
        let adjuster = PropAggregateAdjuster::new(&ModelConfig::default());
        assert!(adjuster.aggregate("H", "A", &[], &[]).is_none());
    }

    #[test]
    fn test_home_edge_positive() {
        let adjuster = PropAggregateAdjuster::new(&ModelConfig::default());
        let home = vec![signal("QB", 0.05, 0.6)];
        let away = vec![signal("QB", -0.05, 0.4)];
        let impact = adjuster.aggregate("H", "A", &home, &away).unwrap();
        assert!(impact.adjustment > 0.0);
    }

    #[test]
    fn test_qb_weighs_more_than_te() {
        let adjuster = PropAggregateAdjuster::new(&ModelConfig::default());
        // Same per-player edges, but home's sits on the QB.
        let home = vec![signal("QB", 0.10, 0.5), signal("TE", -0.10, 0.5)];
        let away: Vec<PropSignal> = Vec::new();
        let impact = adjuster.aggregate("H", "A", &home, &away).unwrap();
        assert!(
            impact.adjustment > 0.0,
            "QB edge should dominate the TE drag: {}",
            impact.adjustment
        );
    }

    #[test]
    fn test_cap_applied() {
        let cfg = ModelConfig::default();
        let adjuster = PropAggregateAdjuster::new(&cfg);
        let home = vec![signal("QB", 0.5, 0.95)];
        let impact = adjuster.aggregate("H", "A", &home, &[]).unwrap();
        assert!(
            (impact.adjustment - cfg.prop_aggregate_cap).abs() < 1e-12,
            "net advantage must clamp at the cap: {}",
            impact.adjustment
        );
    }

    #[test]
    fn test_factor_text_only_when_material() {
        let adjuster = PropAggregateAdjuster::new(&ModelConfig::default());
        let home = vec![signal("WR", 0.005, 0.505)];
        let impact = adjuster.aggregate("H", "A", &home, &[]).unwrap();
        assert!(impact.factors.is_empty(), "tiny edges stay out of key factors");
    }
}
