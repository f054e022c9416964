use crate::config::ModelConfig;
use crate::data::PlayerInjury;
use crate::signals::{GameContext, SignalAdjuster, SignalImpact};
use std::collections::HashMap;

/// Injury signal. Aggregates each roster's injury report into a single
/// impact score, then converts the home/away differential into a shift.
pub struct InjuryAdjuster {
    swing: f64,
    cap: f64,
}

/// How much losing a player at each position hurts.
const POSITION_WEIGHTS: &[(&str, f64)] = &[
    ("QB", 0.30),
    ("RB", 0.15),
    ("WR", 0.12),
    ("TE", 0.08),
    ("OL", 0.10),
    ("DL", 0.08),
    ("LB", 0.08),
    ("CB", 0.06),
    ("S", 0.03),
];

const DEFAULT_POSITION_WEIGHT: f64 = 0.05;

/// Per-player impacts above this are worth calling out by name.
const KEY_INJURY_THRESHOLD: f64 = 0.05;

fn position_weight(position: &str) -> f64 {
    POSITION_WEIGHTS
        .iter()
        .find(|(p, _)| *p == position)
        .map(|(_, w)| *w)
        .unwrap_or(DEFAULT_POSITION_WEIGHT)
}

#[derive(Debug)]
struct TeamInjuryImpact {
    total: f64,
    position_impacts: HashMap<String, f64>,
    key_injuries: Vec<(String, String, &'static str, &'static str)>,
}

impl InjuryAdjuster {
    pub fn new(cfg: &ModelConfig) -> Self {
        Self {
            swing: cfg.injury_swing,
            cap: cfg.injury_cap,
        }
    }

    fn team_impact(&self, injuries: &[PlayerInjury]) -> TeamInjuryImpact {
        let mut total = 0.0;
        let mut position_impacts: HashMap<String, f64> = HashMap::new();
        let mut key_injuries = Vec::new();

        for injury in injuries {
            let base = injury.injury_type.severity();
            let status = injury.status.impact_multiplier();
            let recurrence = if injury.is_recurring { 1.2 } else { 1.0 };
            // Past performance drops override the generic severity when known.
            let historical = if injury.historical_performance_impact > 0.0 {
                injury.historical_performance_impact
            } else {
                base
            };

            let impact = base * status * recurrence * historical * position_weight(&injury.position);
            total += impact;
            *position_impacts.entry(injury.position.clone()).or_insert(0.0) += impact;

            if impact > KEY_INJURY_THRESHOLD {
                key_injuries.push((
                    injury.player_name.clone(),
                    injury.position.clone(),
                    injury.status.as_str(),
                    injury.injury_type.description(),
                ));
            }
        }

        TeamInjuryImpact {
            total: total.min(self.cap),
            position_impacts,
            key_injuries,
        }
    }
}

fn impact_tier(total: f64) -> &'static str {
    if total > 0.3 {
        "Severe injury impact - multiple key players affected"
    } else if total > 0.15 {
        "Moderate injury impact - some key players affected"
    } else {
        "Minor injury impact"
    }
}

impl SignalAdjuster for InjuryAdjuster {
    fn name(&self) -> &'static str {
        "injury"
    }

    fn evaluate(&self, ctx: &GameContext<'_>) -> Option<SignalImpact> {
        if ctx.home_injuries.is_empty() && ctx.away_injuries.is_empty() {
            return None;
        }

        let home = self.team_impact(ctx.home_injuries);
        let away = self.team_impact(ctx.away_injuries);

        // More away injuries helps the home side and vice versa. Strong teams
        // have more to lose, so the shift scales with team strength.
        let strength = 0.5 * (ctx.home_strength + ctx.away_strength);
        let adjustment = (away.total - home.total) * self.swing * strength;

        let mut impact = SignalImpact::new("injury", adjustment);

        if adjustment > 0.01 {
            impact.factors.push(format!(
                "{} injuries favor {}",
                ctx.away_team, ctx.home_team
            ));
        } else if adjustment < -0.01 {
            impact.factors.push(format!(
                "{} injuries favor {}",
                ctx.home_team, ctx.away_team
            ));
        }
        for (name, position, status, description) in
            home.key_injuries.iter().chain(away.key_injuries.iter()).take(3)
        {
            impact.factors.push(format!(
                "{name} ({position}) - {}: {description}",
                status.to_uppercase()
            ));
        }

        impact.detail = serde_json::json!({
            "home": {
                "team": ctx.home_team,
                "total_impact": home.total,
                "tier": impact_tier(home.total),
                "position_impacts": home.position_impacts,
            },
            "away": {
                "team": ctx.away_team,
                "total_impact": away.total,
                "tier": impact_tier(away.total),
                "position_impacts": away.position_impacts,
            },
            "adjustment": adjustment,
        });

        Some(impact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{InjuryStatus, InjuryType, Sport, TeamStats};

    fn injury(position: &str, status: InjuryStatus) -> PlayerInjury {
        PlayerInjury {
            player_name: format!("{position} Starter"),
            position: position.to_string(),
            injury_type: InjuryType::KneeInjury,
            status,
            date_injured: None,
            is_recurring: false,
            previous_occurrences: 0,
            historical_performance_impact: 0.0,
        }
    }

    fn ctx<'a>(
        home: &'a [PlayerInjury],
        away: &'a [PlayerInjury],
        stats: &'a TeamStats,
    ) -> GameContext<'a> {
        GameContext {
            sport: Sport::Nfl,
            home_team: "Home",
            away_team: "Away",
            home_stats: stats,
            away_stats: stats,
            home_strength: 0.5,
            away_strength: 0.5,
            weather: None,
            home_injuries: home,
            away_injuries: away,
        }
    }

    #[test]
    fn test_no_injuries_not_applicable() {
        let stats = TeamStats::default();
        let adjuster = InjuryAdjuster::new(&ModelConfig::default());
        assert!(adjuster.evaluate(&ctx(&[], &[], &stats)).is_none());
    }

    #[test]
    fn test_away_qb_out_favors_home() {
        let stats = TeamStats::default();
        let adjuster = InjuryAdjuster::new(&ModelConfig::default());
        let away = vec![injury("QB", InjuryStatus::Out)];
        let impact = adjuster.evaluate(&ctx(&[], &away, &stats)).unwrap();
        assert!(impact.adjustment > 0.0, "home should gain: {}", impact.adjustment);
    }

    #[test]
    fn test_status_scales_impact() {
        let stats = TeamStats::default();
        let adjuster = InjuryAdjuster::new(&ModelConfig::default());
        let out = vec![injury("QB", InjuryStatus::Out)];
        let probable = vec![injury("QB", InjuryStatus::Probable)];
        let big = adjuster.evaluate(&ctx(&[], &out, &stats)).unwrap();
        let small = adjuster.evaluate(&ctx(&[], &probable, &stats)).unwrap();
        assert!(
            big.adjustment > small.adjustment,
            "OUT must outweigh PROBABLE: {} vs {}",
            big.adjustment,
            small.adjustment
        );
        let active = vec![injury("QB", InjuryStatus::Active)];
        let none = adjuster.evaluate(&ctx(&[], &active, &stats)).unwrap();
        assert_eq!(none.adjustment, 0.0, "active players contribute nothing");
    }

    #[test]
    fn test_qb_outweighs_safety() {
        let stats = TeamStats::default();
        let adjuster = InjuryAdjuster::new(&ModelConfig::default());
        let qb = vec![injury("QB", InjuryStatus::Out)];
        let safety = vec![injury("S", InjuryStatus::Out)];
        let qb_impact = adjuster.evaluate(&ctx(&[], &qb, &stats)).unwrap();
        let s_impact = adjuster.evaluate(&ctx(&[], &safety, &stats)).unwrap();
        assert!(qb_impact.adjustment > s_impact.adjustment);
    }

    #[test]
    fn test_total_impact_capped() {
        let stats = TeamStats::default();
        let cfg = ModelConfig::default();
        let adjuster = InjuryAdjuster::new(&cfg);
        // A pile of severe recurring injuries with big historical drops.
        let away: Vec<PlayerInjury> = (0..20)
            .map(|i| PlayerInjury {
                player_name: format!("Player {i}"),
                position: "QB".to_string(),
                injury_type: InjuryType::Achilles,
                status: InjuryStatus::Out,
                date_injured: None,
                is_recurring: true,
                previous_occurrences: 3,
                historical_performance_impact: 0.9,
            })
            .collect();
        let impact = adjuster.evaluate(&ctx(&[], &away, &stats)).unwrap();
        // Aggregate impact caps at injury_cap; both strengths are 0.5 here.
        let max = cfg.injury_cap * cfg.injury_swing * 0.5;
        assert!(
            impact.adjustment <= max + 1e-12,
            "adjustment {} exceeds cap {max}",
            impact.adjustment
        );
    }

    #[test]
    fn test_balanced_reports_cancel() {
        let stats = TeamStats::default();
        let adjuster = InjuryAdjuster::new(&ModelConfig::default());
        let home = vec![injury("RB", InjuryStatus::Questionable)];
        let away = vec![injury("RB", InjuryStatus::Questionable)];
        let impact = adjuster.evaluate(&ctx(&home, &away, &stats)).unwrap();
        assert!(impact.adjustment.abs() < 1e-12, "mirror reports cancel out");
    }
}
