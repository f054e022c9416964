use crate::data::seed::seeded_rng;
use crate::data::{InjuryStatus, InjuryType, PlayerInjury, Sport};
use chrono::{Duration, Utc};
use rand::Rng;

/// Mock injury-report collector. Marquee scenarios for a few well-known teams
/// plus 1-3 seeded filler entries per team.
#[derive(Debug, Default)]
pub struct InjuryProvider;

const FILLER_POSITIONS: &[&str] = &["RB", "WR", "WR", "OL", "DL", "LB", "CB"];
const FILLER_TYPES: &[InjuryType] = &[
    InjuryType::AnkleSprain,
    InjuryType::Hamstring,
    InjuryType::Shoulder,
    InjuryType::Groin,
    InjuryType::Concussion,
];
const FILLER_STATUSES: &[InjuryStatus] = &[
    InjuryStatus::Questionable,
    InjuryStatus::Probable,
    InjuryStatus::Doubtful,
];

impl InjuryProvider {
    pub fn new() -> Self {
        Self
    }

    pub fn get_team_injuries(&self, team: &str, sport: Sport) -> Vec<PlayerInjury> {
        let mut injuries = Vec::new();

        if team.contains("Eagles") || team.contains("Philadelphia") {
            injuries.push(PlayerInjury {
                player_name: "Jalen Hurts".to_string(),
                position: "QB".to_string(),
                injury_type: InjuryType::KneeInjury,
                status: InjuryStatus::Questionable,
                date_injured: Some(Utc::now() - Duration::days(3)),
                is_recurring: false,
                previous_occurrences: 0,
                historical_performance_impact: 0.0,
            });
        }

        if team.contains("Chiefs") || team.contains("Kansas City") {
            injuries.push(PlayerInjury {
                player_name: "Travis Kelce".to_string(),
                position: "TE".to_string(),
                injury_type: InjuryType::AnkleSprain,
                status: InjuryStatus::Probable,
                date_injured: Some(Utc::now() - Duration::days(5)),
                is_recurring: true,
                previous_occurrences: 2,
                historical_performance_impact: 0.12,
            });
        }

        if team.contains("Bills") || team.contains("Buffalo") {
            injuries.push(PlayerInjury {
                player_name: "Josh Allen".to_string(),
                position: "QB".to_string(),
                injury_type: InjuryType::Shoulder,
                status: InjuryStatus::Probable,
                date_injured: Some(Utc::now() - Duration::days(7)),
                is_recurring: false,
                previous_occurrences: 0,
                historical_performance_impact: 0.0,
            });
        }

        let mut rng = seeded_rng(&["injuries", team, sport.as_str()]);
        let count = rng.gen_range(1..=3);
        for i in 0..count {
            let has_history = rng.gen_bool(0.5);
            injuries.push(PlayerInjury {
                player_name: format!("{team} Player {}", i + 1),
                position: FILLER_POSITIONS[rng.gen_range(0..FILLER_POSITIONS.len())].to_string(),
                injury_type: FILLER_TYPES[rng.gen_range(0..FILLER_TYPES.len())],
                status: FILLER_STATUSES[rng.gen_range(0..FILLER_STATUSES.len())],
                date_injured: Some(Utc::now() - Duration::days(rng.gen_range(1..=10))),
                is_recurring: rng.gen_bool(0.5),
                previous_occurrences: if has_history { rng.gen_range(0..=2) } else { 0 },
                historical_performance_impact: rng.gen_range(0.0..0.15),
            });
        }

        injuries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marquee_injury_included() {
        let provider = InjuryProvider::new();
        let injuries = provider.get_team_injuries("Kansas City Chiefs", Sport::Nfl);
        assert!(
            injuries.iter().any(|i| i.player_name == "Travis Kelce"),
            "Chiefs report should include the Kelce scenario"
        );
    }

    #[test]
    fn test_report_deterministic() {
        let provider = InjuryProvider::new();
        let a = provider.get_team_injuries("Dallas Cowboys", Sport::Nfl);
        let b = provider.get_team_injuries("Dallas Cowboys", Sport::Nfl);
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.player_name, y.player_name);
            assert_eq!(x.status, y.status);
            assert_eq!(x.historical_performance_impact, y.historical_performance_impact);
        }
    }

    #[test]
    fn test_filler_count_bounds() {
        let provider = InjuryProvider::new();
        let injuries = provider.get_team_injuries("Detroit Lions", Sport::Nfl);
        assert!((1..=3).contains(&injuries.len()));
    }
}
