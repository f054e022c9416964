use crate::config::ModelConfig;
use crate::data::matchups::MatchupSource;
use crate::signals::{GameContext, SignalAdjuster, SignalImpact};
use crate::stats::averages::{bayesian_win_rate, weighted_win_rate};
use std::sync::Arc;

/// Head-coach matchup signal. Looks up the head-to-head record between the
/// two coaches and converts the win-rate edge into a capped shift.
///
/// The record is 2-8 games, so the raw ratio is useless; the advantage is
/// read off the Beta-Binomial posterior mean (uniform prior, strength 2.0),
/// which shrinks short records hard and lets longer ones speak.
pub struct CoachingAdjuster {
    moderate_shift: f64,
    strong_shift: f64,
    cap: f64,
    matchups: Arc<dyn MatchupSource>,
}

const PRIOR_STRENGTH: f64 = 2.0;

impl CoachingAdjuster {
    pub fn new(cfg: &ModelConfig, matchups: Arc<dyn MatchupSource>) -> Self {
        Self {
            moderate_shift: cfg.coaching_moderate_shift,
            strong_shift: cfg.coaching_strong_shift,
            cap: cfg.coaching_cap,
            matchups,
        }
    }
}

impl SignalAdjuster for CoachingAdjuster {
    fn name(&self) -> &'static str {
        "coaching"
    }

    fn evaluate(&self, ctx: &GameContext<'_>) -> Option<SignalImpact> {
        let home_coach = self.matchups.head_coach(ctx.home_team, ctx.sport);
        let away_coach = self.matchups.head_coach(ctx.away_team, ctx.sport);
        if home_coach == "Unknown Coach" || away_coach == "Unknown Coach" {
            return None;
        }

        let history = self.matchups.coach_vs_coach(&home_coach, &away_coach);
        if history.num_games == 0 {
            return None;
        }

        let (posterior_home_rate, rate_lower, rate_upper) = bayesian_win_rate(
            history.home_wins,
            history.away_wins,
            1.0,
            1.0,
            PRIOR_STRENGTH,
        );

        // Recency-weighted view of the same record, reported alongside the
        // posterior so a stale edge is visible in the breakdown.
        let wins: Vec<f64> = history
            .games
            .iter()
            .map(|g| if g.winner == "home" { 1.0 } else { 0.0 })
            .collect();
        let losses: Vec<f64> = wins.iter().map(|w| 1.0 - w).collect();
        let weights: Vec<f64> = (1..=wins.len()).map(|i| i as f64).collect();
        let recency_weighted_home_rate = weighted_win_rate(&wins, &losses, Some(&weights));

        let mut adjustment = if posterior_home_rate > 0.70 {
            self.strong_shift
        } else if posterior_home_rate > 0.60 {
            self.moderate_shift
        } else if posterior_home_rate < 0.30 {
            -self.strong_shift
        } else if posterior_home_rate < 0.40 {
            -self.moderate_shift
        } else {
            0.0
        };

        // Blowout histories mean the edge is real; coin-flip margins don't.
        if history.avg_point_differential.abs() > 7.0 {
            adjustment *= 1.2;
        } else if history.avg_point_differential.abs() < 3.0 {
            adjustment *= 0.8;
        }
        adjustment = adjustment.clamp(-self.cap, self.cap);

        let mut impact = SignalImpact::new("coaching", adjustment);
        impact.factors.push(coaching_insight(
            &home_coach,
            &away_coach,
            ctx.home_team,
            ctx.away_team,
            &history.home_record,
            &history.away_record,
            posterior_home_rate,
            history.num_games,
        ));

        impact.detail = serde_json::json!({
            "home_coach": home_coach,
            "away_coach": away_coach,
            "record": history.home_record,
            "num_games": history.num_games,
            "raw_home_win_rate": history.home_win_rate,
            "recency_weighted_home_rate": recency_weighted_home_rate,
            "posterior_home_win_rate": posterior_home_rate,
            "posterior_interval": [rate_lower, rate_upper],
            "avg_point_differential": history.avg_point_differential,
            "advantage": history.advantage,
            "advantage_strength": history.advantage_strength,
            "adjustment": adjustment,
        });

        Some(impact)
    }
}

#[allow(clippy::too_many_arguments)]
fn coaching_insight(
    home_coach: &str,
    away_coach: &str,
    home_team: &str,
    away_team: &str,
    home_record: &str,
    away_record: &str,
    posterior_home_rate: f64,
    num_games: u32,
) -> String {
    let record_info = format!(" ({home_record} vs {away_record})");
    if posterior_home_rate > 0.70 {
        format!(
            "{home_coach} ({home_team}) has a strong historical advantage{record_info} - {:.0}% adjusted win rate in {num_games} games",
            posterior_home_rate * 100.0
        )
    } else if posterior_home_rate > 0.60 {
        format!(
            "{home_coach} ({home_team}) has a moderate advantage{record_info} - {:.0}% adjusted win rate in {num_games} games",
            posterior_home_rate * 100.0
        )
    } else if posterior_home_rate < 0.30 {
        format!(
            "{away_coach} ({away_team}) has a strong historical advantage{record_info} - {:.0}% adjusted win rate in {num_games} games",
            (1.0 - posterior_home_rate) * 100.0
        )
    } else if posterior_home_rate < 0.40 {
        format!(
            "{away_coach} ({away_team}) has a moderate advantage{record_info} - {:.0}% adjusted win rate in {num_games} games",
            (1.0 - posterior_home_rate) * 100.0
        )
    } else {
        format!(
            "Coaching matchup is historically even{record_info} - {:.0}% vs {:.0}% in {num_games} games",
            posterior_home_rate * 100.0,
            (1.0 - posterior_home_rate) * 100.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::matchups::{
        CoachMatchupHistory, MatchupHistory, SimulatedMatchups,
    };
    use crate::data::{Sport, TeamStats};

    fn ctx<'a>(home: &'a str, away: &'a str, stats: &'a TeamStats) -> GameContext<'a> {
        GameContext {
            sport: Sport::Nfl,
            home_team: home,
            away_team: away,
            home_stats: stats,
            away_stats: stats,
            home_strength: 0.5,
            away_strength: 0.5,
            weather: None,
            home_injuries: &[],
            away_injuries: &[],
        }
    }

    /// Matchup source with a scripted coach-vs-coach record.
    struct FixedRecord {
        home_wins: u32,
        away_wins: u32,
        avg_point_differential: f64,
    }

    impl MatchupSource for FixedRecord {
        fn player_vs_team(&self, p: &str, t: &str, pt: &str) -> MatchupHistory {
            SimulatedMatchups::new().player_vs_team(p, t, pt)
        }
        fn player_vs_coach(&self, p: &str, c: &str, pt: &str) -> MatchupHistory {
            SimulatedMatchups::new().player_vs_coach(p, c, pt)
        }
        fn coach_vs_coach(&self, home: &str, away: &str) -> CoachMatchupHistory {
            let num_games = self.home_wins + self.away_wins;
            CoachMatchupHistory {
                home_coach: home.to_string(),
                away_coach: away.to_string(),
                num_games,
                home_wins: self.home_wins,
                away_wins: self.away_wins,
                home_record: format!("{}-{}", self.home_wins, self.away_wins),
                away_record: format!("{}-{}", self.away_wins, self.home_wins),
                home_win_rate: self.home_wins as f64 / num_games as f64,
                away_win_rate: self.away_wins as f64 / num_games as f64,
                avg_point_differential: self.avg_point_differential,
                advantage: "neutral",
                advantage_strength: "none",
                games: Vec::new(),
                streak_holder: None,
                streak_length: 0,
            }
        }
        fn head_coach(&self, team: &str, sport: Sport) -> String {
            SimulatedMatchups::new().head_coach(team, sport)
        }
        fn defensive_coach(&self, team: &str, sport: Sport) -> String {
            SimulatedMatchups::new().defensive_coach(team, sport)
        }
    }

    #[test]
    fn test_unknown_coach_skips() {
        let stats = TeamStats::default();
        let adjuster = CoachingAdjuster::new(
            &ModelConfig::default(),
            Arc::new(SimulatedMatchups::new()),
        );
        assert!(adjuster
            .evaluate(&ctx("Mystery Team", "Kansas City Chiefs", &stats))
            .is_none());
    }

    #[test]
    fn test_deterministic() {
        let stats = TeamStats::default();
        let adjuster = CoachingAdjuster::new(
            &ModelConfig::default(),
            Arc::new(SimulatedMatchups::new()),
        );
        let a = adjuster
            .evaluate(&ctx("Kansas City Chiefs", "Buffalo Bills", &stats))
            .unwrap();
        let b = adjuster
            .evaluate(&ctx("Kansas City Chiefs", "Buffalo Bills", &stats))
            .unwrap();
        assert_eq!(a.adjustment, b.adjustment);
        assert_eq!(a.factors, b.factors);
    }

    #[test]
    fn test_dominant_record_favors_home() {
        let cfg = ModelConfig::default();
        let stats = TeamStats::default();
        // 7-1 with big margins: posterior (2+7)/(4+8) = 0.75 -> strong, x1.2.
        let adjuster = CoachingAdjuster::new(
            &cfg,
            Arc::new(FixedRecord {
                home_wins: 7,
                away_wins: 1,
                avg_point_differential: 10.0,
            }),
        );
        let impact = adjuster
            .evaluate(&ctx("Kansas City Chiefs", "Buffalo Bills", &stats))
            .unwrap();
        assert!(
            (impact.adjustment - 0.06).abs() < 1e-12,
            "strong shift x1.2: {}",
            impact.adjustment
        );
        assert!(impact.adjustment <= cfg.coaching_cap);
    }

    #[test]
    fn test_short_record_shrinks_to_neutral() {
        let stats = TeamStats::default();
        // 2-0 raw is 100%, but posterior (2+2)/(4+2) = 0.667 -> only moderate.
        let adjuster = CoachingAdjuster::new(
            &ModelConfig::default(),
            Arc::new(FixedRecord {
                home_wins: 2,
                away_wins: 0,
                avg_point_differential: 5.0,
            }),
        );
        let impact = adjuster
            .evaluate(&ctx("Kansas City Chiefs", "Buffalo Bills", &stats))
            .unwrap();
        assert!(
            (impact.adjustment - 0.03).abs() < 1e-12,
            "perfect 2-0 must shrink to a moderate edge: {}",
            impact.adjustment
        );
    }

    #[test]
    fn test_close_games_dampen_edge() {
        let stats = TeamStats::default();
        let adjuster = CoachingAdjuster::new(
            &ModelConfig::default(),
            Arc::new(FixedRecord {
                home_wins: 7,
                away_wins: 1,
                avg_point_differential: 2.0,
            }),
        );
        let impact = adjuster
            .evaluate(&ctx("Kansas City Chiefs", "Buffalo Bills", &stats))
            .unwrap();
        assert!(
            (impact.adjustment - 0.04).abs() < 1e-12,
            "strong shift x0.8: {}",
            impact.adjustment
        );
    }
}
