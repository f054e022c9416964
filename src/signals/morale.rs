use crate::config::ModelConfig;
use crate::data::seed::seeded_rng;
use crate::data::Sport;
use crate::signals::{GameContext, SignalAdjuster, SignalImpact};
use crate::stats::averages::time_weighted_average;
use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::Rng;
use serde::Serialize;

/// Team chemistry and player psychology signal.
///
/// Synthesizes a team-level score (chemistry, morale, pressure handling) and
/// per-key-player psychological scores (confidence, stress, focus,
/// motivation), then weighs both into a win-probability shift. The underlying
/// personal data is simulated, seeded per player and team.
pub struct MoraleAdjuster {
    team_weight: f64,
    key_player_weight: f64,
}

/// Half-life for weighting a player's recent game scores.
const TREND_HALF_LIFE_DAYS: f64 = 14.0;

#[derive(Debug, Clone, Serialize)]
pub struct PlayerMorale {
    pub player_name: String,
    pub position: String,
    pub overall_score: f64,
    pub confidence: f64,
    pub stress: f64,
    pub focus: f64,
    pub motivation: f64,
    pub factors: Vec<String>,
    pub trend: &'static str,
    /// Performance impact in [-0.15, 0.15].
    pub impact: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamMorale {
    pub team: String,
    pub overall_score: f64,
    pub chemistry: f64,
    pub morale: f64,
    pub pressure_handling: f64,
    pub players: Vec<PlayerMorale>,
    pub factors: Vec<String>,
    /// Win-probability contribution of this team's mental state.
    pub impact: f64,
}

impl MoraleAdjuster {
    pub fn new(cfg: &ModelConfig) -> Self {
        Self {
            team_weight: cfg.morale_team_weight,
            key_player_weight: cfg.morale_key_player_weight,
        }
    }

    fn analyze_player(&self, team: &str, name: &str, position: &str) -> PlayerMorale {
        let mut rng = seeded_rng(&["morale", team, name]);

        let mut confidence: f64 = 0.7;
        let mut stress: f64 = 0.3;
        let mut focus: f64 = 0.75;
        let mut motivation: f64 = 0.8;
        let mut factors = Vec::new();

        // Recent form vs. season baseline, recency-weighted.
        let scores: Vec<f64> = (0..3).map(|_| rng.gen_range(0.4..0.9)).collect();
        let season_avg = rng.gen_range(0.5..0.8);
        let now = Utc::now();
        let dates = vec![
            now - Duration::days(14),
            now - Duration::days(7),
            now,
        ];
        let (recent_avg, _) =
            time_weighted_average(&scores, &dates, TREND_HALF_LIFE_DAYS, Some(now));

        let trend = if recent_avg > season_avg * 1.1 {
            confidence += 0.15;
            stress -= 0.1;
            factors.push("Strong recent performance boost".to_string());
            "improving"
        } else if recent_avg < season_avg * 0.9 {
            confidence -= 0.2;
            stress += 0.15;
            factors.push("Recent performance decline".to_string());
            "declining"
        } else {
            "stable"
        };

        match *pick(&mut rng, &["stable", "negotiating", "expiring_soon", "recently_signed"]) {
            "negotiating" => {
                stress += 0.1;
                focus -= 0.05;
                factors.push("Contract negotiations ongoing".to_string());
            }
            "expiring_soon" => {
                motivation += 0.1;
                factors.push("Contract year motivation".to_string());
            }
            "recently_signed" => {
                confidence += 0.1;
                stress -= 0.05;
                factors.push("Recently signed contract".to_string());
            }
            _ => {}
        }

        if rng.gen_bool(0.3) {
            match *pick(&mut rng, &["family_issue", "positive_life_event", "media_scrutiny"]) {
                "family_issue" => {
                    focus -= 0.15;
                    stress += 0.2;
                    factors.push("Family matters affecting focus".to_string());
                }
                "positive_life_event" => {
                    motivation += 0.1;
                    confidence += 0.05;
                    factors.push("Positive personal developments".to_string());
                }
                _ => {
                    stress += 0.15;
                    focus -= 0.1;
                    factors.push("Increased media attention".to_string());
                }
            }
        }

        let experience_years = rng.gen_range(1..=15);
        if experience_years > 10 {
            factors.push("Veteran experience".to_string());
        } else if experience_years < 3 {
            factors.push("Young player, less experience".to_string());
        }

        if matches!(position, "QB" | "PG" | "P") {
            stress += 0.1;
            factors.push("High-pressure position".to_string());
        }

        let confidence = confidence.clamp(0.0, 1.0);
        let stress = stress.clamp(0.0, 1.0);
        let focus = focus.clamp(0.0, 1.0);
        let motivation = motivation.clamp(0.0, 1.0);

        let overall =
            confidence * 0.3 + (1.0 - stress) * 0.25 + focus * 0.25 + motivation * 0.2;
        if factors.is_empty() {
            factors.push("No significant factors identified".to_string());
        }

        PlayerMorale {
            player_name: name.to_string(),
            position: position.to_string(),
            overall_score: round3(overall),
            confidence: round3(confidence),
            stress: round3(stress),
            focus: round3(focus),
            motivation: round3(motivation),
            factors,
            trend,
            impact: round3((overall - 0.5) * 0.3),
        }
    }

    pub fn analyze_team(&self, team: &str, sport: Sport, recent_form: f64) -> TeamMorale {
        let mut rng = seeded_rng(&["team_morale", team, sport.as_str()]);

        let mut chemistry: f64 = 0.75;
        let mut morale: f64 = 0.70;
        let mut pressure_handling: f64 = 0.65;
        let mut factors = Vec::new();

        // Streaks read off recent form.
        if recent_form >= 0.75 {
            let streak = (3 + ((recent_form - 0.75) * 20.0) as u32).min(5);
            morale += 0.15;
            chemistry += 0.1;
            factors.push(format!("{streak}-game winning streak"));
        } else if recent_form <= 0.35 {
            morale -= 0.2;
            factors.push("3-game losing streak".to_string());
        }

        if rng.gen_bool(0.15) {
            if rng.gen::<f64>() > 0.7 {
                pressure_handling -= 0.15;
                factors.push("High playoff pressure".to_string());
            } else {
                factors.push("Playoff game motivation".to_string());
            }
        }

        match *pick(&mut rng, &["stable", "stable", "stable", "unstable", "new_coach"]) {
            "unstable" => {
                chemistry -= 0.1;
                morale -= 0.1;
                factors.push("Coaching instability".to_string());
            }
            "new_coach" => {
                chemistry -= 0.05;
                factors.push("New coaching staff".to_string());
            }
            _ => {}
        }

        if rng.gen::<f64>() > 0.6 {
            factors.push("High media scrutiny".to_string());
        }

        // Key players, seeded alongside the team factors.
        let count = rng.gen_range(3..=5);
        let positions = key_positions(sport);
        let players: Vec<PlayerMorale> = (0..count)
            .map(|i| {
                let name = format!("{team} Player {}", i + 1);
                let position = pick(&mut rng, positions).to_string();
                self.analyze_player(team, &name, &position)
            })
            .collect();
        let avg_player_impact = if players.is_empty() {
            0.0
        } else {
            players.iter().map(|p| p.impact).sum::<f64>() / players.len() as f64
        };

        let chemistry = chemistry.clamp(0.0, 1.0);
        let morale = morale.clamp(0.0, 1.0);
        let pressure_handling = pressure_handling.clamp(0.0, 1.0);

        let overall = (chemistry * 0.3
            + morale * 0.3
            + pressure_handling * 0.2
            + (1.0 + avg_player_impact) * 0.2)
            .clamp(0.0, 1.0);

        let impact =
            (overall - 0.5) * self.team_weight + avg_player_impact * self.key_player_weight;

        if factors.is_empty() {
            factors.push("No significant team factors".to_string());
        }

        TeamMorale {
            team: team.to_string(),
            overall_score: round3(overall),
            chemistry: round3(chemistry),
            morale: round3(morale),
            pressure_handling: round3(pressure_handling),
            players,
            factors,
            impact: round3(impact),
        }
    }
}

impl SignalAdjuster for MoraleAdjuster {
    fn name(&self) -> &'static str {
        "morale"
    }

    fn evaluate(&self, ctx: &GameContext<'_>) -> Option<SignalImpact> {
        let home = self.analyze_team(ctx.home_team, ctx.sport, ctx.home_stats.recent_form);
        let away = self.analyze_team(ctx.away_team, ctx.sport, ctx.away_stats.recent_form);

        let adjustment = home.impact - away.impact;
        let mut impact = SignalImpact::new("morale", adjustment);

        if adjustment > 0.01 {
            impact
                .factors
                .push(format!("{} holds the mental edge", ctx.home_team));
        } else if adjustment < -0.01 {
            impact
                .factors
                .push(format!("{} holds the mental edge", ctx.away_team));
        }
        for factor in home.factors.iter().chain(away.factors.iter()) {
            if factor.contains("streak") || factor.contains("instability") {
                impact.factors.push(factor.clone());
            }
        }

        impact.detail = serde_json::json!({
            "home": {
                "team": home.team,
                "overall_score": home.overall_score,
                "chemistry": home.chemistry,
                "morale": home.morale,
                "pressure_handling": home.pressure_handling,
                "factors": home.factors,
                "impact": home.impact,
            },
            "away": {
                "team": away.team,
                "overall_score": away.overall_score,
                "chemistry": away.chemistry,
                "morale": away.morale,
                "pressure_handling": away.pressure_handling,
                "factors": away.factors,
                "impact": away.impact,
            },
            "adjustment": adjustment,
        });

        Some(impact)
    }
}

fn key_positions(sport: Sport) -> &'static [&'static str] {
    match sport {
        Sport::Nfl => &["QB", "RB", "WR", "TE", "DE", "LB", "CB"],
        Sport::Nba => &["PG", "SG", "SF", "PF", "C"],
        Sport::Mlb => &["P", "C", "1B", "2B", "SS", "3B", "OF"],
        Sport::Nhl => &["C", "LW", "RW", "D", "G"],
    }
}

fn pick<'a>(rng: &mut StdRng, options: &'a [&'a str]) -> &'a &'a str {
    &options[rng.gen_range(0..options.len())]
}

#[inline]
fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::TeamStats;

    fn stats(recent_form: f64) -> TeamStats {
        TeamStats {
            recent_form,
            ..TeamStats::default()
        }
    }

    #[test]
    fn test_player_scores_in_range() {
        let adjuster = MoraleAdjuster::new(&ModelConfig::default());
        let p = adjuster.analyze_player("Kansas City Chiefs", "Kansas City Chiefs Player 1", "QB");
        for v in [p.overall_score, p.confidence, p.stress, p.focus, p.motivation] {
            assert!((0.0..=1.0).contains(&v), "score out of range: {v}");
        }
        assert!(p.impact.abs() <= 0.15 + 1e-9, "impact bounded: {}", p.impact);
        assert!(!p.factors.is_empty());
    }

    #[test]
    fn test_team_analysis_deterministic() {
        let adjuster = MoraleAdjuster::new(&ModelConfig::default());
        let a = adjuster.analyze_team("Buffalo Bills", Sport::Nfl, 0.6);
        let b = adjuster.analyze_team("Buffalo Bills", Sport::Nfl, 0.6);
        assert_eq!(a.overall_score, b.overall_score);
        assert_eq!(a.impact, b.impact);
        assert_eq!(a.factors, b.factors);
        assert_eq!(a.players.len(), b.players.len());
    }

    #[test]
    fn test_winning_streak_lifts_team_score() {
        let adjuster = MoraleAdjuster::new(&ModelConfig::default());
        let hot = adjuster.analyze_team("Detroit Lions", Sport::Nfl, 0.9);
        let cold = adjuster.analyze_team("Detroit Lions", Sport::Nfl, 0.2);
        assert!(
            hot.overall_score > cold.overall_score,
            "hot {} should beat cold {}",
            hot.overall_score,
            cold.overall_score
        );
        assert!(hot.factors.iter().any(|f| f.contains("winning streak")));
        assert!(cold.factors.iter().any(|f| f.contains("losing streak")));
    }

    #[test]
    fn test_impact_bounded_by_weights() {
        let cfg = ModelConfig::default();
        let adjuster = MoraleAdjuster::new(&cfg);
        let team = adjuster.analyze_team("Miami Dolphins", Sport::Nfl, 0.5);
        let bound = 0.5 * cfg.morale_team_weight + 0.15 * cfg.morale_key_player_weight;
        assert!(
            team.impact.abs() <= bound + 1e-9,
            "impact {} exceeds weight bound {bound}",
            team.impact
        );
    }

    #[test]
    fn test_evaluate_emits_symmetric_adjustment() {
        let adjuster = MoraleAdjuster::new(&ModelConfig::default());
        let home_stats = stats(0.6);
        let away_stats = stats(0.6);
        let ctx = GameContext {
            sport: Sport::Nfl,
            home_team: "Kansas City Chiefs",
            away_team: "Buffalo Bills",
            home_stats: &home_stats,
            away_stats: &away_stats,
            home_strength: 0.5,
            away_strength: 0.5,
            weather: None,
            home_injuries: &[],
            away_injuries: &[],
        };
        let forward = adjuster.evaluate(&ctx).unwrap();
        let ctx_swapped = GameContext {
            home_team: "Buffalo Bills",
            away_team: "Kansas City Chiefs",
            ..ctx
        };
        let backward = adjuster.evaluate(&ctx_swapped).unwrap();
        assert!(
            (forward.adjustment + backward.adjustment).abs() < 1e-9,
            "swapping sides must negate the adjustment: {} vs {}",
            forward.adjustment,
            backward.adjustment
        );
    }
}
