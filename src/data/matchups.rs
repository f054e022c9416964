use crate::data::seed::seeded_rng;
use crate::data::Sport;
use crate::stats::averages::{robust_average, RobustMethod};
use rand::Rng;
use serde::Serialize;

/// Historical matchup data: player vs team, player vs coach, coach vs coach.
///
/// The simulation below stands in for a real game-log database. Anything that
/// replaces it must honor the same contract: output is a pure function of the
/// input identifiers (see `data::seed`).
pub trait MatchupSource: Send + Sync {
    fn player_vs_team(&self, player: &str, opponent_team: &str, prop_type: &str)
        -> MatchupHistory;
    fn player_vs_coach(&self, player: &str, opponent_coach: &str, prop_type: &str)
        -> MatchupHistory;
    fn coach_vs_coach(&self, home_coach: &str, away_coach: &str) -> CoachMatchupHistory;
    /// Head coach for a team, used for the game-level coaching matchup.
    fn head_coach(&self, team: &str, sport: Sport) -> String;
    /// Defensive coordinator (NFL) or head coach elsewhere, used for props.
    fn defensive_coach(&self, team: &str, sport: Sport) -> String;

    /// How historical matchups move a base prop prediction: team history is
    /// weighted 60%, coach history 40%, applied multiplicatively.
    fn matchup_adjustment(
        &self,
        player: &str,
        opponent_team: &str,
        opponent_coach: &str,
        prop_type: &str,
        base_prediction: f64,
    ) -> MatchupAdjustment {
        let team = self.player_vs_team(player, opponent_team, prop_type);
        let coach = self.player_vs_coach(player, opponent_coach, prop_type);

        let team_adjustment = (team.factor - 1.0) * 0.6;
        let coach_adjustment = (coach.factor - 1.0) * 0.4;
        let total_adjustment = team_adjustment + coach_adjustment;

        let historical_games = team.num_games + coach.num_games;
        // Each prior meeting is worth a small confidence bump, capped.
        let confidence_boost = (historical_games as f64 * 0.02).min(0.15);

        MatchupAdjustment {
            base_prediction,
            adjusted_prediction: base_prediction * (1.0 + total_adjustment),
            team_matchup_factor: team.factor,
            coach_matchup_factor: coach.factor,
            total_adjustment,
            team_history_avg: team.average_value,
            coach_history_avg: coach.average_value,
            team_over_rate: team.over_rate,
            coach_over_rate: coach.over_rate,
            confidence_boost,
            historical_games,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchupGame {
    pub game_date: String,
    pub value: f64,
    pub over_line: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchupHistory {
    pub opponent: String,
    pub prop_type: String,
    pub num_games: u32,
    pub average_value: f64,
    pub over_rate: f64,
    /// How this opponent affects the player relative to baseline (1.0 neutral).
    pub factor: f64,
    pub games: Vec<MatchupGame>,
    pub trend: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct CoachGame {
    pub game_date: String,
    pub home_score: u32,
    pub away_score: u32,
    pub winner: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct CoachMatchupHistory {
    pub home_coach: String,
    pub away_coach: String,
    pub num_games: u32,
    pub home_wins: u32,
    pub away_wins: u32,
    pub home_record: String,
    pub away_record: String,
    pub home_win_rate: f64,
    pub away_win_rate: f64,
    pub avg_point_differential: f64,
    pub advantage: &'static str,
    pub advantage_strength: &'static str,
    pub games: Vec<CoachGame>,
    pub streak_holder: Option<&'static str>,
    pub streak_length: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchupAdjustment {
    pub base_prediction: f64,
    pub adjusted_prediction: f64,
    pub team_matchup_factor: f64,
    pub coach_matchup_factor: f64,
    pub total_adjustment: f64,
    pub team_history_avg: f64,
    pub coach_history_avg: f64,
    pub team_over_rate: f64,
    pub coach_over_rate: f64,
    pub confidence_boost: f64,
    pub historical_games: u32,
}

/// Seeded stand-in for a historical game-log database.
#[derive(Debug, Default)]
pub struct SimulatedMatchups;

impl SimulatedMatchups {
    pub fn new() -> Self {
        Self
    }

    fn simulate_history(
        &self,
        seed_parts: &[&str],
        opponent: &str,
        prop_type: &str,
        game_range: (u32, u32),
        factor_range: (f64, f64),
        wide_jitter: bool,
    ) -> MatchupHistory {
        let mut rng = seeded_rng(seed_parts);

        let num_games = rng.gen_range(game_range.0..=game_range.1);
        let factor = rng.gen_range(factor_range.0..factor_range.1);
        let (base, jitter) = prop_profile(prop_type, wide_jitter);

        let mut games = Vec::with_capacity(num_games as usize);
        for _ in 0..num_games {
            let value = base * factor * rng.gen_range(jitter.0..jitter.1);
            let value = (value * 10.0).round() / 10.0;
            games.push(MatchupGame {
                game_date: format!(
                    "202{}-{:02}-{:02}",
                    rng.gen_range(2..=4),
                    rng.gen_range(9..=12),
                    rng.gen_range(1..=28)
                ),
                value,
                over_line: rng.gen_bool(0.5),
            });
        }

        // Trimmed mean; for these short histories the trim drops nothing and
        // it degrades to the plain mean, but longer real logs get outlier
        // resistance for free.
        let values: Vec<f64> = games.iter().map(|g| g.value).collect();
        let (average_value, _) = robust_average(&values, RobustMethod::Trimmed, 0.1);
        let over_rate = if num_games > 0 {
            games.iter().filter(|g| g.over_line).count() as f64 / num_games as f64
        } else {
            0.5
        };
        let trend = match games.last() {
            Some(last) if games.len() > 1 && last.value > average_value => "improving",
            Some(_) if games.len() > 1 => "declining",
            _ => "stable",
        };

        MatchupHistory {
            opponent: opponent.to_string(),
            prop_type: prop_type.to_string(),
            num_games,
            average_value: (average_value * 10.0).round() / 10.0,
            over_rate: (over_rate * 1000.0).round() / 1000.0,
            factor: (factor * 1000.0).round() / 1000.0,
            games,
            trend,
        }
    }
}

/// (baseline per-game value, per-game jitter range) for a prop type.
/// The wide variant models the larger spread seen against specific schemes.
fn prop_profile(prop_type: &str, wide: bool) -> (f64, (f64, f64)) {
    match prop_type {
        "passing_yards" => (250.0, if wide { (0.70, 1.30) } else { (0.75, 1.25) }),
        "rushing_yards" => (80.0, if wide { (0.65, 1.35) } else { (0.70, 1.30) }),
        "receiving_yards" => (60.0, if wide { (0.60, 1.40) } else { (0.65, 1.35) }),
        _ => (50.0, (0.75, 1.25)),
    }
}

impl MatchupSource for SimulatedMatchups {
    fn player_vs_team(
        &self,
        player: &str,
        opponent_team: &str,
        prop_type: &str,
    ) -> MatchupHistory {
        self.simulate_history(
            &[player, opponent_team, prop_type],
            opponent_team,
            prop_type,
            (3, 5),
            (0.85, 1.15),
            false,
        )
    }

    fn player_vs_coach(
        &self,
        player: &str,
        opponent_coach: &str,
        prop_type: &str,
    ) -> MatchupHistory {
        // Fewer meetings against the same coach, larger scheme-driven spread.
        self.simulate_history(
            &[player, opponent_coach, prop_type],
            opponent_coach,
            prop_type,
            (2, 4),
            (0.80, 1.20),
            true,
        )
    }

    fn coach_vs_coach(&self, home_coach: &str, away_coach: &str) -> CoachMatchupHistory {
        let mut rng = seeded_rng(&[home_coach, away_coach]);

        let num_games = rng.gen_range(2..=8u32);
        let home_factor = rng.gen_range(0.40..0.60);

        let mut home_wins = 0u32;
        let mut away_wins = 0u32;
        let mut games = Vec::with_capacity(num_games as usize);
        let mut diff_sum = 0.0;

        for _ in 0..num_games {
            let winner = if rng.gen::<f64>() < home_factor {
                home_wins += 1;
                "home"
            } else {
                away_wins += 1;
                "away"
            };
            let game = CoachGame {
                game_date: format!(
                    "202{}-{:02}-{:02}",
                    rng.gen_range(0..=4),
                    rng.gen_range(9..=12),
                    rng.gen_range(1..=28)
                ),
                home_score: rng.gen_range(17..=35),
                away_score: rng.gen_range(17..=35),
                winner,
            };
            diff_sum += if winner == "home" {
                game.home_score as f64 - game.away_score as f64
            } else {
                game.away_score as f64 - game.home_score as f64
            };
            games.push(game);
        }

        let home_win_rate = home_wins as f64 / num_games as f64;
        let away_win_rate = away_wins as f64 / num_games as f64;
        let avg_point_differential = diff_sum / num_games as f64;

        let (advantage, advantage_strength) = if home_win_rate > 0.60 {
            ("home_coach", if home_win_rate > 0.70 { "strong" } else { "moderate" })
        } else if away_win_rate > 0.60 {
            ("away_coach", if away_win_rate > 0.70 { "strong" } else { "moderate" })
        } else {
            ("neutral", "none")
        };

        let (streak_holder, streak_length) = match games.last() {
            Some(last) => {
                let holder = last.winner;
                let length = games
                    .iter()
                    .rev()
                    .take_while(|g| g.winner == holder)
                    .count() as u32;
                (Some(holder), length)
            }
            None => (None, 0),
        };

        CoachMatchupHistory {
            home_coach: home_coach.to_string(),
            away_coach: away_coach.to_string(),
            num_games,
            home_wins,
            away_wins,
            home_record: format!("{home_wins}-{away_wins}"),
            away_record: format!("{away_wins}-{home_wins}"),
            home_win_rate: (home_win_rate * 1000.0).round() / 1000.0,
            away_win_rate: (away_win_rate * 1000.0).round() / 1000.0,
            avg_point_differential: (avg_point_differential * 10.0).round() / 10.0,
            advantage,
            advantage_strength,
            games,
            streak_holder,
            streak_length,
        }
    }

    fn head_coach(&self, team: &str, sport: Sport) -> String {
        let table: &[(&str, &str)] = match sport {
            Sport::Nfl => NFL_HEAD_COACHES,
            Sport::Nba => NBA_HEAD_COACHES,
            Sport::Mlb => MLB_MANAGERS,
            Sport::Nhl => NHL_HEAD_COACHES,
        };
        lookup_coach(table, team)
    }

    fn defensive_coach(&self, team: &str, sport: Sport) -> String {
        match sport {
            Sport::Nfl => lookup_coach(NFL_DEFENSIVE_COACHES, team),
            // Other leagues don't have a distinct defensive play-caller worth
            // modeling; fall through to the head coach.
            _ => self.head_coach(team, sport),
        }
    }
}

fn lookup_coach(table: &[(&str, &str)], team: &str) -> String {
    table
        .iter()
        .find(|(t, _)| *t == team)
        .map(|(_, c)| c.to_string())
        .unwrap_or_else(|| "Unknown Coach".to_string())
}

const NFL_HEAD_COACHES: &[(&str, &str)] = &[
    ("Kansas City Chiefs", "Andy Reid"),
    ("Buffalo Bills", "Sean McDermott"),
    ("Philadelphia Eagles", "Nick Sirianni"),
    ("Los Angeles Chargers", "Brandon Staley"),
    ("San Francisco 49ers", "Kyle Shanahan"),
    ("Seattle Seahawks", "Pete Carroll"),
    ("Miami Dolphins", "Mike McDaniel"),
    ("New York Jets", "Robert Saleh"),
    ("Baltimore Ravens", "John Harbaugh"),
    ("Pittsburgh Steelers", "Mike Tomlin"),
    ("Green Bay Packers", "Matt LaFleur"),
    ("Chicago Bears", "Matt Eberflus"),
    ("Detroit Lions", "Dan Campbell"),
    ("Minnesota Vikings", "Kevin O'Connell"),
    ("Cleveland Browns", "Kevin Stefanski"),
    ("Cincinnati Bengals", "Zac Taylor"),
    ("Dallas Cowboys", "Mike McCarthy"),
    ("New England Patriots", "Bill Belichick"),
    ("Tampa Bay Buccaneers", "Todd Bowles"),
    ("Atlanta Falcons", "Arthur Smith"),
    ("Los Angeles Rams", "Sean McVay"),
    ("Arizona Cardinals", "Jonathan Gannon"),
    ("Las Vegas Raiders", "Antonio Pierce"),
    ("Denver Broncos", "Sean Payton"),
    ("Tennessee Titans", "Mike Vrabel"),
    ("Jacksonville Jaguars", "Doug Pederson"),
    ("New Orleans Saints", "Dennis Allen"),
    ("Carolina Panthers", "Frank Reich"),
    ("Indianapolis Colts", "Shane Steichen"),
    ("Houston Texans", "DeMeco Ryans"),
    ("Washington Commanders", "Ron Rivera"),
    ("New York Giants", "Brian Daboll"),
];

const NFL_DEFENSIVE_COACHES: &[(&str, &str)] = &[
    ("Kansas City Chiefs", "Steve Spagnuolo"),
    ("Buffalo Bills", "Leslie Frazier"),
    ("Philadelphia Eagles", "Sean Desai"),
    ("Los Angeles Chargers", "Brandon Staley"),
    ("San Francisco 49ers", "DeMeco Ryans"),
    ("Seattle Seahawks", "Clint Hurtt"),
    ("Miami Dolphins", "Vic Fangio"),
    ("New York Jets", "Robert Saleh"),
    ("Baltimore Ravens", "Mike Macdonald"),
    ("Pittsburgh Steelers", "Teryl Austin"),
    ("Green Bay Packers", "Joe Barry"),
    ("Chicago Bears", "Alan Williams"),
    ("Detroit Lions", "Aaron Glenn"),
    ("Minnesota Vikings", "Ed Donatell"),
    ("Cleveland Browns", "Jim Schwartz"),
    ("Cincinnati Bengals", "Lou Anarumo"),
    ("Dallas Cowboys", "Dan Quinn"),
    ("New England Patriots", "Bill Belichick"),
    ("Tampa Bay Buccaneers", "Todd Bowles"),
    ("Atlanta Falcons", "Dean Pees"),
    ("Los Angeles Rams", "Raheem Morris"),
    ("Arizona Cardinals", "Vance Joseph"),
    ("Las Vegas Raiders", "Patrick Graham"),
    ("Denver Broncos", "Ejiro Evero"),
    ("Tennessee Titans", "Shane Bowen"),
    ("Jacksonville Jaguars", "Mike Caldwell"),
    ("New Orleans Saints", "Pete Werner"),
    ("Carolina Panthers", "Al Holcomb"),
    ("Indianapolis Colts", "Gus Bradley"),
    ("Houston Texans", "Lovie Smith"),
    ("Washington Commanders", "Jack Del Rio"),
    ("New York Giants", "Wink Martindale"),
];

const NBA_HEAD_COACHES: &[(&str, &str)] = &[
    ("Los Angeles Lakers", "Darvin Ham"),
    ("Boston Celtics", "Joe Mazzulla"),
    ("Golden State Warriors", "Steve Kerr"),
    ("Milwaukee Bucks", "Doc Rivers"),
    ("Miami Heat", "Erik Spoelstra"),
    ("New York Knicks", "Tom Thibodeau"),
    ("Denver Nuggets", "Michael Malone"),
    ("Phoenix Suns", "Frank Vogel"),
    ("Dallas Mavericks", "Jason Kidd"),
    ("Chicago Bulls", "Billy Donovan"),
];

const MLB_MANAGERS: &[(&str, &str)] = &[
    ("New York Yankees", "Aaron Boone"),
    ("Boston Red Sox", "Alex Cora"),
    ("Los Angeles Dodgers", "Dave Roberts"),
    ("San Francisco Giants", "Bob Melvin"),
    ("Chicago Cubs", "Craig Counsell"),
    ("St. Louis Cardinals", "Oliver Marmol"),
    ("Houston Astros", "Joe Espada"),
    ("Texas Rangers", "Bruce Bochy"),
    ("Atlanta Braves", "Brian Snitker"),
    ("Philadelphia Phillies", "Rob Thomson"),
];

const NHL_HEAD_COACHES: &[(&str, &str)] = &[
    ("Toronto Maple Leafs", "Sheldon Keefe"),
    ("Boston Bruins", "Jim Montgomery"),
    ("Montreal Canadiens", "Martin St. Louis"),
    ("New York Rangers", "Peter Laviolette"),
    ("Edmonton Oilers", "Kris Knoblauch"),
    ("Vancouver Canucks", "Rick Tocchet"),
    ("Chicago Blackhawks", "Luke Richardson"),
    ("Detroit Red Wings", "Derek Lalonde"),
    ("Pittsburgh Penguins", "Mike Sullivan"),
    ("Washington Capitals", "Spencer Carbery"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_vs_team_deterministic() {
        let source = SimulatedMatchups::new();
        let a = source.player_vs_team("Patrick Mahomes", "Buffalo Bills", "passing_yards");
        let b = source.player_vs_team("Patrick Mahomes", "Buffalo Bills", "passing_yards");
        assert_eq!(a.num_games, b.num_games);
        assert_eq!(a.factor, b.factor);
        assert_eq!(a.average_value, b.average_value);
        assert_eq!(a.over_rate, b.over_rate);
        let values_a: Vec<f64> = a.games.iter().map(|g| g.value).collect();
        let values_b: Vec<f64> = b.games.iter().map(|g| g.value).collect();
        assert_eq!(values_a, values_b, "identical inputs must be bit-identical");
    }

    #[test]
    fn test_history_shape() {
        let source = SimulatedMatchups::new();
        let h = source.player_vs_team("Josh Allen", "Miami Dolphins", "passing_yards");
        assert!((3..=5).contains(&h.num_games));
        assert!((0.85..1.15).contains(&h.factor), "factor out of range: {}", h.factor);
        assert!(h.average_value > 0.0);
        assert!((0.0..=1.0).contains(&h.over_rate));
        let c = source.player_vs_coach("Josh Allen", "Vic Fangio", "passing_yards");
        assert!((2..=4).contains(&c.num_games));
    }

    #[test]
    fn test_coach_matchup_consistent_record() {
        let source = SimulatedMatchups::new();
        let h = source.coach_vs_coach("Andy Reid", "Sean McDermott");
        assert_eq!(h.home_wins + h.away_wins, h.num_games);
        assert!((h.home_win_rate + h.away_win_rate - 1.0).abs() < 1e-9);
        assert_eq!(h.home_record, format!("{}-{}", h.home_wins, h.away_wins));
        assert!(h.streak_length >= 1);
    }

    #[test]
    fn test_matchup_adjustment_blend() {
        let source = SimulatedMatchups::new();
        let adj = source.matchup_adjustment(
            "Travis Kelce",
            "Buffalo Bills",
            "Leslie Frazier",
            "receiving_yards",
            70.0,
        );
        let expected = (adj.team_matchup_factor - 1.0) * 0.6
            + (adj.coach_matchup_factor - 1.0) * 0.4;
        assert!(
            (adj.total_adjustment - expected).abs() < 1e-9,
            "60/40 blend violated: {} vs {expected}",
            adj.total_adjustment
        );
        assert!(
            (adj.adjusted_prediction - 70.0 * (1.0 + adj.total_adjustment)).abs() < 1e-9
        );
        assert!(adj.confidence_boost <= 0.15 + 1e-9);
    }

    #[test]
    fn test_coach_lookup() {
        let source = SimulatedMatchups::new();
        assert_eq!(source.head_coach("Kansas City Chiefs", Sport::Nfl), "Andy Reid");
        assert_eq!(
            source.defensive_coach("Kansas City Chiefs", Sport::Nfl),
            "Steve Spagnuolo"
        );
        assert_eq!(source.head_coach("Boston Celtics", Sport::Nba), "Joe Mazzulla");
        assert_eq!(source.head_coach("Nowhere FC", Sport::Nfl), "Unknown Coach");
        // Non-NFL defensive coach falls back to the head coach.
        assert_eq!(
            source.defensive_coach("Boston Bruins", Sport::Nhl),
            "Jim Montgomery"
        );
    }
}
