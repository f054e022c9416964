pub mod injuries;
pub mod matchups;
pub mod odds;
pub mod provider;
pub mod seed;
pub mod weather;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ── Sport ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sport {
    Nfl,
    Nba,
    Mlb,
    Nhl,
}

impl Sport {
    /// Weather only matters for sports played outside.
    #[inline]
    pub fn is_outdoor(&self) -> bool {
        matches!(self, Sport::Nfl | Sport::Mlb)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sport::Nfl => "nfl",
            Sport::Nba => "nba",
            Sport::Mlb => "mlb",
            Sport::Nhl => "nhl",
        }
    }

    pub fn parse(s: &str) -> Option<Sport> {
        match s.to_ascii_lowercase().as_str() {
            "nfl" => Some(Sport::Nfl),
            "nba" => Some(Sport::Nba),
            "mlb" => Some(Sport::Mlb),
            "nhl" => Some(Sport::Nhl),
            _ => None,
        }
    }
}

impl std::fmt::Display for Sport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Team / player records ──

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TeamRecord {
    pub wins: u32,
    pub losses: u32,
}

/// Team statistics record. Loose upstream payloads deserialize with defaults
/// so the signal adjusters always see a complete, validated shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamStats {
    #[serde(default)]
    pub team_name: String,
    #[serde(default = "default_half")]
    pub win_rate: f64,
    #[serde(default)]
    pub points_per_game: f64,
    #[serde(default)]
    pub points_allowed_per_game: f64,
    #[serde(default = "default_half")]
    pub recent_form: f64,
    #[serde(default)]
    pub home_record: Option<TeamRecord>,
    #[serde(default)]
    pub away_record: Option<TeamRecord>,
    /// Defensive rating against a prop type, 0..1 where higher is a stronger
    /// defense. Missing entries read as the neutral 0.5.
    #[serde(default)]
    pub defense_ratings: HashMap<String, f64>,
}

impl TeamStats {
    #[inline]
    pub fn defense_vs(&self, prop_type: &str) -> f64 {
        self.defense_ratings.get(prop_type).copied().unwrap_or(0.5)
    }
}

impl Default for TeamStats {
    fn default() -> Self {
        Self {
            team_name: String::new(),
            win_rate: 0.5,
            points_per_game: 0.0,
            points_allowed_per_game: 0.0,
            recent_form: 0.5,
            home_record: None,
            away_record: None,
            defense_ratings: HashMap::new(),
        }
    }
}

fn default_half() -> f64 {
    0.5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerStats {
    pub player_name: String,
    #[serde(default)]
    pub position: String,
    #[serde(default = "default_consistency")]
    pub consistency: f64,
    #[serde(default)]
    pub recent_trend: f64,
    /// Season per-game averages keyed by prop type, e.g. "passing_yards".
    #[serde(default)]
    pub averages: HashMap<String, f64>,
}

impl PlayerStats {
    #[inline]
    pub fn prop_average(&self, prop_type: &str) -> Option<f64> {
        self.averages.get(prop_type).copied()
    }
}

fn default_consistency() -> f64 {
    0.7
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyPlayer {
    pub name: String,
    pub position: String,
}

// ── Weather ──

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Weather {
    #[serde(default = "default_temp")]
    pub temp: f64,
    #[serde(default)]
    pub wind_speed: f64,
    #[serde(default)]
    pub precipitation: f64,
    #[serde(default = "default_conditions")]
    pub conditions: String,
    #[serde(default)]
    pub humidity: f64,
    #[serde(default)]
    pub location: String,
}

fn default_temp() -> f64 {
    70.0
}

fn default_conditions() -> String {
    "clear".to_string()
}

// ── Injuries ──

/// Injury kinds with their baseline performance impact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InjuryType {
    AnkleSprain,
    KneeInjury,
    Hamstring,
    Groin,
    Foot,
    Achilles,
    Shoulder,
    Elbow,
    Wrist,
    Hand,
    Rib,
    Concussion,
    Neck,
    Illness,
    General,
}

impl InjuryType {
    pub fn severity(&self) -> f64 {
        match self {
            InjuryType::AnkleSprain => 0.15,
            InjuryType::KneeInjury => 0.35,
            InjuryType::Hamstring => 0.25,
            InjuryType::Groin => 0.20,
            InjuryType::Foot => 0.30,
            InjuryType::Achilles => 0.40,
            InjuryType::Shoulder => 0.25,
            InjuryType::Elbow => 0.20,
            InjuryType::Wrist => 0.15,
            InjuryType::Hand => 0.10,
            InjuryType::Rib => 0.30,
            InjuryType::Concussion => 0.35,
            InjuryType::Neck => 0.30,
            InjuryType::Illness => 0.20,
            InjuryType::General => 0.15,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            InjuryType::AnkleSprain => "Lower body mobility",
            InjuryType::KneeInjury => "Lower body mobility, speed",
            InjuryType::Hamstring => "Speed, acceleration",
            InjuryType::Groin => "Lateral movement",
            InjuryType::Foot => "Balance, cutting",
            InjuryType::Achilles => "Explosiveness, speed",
            InjuryType::Shoulder => "Throwing, blocking",
            InjuryType::Elbow => "Throwing accuracy",
            InjuryType::Wrist => "Catching, ball handling",
            InjuryType::Hand => "Catching, ball security",
            InjuryType::Rib => "Breathing, contact tolerance",
            InjuryType::Concussion => "Decision making, reaction time",
            InjuryType::Neck => "Head movement, vision",
            InjuryType::Illness => "Endurance, energy",
            InjuryType::General => "Overall performance",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InjuryStatus {
    Out,
    Doubtful,
    Questionable,
    Probable,
    Active,
}

impl InjuryStatus {
    #[inline]
    pub fn impact_multiplier(&self) -> f64 {
        match self {
            InjuryStatus::Out => 1.0,
            InjuryStatus::Doubtful => 0.75,
            InjuryStatus::Questionable => 0.50,
            InjuryStatus::Probable => 0.25,
            InjuryStatus::Active => 0.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InjuryStatus::Out => "out",
            InjuryStatus::Doubtful => "doubtful",
            InjuryStatus::Questionable => "questionable",
            InjuryStatus::Probable => "probable",
            InjuryStatus::Active => "active",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerInjury {
    pub player_name: String,
    pub position: String,
    pub injury_type: InjuryType,
    pub status: InjuryStatus,
    #[serde(default)]
    pub date_injured: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default)]
    pub previous_occurrences: u32,
    /// Fractional performance drop observed in past occurrences, 0 if unknown.
    #[serde(default)]
    pub historical_performance_impact: f64,
}

// ── Schedule ──

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameLocation {
    pub city: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameInfo {
    pub game_id: String,
    pub sport: Sport,
    pub home_team: String,
    pub away_team: String,
    pub date: chrono::DateTime<chrono::Utc>,
    #[serde(default)]
    pub location: Option<GameLocation>,
}
