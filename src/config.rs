use crate::errors::{PredictError, PredictResult};
use std::path::PathBuf;

/// Tunable model constants. Every weight, cap, and shift in the prediction
/// pipeline lives here rather than as a literal at the use site -- the values
/// are empirically chosen placeholders and callers are expected to tune them.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Flat strength bonus added to the home team before normalization.
    pub home_advantage: f64,
    /// Probability bounds applied after every adjustment stage.
    pub prob_floor: f64,
    pub prob_ceiling: f64,
    /// Weather rule shifts (signed, probability scale).
    pub weather_cold_shift: f64,
    pub weather_wind_shift: f64,
    pub weather_precip_shift: f64,
    /// Max swing per unit of injury-impact differential between the teams.
    pub injury_swing: f64,
    /// Cap on a single team's aggregate injury impact.
    pub injury_cap: f64,
    /// Coaching-matchup adjustment tiers and cap.
    pub coaching_moderate_shift: f64,
    pub coaching_strong_shift: f64,
    pub coaching_cap: f64,
    /// Morale signal weights (team-level and key-player-level).
    pub morale_team_weight: f64,
    pub morale_key_player_weight: f64,
    /// Cap on the player-prop aggregate shift.
    pub prop_aggregate_cap: f64,
    /// Assumed std-dev as a fraction of the predicted prop value.
    pub prop_sigma_ratio: f64,
    /// Minimum per-signal probability change to surface as a key factor.
    pub factor_threshold: f64,
    /// Fractional Kelly multiplier and bankroll cap for single bets.
    pub kelly_fraction: f64,
    pub kelly_cap: f64,
    /// Fractional Kelly multiplier for parlays (high variance).
    pub parlay_kelly_fraction: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            home_advantage: 0.03,
            prob_floor: 0.1,
            prob_ceiling: 0.9,
            weather_cold_shift: -0.05,
            weather_wind_shift: -0.08,
            weather_precip_shift: -0.10,
            injury_swing: 0.20,
            injury_cap: 0.5,
            coaching_moderate_shift: 0.03,
            coaching_strong_shift: 0.05,
            coaching_cap: 0.08,
            morale_team_weight: 0.12,
            morale_key_player_weight: 0.15,
            prop_aggregate_cap: 0.08,
            prop_sigma_ratio: 0.15,
            factor_threshold: 0.015,
            kelly_fraction: 0.25,
            kelly_cap: 0.05,
            parlay_kelly_fraction: 0.10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_port: u16,
    pub data_dir: PathBuf,
    /// OpenWeatherMap key; when absent the weather provider serves mock data.
    pub weather_api_key: Option<String>,
    pub weather_base_url: String,
    pub model: ModelConfig,
}

impl AppConfig {
    pub fn from_env() -> PredictResult<Self> {
        dotenvy::dotenv().ok();

        let server_port = env_var_or("SERVER_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| PredictError::Config(format!("SERVER_PORT: {e}")))?;

        let mut model = ModelConfig::default();
        model.home_advantage = env_f64_or("HOME_ADVANTAGE", model.home_advantage)?;
        model.kelly_fraction = env_f64_or("KELLY_FRACTION", model.kelly_fraction)?;
        model.kelly_cap = env_f64_or("KELLY_CAP", model.kelly_cap)?;
        model.injury_swing = env_f64_or("INJURY_SWING", model.injury_swing)?;
        model.prop_sigma_ratio = env_f64_or("PROP_SIGMA_RATIO", model.prop_sigma_ratio)?;

        Ok(Self {
            server_port,
            data_dir: PathBuf::from(env_var_or("DATA_DIR", "data")),
            weather_api_key: std::env::var("WEATHER_API_KEY").ok().filter(|k| !k.is_empty()),
            weather_base_url: env_var_or(
                "WEATHER_BASE_URL",
                "https://api.openweathermap.org/data/2.5",
            ),
            model,
        })
    }
}

fn env_var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_f64_or(key: &str, default: f64) -> PredictResult<f64> {
    match std::env::var(key) {
        Ok(v) => v
            .parse::<f64>()
            .map_err(|e| PredictError::Config(format!("{key}: {e}"))),
        Err(_) => Ok(default),
    }
}
