use crate::config::ModelConfig;
use crate::signals::{GameContext, SignalAdjuster, SignalImpact};

/// Weather signal. Applies only to outdoor sports; harsh conditions push the
/// game toward the under-dog-friendly ground game, modeled as a shift against
/// the home side's passing-driven edge.
///
/// The three rules stack additively into one raw adjustment (temperature,
/// wind, precipitation); the predictor then applies the sum in log-odds space
/// like every other signal.
pub struct WeatherAdjuster {
    cold_shift: f64,
    wind_shift: f64,
    precip_shift: f64,
}

impl WeatherAdjuster {
    pub fn new(cfg: &ModelConfig) -> Self {
        Self {
            cold_shift: cfg.weather_cold_shift,
            wind_shift: cfg.weather_wind_shift,
            precip_shift: cfg.weather_precip_shift,
        }
    }
}

impl SignalAdjuster for WeatherAdjuster {
    fn name(&self) -> &'static str {
        "weather"
    }

    fn evaluate(&self, ctx: &GameContext<'_>) -> Option<SignalImpact> {
        if !ctx.sport.is_outdoor() {
            return None;
        }
        let weather = ctx.weather?;

        let mut adjustment = 0.0;
        if weather.temp < 32.0 {
            adjustment += self.cold_shift;
        }
        if weather.wind_speed > 20.0 {
            adjustment += self.wind_shift;
        }
        if weather.precipitation > 0.0 {
            adjustment += self.precip_shift;
        }

        let mut impact = SignalImpact::new("weather", adjustment);
        let mut severity = "low";

        if weather.wind_speed > 25.0 {
            impact
                .factors
                .push("Very high wind - major impact on passing".to_string());
            severity = "high";
        } else if weather.wind_speed > 15.0 {
            impact
                .factors
                .push("High wind - moderate impact on passing".to_string());
            severity = "moderate";
        }

        if weather.precipitation > 0.5 {
            impact
                .factors
                .push("Heavy precipitation - favors ground game".to_string());
            severity = "high";
        } else if weather.precipitation > 0.0 {
            impact
                .factors
                .push("Light precipitation - slight impact".to_string());
            if severity == "low" {
                severity = "moderate";
            }
        }

        if weather.temp < 32.0 {
            impact
                .factors
                .push("Freezing temperatures - ball handling issues".to_string());
            if severity == "low" {
                severity = "moderate";
            }
        } else if weather.temp > 90.0 {
            impact
                .factors
                .push("Extreme heat - player fatigue factor".to_string());
            if severity == "low" {
                severity = "moderate";
            }
        }

        impact.detail = serde_json::json!({
            "temperature": weather.temp,
            "wind_speed": weather.wind_speed,
            "precipitation": weather.precipitation,
            "conditions": weather.conditions,
            "severity": severity,
            "adjustment": adjustment,
        });

        Some(impact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Sport, TeamStats, Weather};

    fn ctx<'a>(
        sport: Sport,
        weather: Option<&'a Weather>,
        stats: &'a TeamStats,
    ) -> GameContext<'a> {
        GameContext {
            sport,
            home_team: "Home",
            away_team: "Away",
            home_stats: stats,
            away_stats: stats,
            home_strength: 0.5,
            away_strength: 0.5,
            weather,
            home_injuries: &[],
            away_injuries: &[],
        }
    }

    fn harsh() -> Weather {
        Weather {
            temp: 70.0,
            wind_speed: 25.0,
            precipitation: 1.0,
            conditions: "rain".to_string(),
            humidity: 80.0,
            location: String::new(),
        }
    }

    #[test]
    fn test_indoor_sport_not_applicable() {
        let stats = TeamStats::default();
        let weather = harsh();
        let adjuster = WeatherAdjuster::new(&ModelConfig::default());
        assert!(adjuster.evaluate(&ctx(Sport::Nba, Some(&weather), &stats)).is_none());
    }

    #[test]
    fn test_missing_weather_skips() {
        let stats = TeamStats::default();
        let adjuster = WeatherAdjuster::new(&ModelConfig::default());
        assert!(adjuster.evaluate(&ctx(Sport::Nfl, None, &stats)).is_none());
    }

    #[test]
    fn test_wind_and_rain_stack() {
        let stats = TeamStats::default();
        let weather = harsh();
        let adjuster = WeatherAdjuster::new(&ModelConfig::default());
        let impact = adjuster
            .evaluate(&ctx(Sport::Nfl, Some(&weather), &stats))
            .expect("outdoor with weather applies");
        assert!(
            (impact.adjustment - (-0.18)).abs() < 1e-12,
            "wind -0.08 and precip -0.10 stack: {}",
            impact.adjustment
        );
        assert!(!impact.factors.is_empty());
    }

    #[test]
    fn test_freezing_adds_shift() {
        let stats = TeamStats::default();
        let weather = Weather {
            temp: 20.0,
            wind_speed: 5.0,
            precipitation: 0.0,
            conditions: "clear".to_string(),
            humidity: 40.0,
            location: String::new(),
        };
        let adjuster = WeatherAdjuster::new(&ModelConfig::default());
        let impact = adjuster
            .evaluate(&ctx(Sport::Nfl, Some(&weather), &stats))
            .unwrap();
        assert!((impact.adjustment - (-0.05)).abs() < 1e-12);
    }

    #[test]
    fn test_clear_weather_neutral() {
        let stats = TeamStats::default();
        let weather = Weather {
            temp: 72.0,
            wind_speed: 8.0,
            precipitation: 0.0,
            conditions: "clear".to_string(),
            humidity: 65.0,
            location: String::new(),
        };
        let adjuster = WeatherAdjuster::new(&ModelConfig::default());
        let impact = adjuster
            .evaluate(&ctx(Sport::Nfl, Some(&weather), &stats))
            .unwrap();
        assert_eq!(impact.adjustment, 0.0);
        assert!(impact.factors.is_empty());
    }
}
