use crate::errors::{PredictError, PredictResult};
use serde::Serialize;
use std::collections::HashMap;

/// Expected value per unit stake at decimal odds. Non-positive odds edges
/// (odds <= 1.0) are a guaranteed loss of the stake.
#[inline]
pub fn expected_value(win_probability: f64, odds: f64) -> f64 {
    if odds <= 1.0 {
        return -1.0;
    }
    win_probability * (odds - 1.0) - (1.0 - win_probability)
}

/// Fractional Kelly stake as a fraction of bankroll.
///
/// f* = (b*p - q) / b with b = odds - 1, scaled by `fraction` and clamped to
/// [0, cap]. No edge or odds <= 1 sizes to zero.
#[inline]
pub fn kelly_percentage(win_probability: f64, odds: f64, fraction: f64, cap: f64) -> f64 {
    if odds <= 1.0 {
        return 0.0;
    }
    let b = odds - 1.0;
    let p = win_probability;
    let q = 1.0 - p;
    let kelly = (b * p - q) / b;
    (kelly * fraction).clamp(0.0, cap)
}

#[derive(Debug, Clone, Serialize)]
pub struct BetOpportunity {
    pub bet_type: String,
    pub selection: String,
    pub odds: f64,
    pub implied_probability: f64,
    pub true_probability: f64,
    pub expected_value: f64,
    pub kelly_percentage: f64,
    pub platform: String,
    pub recommendation: &'static str,
}

/// Betting value engine: EV, Kelly sizing, and recommendations on top of a
/// model probability and bookmaker odds. Stateless besides its fractions.
#[derive(Debug, Clone)]
pub struct BettingAnalyzer {
    kelly_fraction: f64,
    kelly_cap: f64,
}

impl BettingAnalyzer {
    pub fn new(kelly_fraction: f64, kelly_cap: f64) -> Self {
        Self {
            kelly_fraction,
            kelly_cap,
        }
    }

    pub fn analyze_bet(
        &self,
        true_probability: f64,
        odds: f64,
        bet_type: &str,
        selection: &str,
        platform: &str,
    ) -> PredictResult<BetOpportunity> {
        if !(0.0..=1.0).contains(&true_probability)
            || true_probability == 0.0
            || true_probability == 1.0
        {
            return Err(PredictError::InvalidInput(format!(
                "probability must be strictly between 0 and 1, got {true_probability}"
            )));
        }

        let implied_probability = if odds > 0.0 { 1.0 / odds } else { 0.0 };
        let ev = expected_value(true_probability, odds);
        let kelly = kelly_percentage(true_probability, odds, self.kelly_fraction, self.kelly_cap);

        let recommendation = if ev > 0.10 && kelly > 0.01 {
            "strong_bet"
        } else if ev > 0.05 && kelly > 0.005 {
            "moderate_bet"
        } else if ev > 0.0 {
            "small_bet"
        } else {
            "avoid"
        };

        Ok(BetOpportunity {
            bet_type: bet_type.to_string(),
            selection: selection.to_string(),
            odds,
            implied_probability,
            true_probability,
            expected_value: ev,
            kelly_percentage: kelly,
            platform: platform.to_string(),
            recommendation,
        })
    }

    /// Analyze the same selection across several platforms' odds.
    pub fn compare_odds(
        &self,
        odds_by_platform: &HashMap<String, f64>,
        true_probability: f64,
        bet_type: &str,
        selection: &str,
    ) -> PredictResult<HashMap<String, BetOpportunity>> {
        let mut opportunities = HashMap::new();
        for (platform, odds) in odds_by_platform {
            opportunities.insert(
                platform.clone(),
                self.analyze_bet(true_probability, *odds, bet_type, selection, platform)?,
            );
        }
        Ok(opportunities)
    }

    /// Highest-EV opportunity among strictly positive-EV candidates.
    pub fn find_best_bet<'a>(
        &self,
        opportunities: &'a HashMap<String, BetOpportunity>,
    ) -> Option<&'a BetOpportunity> {
        opportunities
            .values()
            .filter(|o| o.expected_value > 0.0)
            .max_by(|a, b| a.expected_value.total_cmp(&b.expected_value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> BettingAnalyzer {
        BettingAnalyzer::new(0.25, 0.05)
    }

    #[test]
    fn test_fair_coin_fair_odds_zero_ev() {
        assert_eq!(expected_value(0.5, 2.0), 0.0, "fair game has exactly zero edge");
    }

    #[test]
    fn test_quarter_kelly_hits_cap() {
        // b=1, full Kelly = (0.6 - 0.4)/1 = 0.2, quarter = 0.05, capped at 0.05.
        let kelly = kelly_percentage(0.6, 2.0, 0.25, 0.05);
        assert!((kelly - 0.05).abs() < 1e-12, "expected exactly the 5% cap: {kelly}");
    }

    #[test]
    fn test_kelly_zero_without_edge() {
        assert_eq!(kelly_percentage(0.4, 2.0, 0.25, 0.05), 0.0);
        assert_eq!(kelly_percentage(0.9, 1.0, 0.25, 0.05), 0.0, "odds <= 1 never sized");
        assert_eq!(expected_value(0.9, 1.0), -1.0);
    }

    #[test]
    fn test_analyze_bet_tiers() {
        let a = analyzer();
        let strong = a.analyze_bet(0.65, 2.2, "team_win", "Chiefs", "bet365").unwrap();
        assert_eq!(strong.recommendation, "strong_bet");
        assert!(strong.expected_value > 0.10);

        let avoid = a.analyze_bet(0.40, 1.6, "team_win", "Chiefs", "bet365").unwrap();
        assert_eq!(avoid.recommendation, "avoid");
        assert!(avoid.expected_value < 0.0);
    }

    #[test]
    fn test_analyze_bet_rejects_degenerate_probability() {
        let a = analyzer();
        assert!(a.analyze_bet(0.0, 2.0, "t", "s", "p").is_err());
        assert!(a.analyze_bet(1.0, 2.0, "t", "s", "p").is_err());
        assert!(a.analyze_bet(1.4, 2.0, "t", "s", "p").is_err());
    }

    #[test]
    fn test_implied_probability() {
        let a = analyzer();
        let bet = a.analyze_bet(0.55, 2.0, "t", "s", "p").unwrap();
        assert!((bet.implied_probability - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_find_best_bet_requires_positive_ev() {
        let a = analyzer();
        let mut odds = HashMap::new();
        odds.insert("bet365".to_string(), 1.5);
        odds.insert("draftkings".to_string(), 1.6);
        // p=0.5: both EVs negative, nothing qualifies.
        let opportunities = a.compare_odds(&odds, 0.5, "team_win", "Chiefs").unwrap();
        assert!(a.find_best_bet(&opportunities).is_none());

        // p=0.75: both positive; the better odds win.
        let opportunities = a.compare_odds(&odds, 0.75, "team_win", "Chiefs").unwrap();
        let best = a.find_best_bet(&opportunities).expect("positive EV exists");
        assert_eq!(best.platform, "draftkings");
    }
}
