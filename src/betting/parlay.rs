use crate::errors::{PredictError, PredictResult};
use serde::{Deserialize, Serialize};

/// One leg of a parlay. Legs are treated as independent; no correlation is
/// assumed between them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParlayLeg {
    pub player_name: String,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub prop_type: Option<String>,
    #[serde(default)]
    pub prop_value: Option<f64>,
    #[serde(default)]
    pub selection: Option<String>,
    pub odds: f64,
    pub win_probability: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParlayRiskMetrics {
    pub win_rate: f64,
    pub loss_rate: f64,
    pub risk_reward_ratio: f64,
    /// Full Kelly fraction, as a percentage of bankroll.
    pub kelly_percentage: f64,
    /// Fractional Kelly bet size, percentage of bankroll, capped at 5.
    pub recommended_bet_percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParlayResult {
    pub parlay_odds: f64,
    pub combined_probability: f64,
    pub bet_amount: f64,
    pub potential_payout: f64,
    pub total_return: f64,
    pub expected_value: f64,
    pub ev_percentage: f64,
    pub risk_metrics: ParlayRiskMetrics,
    pub recommendation: &'static str,
    pub recommendation_text: &'static str,
    pub legs: Vec<ParlayLeg>,
}

/// Combine independent legs into a parlay: probabilities and odds multiply,
/// in exactly the order and with exactly the values supplied.
///
/// Rejects (never silently corrects): fewer than two legs, a non-positive
/// stake, any probability outside the open interval, any odds at or below
/// even money.
pub fn calculate_parlay(
    legs: &[ParlayLeg],
    stake: f64,
    kelly_fraction: f64,
) -> PredictResult<ParlayResult> {
    if legs.len() < 2 {
        return Err(PredictError::InvalidInput(
            "parlay must have at least 2 legs".to_string(),
        ));
    }
    if stake <= 0.0 {
        return Err(PredictError::InvalidInput(
            "bet amount must be positive".to_string(),
        ));
    }

    let mut combined_probability = 1.0;
    let mut parlay_odds = 1.0;
    for leg in legs {
        if leg.win_probability <= 0.0 || leg.win_probability >= 1.0 {
            return Err(PredictError::InvalidInput(format!(
                "invalid win probability for {}: {}",
                leg.player_name, leg.win_probability
            )));
        }
        if leg.odds <= 1.0 {
            return Err(PredictError::InvalidInput(format!(
                "invalid odds for {}: {}",
                leg.player_name, leg.odds
            )));
        }
        combined_probability *= leg.win_probability;
        parlay_odds *= leg.odds;
    }

    let potential_payout = stake * (parlay_odds - 1.0);
    let total_return = stake * parlay_odds;
    let expected_value =
        combined_probability * potential_payout - (1.0 - combined_probability) * stake;
    let ev_percentage = expected_value / stake * 100.0;

    // Parlays get a deep fractional Kelly; variance compounds per leg.
    let b = parlay_odds - 1.0;
    let kelly = ((combined_probability * b - (1.0 - combined_probability)) / b).max(0.0);
    let fractional_kelly = kelly * kelly_fraction;
    let recommended_bet_percentage = (fractional_kelly * 100.0).min(5.0);

    let (recommendation, recommendation_text) = if ev_percentage > 15.0 {
        ("strong_parlay", "Strong Parlay - High Expected Value")
    } else if ev_percentage > 5.0 {
        ("moderate_parlay", "Moderate Parlay - Positive Expected Value")
    } else if ev_percentage > 0.0 {
        ("small_parlay", "Small Parlay - Slight Positive Edge")
    } else {
        ("avoid_parlay", "Avoid - Negative Expected Value")
    };

    Ok(ParlayResult {
        parlay_odds: round2(parlay_odds),
        combined_probability: round4(combined_probability),
        bet_amount: stake,
        potential_payout: round2(potential_payout),
        total_return: round2(total_return),
        expected_value: round2(expected_value),
        ev_percentage: round2(ev_percentage),
        risk_metrics: ParlayRiskMetrics {
            win_rate: round4(combined_probability),
            loss_rate: round4(1.0 - combined_probability),
            risk_reward_ratio: round2(potential_payout / stake),
            kelly_percentage: round2(kelly * 100.0),
            recommended_bet_percentage: round2(recommended_bet_percentage),
        },
        recommendation,
        recommendation_text,
        legs: legs.to_vec(),
    })
}

#[inline]
fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[inline]
fn round4(v: f64) -> f64 {
    (v * 10000.0).round() / 10000.0
}
