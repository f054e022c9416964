use crate::betting::parlay::{calculate_parlay, ParlayLeg};
use crate::data::odds::OddsProvider;
use crate::data::{GameInfo, PlayerInjury, Sport, TeamStats, Weather};
use crate::db;
use crate::errors::{PredictError, PredictResult};
use crate::predict::game::PredictionInput;
use crate::predict::player::PropQuery;
use crate::signals::props::PropSignal;
use crate::state::{AppState, DbCommand};
use axum::extract::{Path, Query, State};
use axum::response::Json;
use portable_atomic::Ordering::Relaxed;
use std::collections::HashMap;
use std::sync::Arc;

// ── Request shapes ──

#[derive(serde::Deserialize)]
pub struct GamesQuery {
    pub sport: Option<String>,
    pub days_ahead: Option<u32>,
}

#[derive(serde::Deserialize)]
pub struct PredictGameBody {
    pub game_id: Option<String>,
    pub sport: String,
    pub home_team: String,
    pub away_team: String,
    pub home_stats: Option<TeamStats>,
    pub away_stats: Option<TeamStats>,
    pub weather: Option<Weather>,
    pub home_injuries: Option<Vec<PlayerInjury>>,
    pub away_injuries: Option<Vec<PlayerInjury>>,
}

#[derive(serde::Deserialize)]
pub struct PropParams {
    pub prop_type: String,
    pub sport: Option<String>,
    pub line: Option<f64>,
    pub opponent_team: Option<String>,
    pub game_id: Option<String>,
}

#[derive(serde::Deserialize)]
pub struct CoachingParams {
    pub home_team: String,
    pub away_team: String,
    pub sport: Option<String>,
}

#[derive(serde::Deserialize)]
pub struct AnalyzeBetBody {
    pub true_probability: f64,
    pub odds: f64,
    pub bet_type: String,
    pub selection: String,
    pub platform: String,
}

#[derive(serde::Deserialize)]
pub struct CompareBetsBody {
    pub true_probability: f64,
    pub odds: HashMap<String, f64>,
    pub bet_type: String,
    pub selection: String,
}

#[derive(serde::Deserialize)]
pub struct ParlayBody {
    pub legs: Vec<ParlayLeg>,
    pub bet_amount: f64,
}

#[derive(serde::Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
    pub game_id: Option<String>,
}

#[derive(serde::Deserialize)]
pub struct OutcomeBody {
    pub actual_winner: String,
    pub home_score: Option<i64>,
    pub away_score: Option<i64>,
}

#[derive(serde::Deserialize)]
pub struct AccuracyQuery {
    pub sport: Option<String>,
}

fn parse_sport(s: &str) -> PredictResult<Sport> {
    Sport::parse(s).ok_or_else(|| PredictError::InvalidInput(format!("unknown sport: {s}")))
}

// ── Schedule ──

/// GET /api/games -- upcoming schedule (mock provider)
pub async fn get_games(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GamesQuery>,
) -> Result<Json<serde_json::Value>, PredictError> {
    let sport = parse_sport(params.sport.as_deref().unwrap_or("nfl"))?;
    let games = state
        .sports
        .get_upcoming_games(sport, params.days_ahead.unwrap_or(7));
    Ok(Json(serde_json::json!({ "sport": sport, "games": games })))
}

// ── Game predictions ──

/// GET /api/predictions/game/{game_id} -- full pipeline over mock providers
pub async fn get_game_prediction(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
) -> Result<Json<serde_json::Value>, PredictError> {
    let game = state
        .sports
        .get_game_details(&game_id)
        .ok_or_else(|| PredictError::NotFound(format!("game {game_id}")))?;

    let home_stats = state.sports.get_team_stats(&game.home_team, game.sport);
    let away_stats = state.sports.get_team_stats(&game.away_team, game.sport);

    let weather = match (&game.location, game.sport.is_outdoor()) {
        (Some(location), true) => Some(
            state
                .weather
                .get_weather_for_game(&location.city, location.state.as_deref())
                .await,
        ),
        _ => None,
    };

    let home_injuries = state.injuries.get_team_injuries(&game.home_team, game.sport);
    let away_injuries = state.injuries.get_team_injuries(&game.away_team, game.sport);

    let mut prediction = state.game_predictor.predict_game(
        &game.game_id,
        &PredictionInput {
            sport: game.sport,
            home_team: &game.home_team,
            away_team: &game.away_team,
            home_stats: &home_stats,
            away_stats: &away_stats,
            weather: weather.as_ref(),
            home_injuries: &home_injuries,
            away_injuries: &away_injuries,
        },
    );

    // Fold in per-player prop signals for both rosters.
    let (home_props, home_signals) =
        team_props(&state, &game, &game.home_team, &game.away_team, &away_stats, &home_injuries);
    let (away_props, away_signals) =
        team_props(&state, &game, &game.away_team, &game.home_team, &home_stats, &away_injuries);
    state
        .game_predictor
        .apply_prop_signal(&mut prediction, &home_signals, &away_signals);

    // Value check: the model probability against each book's home price.
    let game_odds = state
        .odds
        .get_game_odds(&game.home_team, &game.away_team, game.sport);
    let home_prices: HashMap<String, f64> = game_odds
        .iter()
        .map(|(platform, odds)| (platform.clone(), odds.home_team_odds))
        .collect();
    let opportunities = state.betting.compare_odds(
        &home_prices,
        prediction.home_win_probability,
        "team_win",
        &game.home_team,
    )?;
    let best_bet = state.betting.find_best_bet(&opportunities).cloned();
    let best_home_price = OddsProvider::find_best_odds(&game_odds, true).cloned();

    state.counters.games_predicted.fetch_add(1, Relaxed);

    let prediction_id = store_prediction(&state, &prediction, Some(&game)).await;

    Ok(Json(serde_json::json!({
        "prediction_id": prediction_id,
        "prediction": prediction,
        "home_team_props": home_props,
        "away_team_props": away_props,
        "odds": game_odds,
        "best_home_price": best_home_price,
        "betting": {
            "opportunities": opportunities,
            "best_bet": best_bet,
        },
    })))
}

/// POST /api/predictions/game -- predict from an explicit payload; any stats
/// not supplied fall back to the mock provider.
pub async fn post_game_prediction(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PredictGameBody>,
) -> Result<Json<serde_json::Value>, PredictError> {
    let sport = parse_sport(&body.sport)?;
    if body.home_team.is_empty() || body.away_team.is_empty() {
        return Err(PredictError::InvalidInput(
            "home_team and away_team are required".to_string(),
        ));
    }

    let home_stats = body
        .home_stats
        .unwrap_or_else(|| state.sports.get_team_stats(&body.home_team, sport));
    let away_stats = body
        .away_stats
        .unwrap_or_else(|| state.sports.get_team_stats(&body.away_team, sport));
    let home_injuries = body.home_injuries.unwrap_or_default();
    let away_injuries = body.away_injuries.unwrap_or_default();
    let game_id = body
        .game_id
        .unwrap_or_else(|| format!("{}_custom", sport.as_str()));

    let prediction = state.game_predictor.predict_game(
        &game_id,
        &PredictionInput {
            sport,
            home_team: &body.home_team,
            away_team: &body.away_team,
            home_stats: &home_stats,
            away_stats: &away_stats,
            weather: body.weather.as_ref(),
            home_injuries: &home_injuries,
            away_injuries: &away_injuries,
        },
    );

    state.counters.games_predicted.fetch_add(1, Relaxed);
    let prediction_id = store_prediction(&state, &prediction, None).await;

    Ok(Json(serde_json::json!({
        "prediction_id": prediction_id,
        "prediction": prediction,
    })))
}

// ── Player props ──

/// GET /api/predictions/player/{player_name}
pub async fn get_player_prop(
    State(state): State<Arc<AppState>>,
    Path(player_name): Path<String>,
    Query(params): Query<PropParams>,
) -> Result<Json<serde_json::Value>, PredictError> {
    let mut sport = parse_sport(params.sport.as_deref().unwrap_or("nfl"))?;

    // An explicit opponent wins; otherwise infer one from the game.
    let mut opponent_team = params.opponent_team.clone();
    if let Some(game_id) = &params.game_id {
        if let Some(game) = state.sports.get_game_details(game_id) {
            sport = game.sport;
            if opponent_team.is_none() {
                opponent_team = Some(game.away_team);
            }
        }
    }

    let player_stats = state.sports.get_player_stats(&player_name, sport);
    let opponent_stats = opponent_team
        .as_deref()
        .map(|team| state.sports.get_team_stats(team, sport))
        .unwrap_or_default();
    let opponent_coach = opponent_team
        .as_deref()
        .map(|team| state.matchups.defensive_coach(team, sport))
        .filter(|coach| coach != "Unknown Coach");

    let historical_avg = player_stats
        .prop_average(&params.prop_type)
        .unwrap_or_else(|| default_line(&params.prop_type));

    let prediction = state.prop_predictor.predict_prop(&PropQuery {
        player_name: &player_name,
        prop_type: &params.prop_type,
        player_stats: &player_stats,
        opponent_stats: &opponent_stats,
        historical_avg,
        line: params.line,
        opponent_team: opponent_team.as_deref(),
        opponent_coach: opponent_coach.as_deref(),
        injury: None,
    });

    let odds = state
        .odds
        .get_player_prop_odds(&player_name, &params.prop_type, sport);

    state.counters.props_predicted.fetch_add(1, Relaxed);

    Ok(Json(serde_json::json!({
        "prediction": prediction,
        "odds": odds,
    })))
}

/// GET /api/predictions/coaching
pub async fn get_coaching_matchup(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CoachingParams>,
) -> Result<Json<serde_json::Value>, PredictError> {
    let sport = parse_sport(params.sport.as_deref().unwrap_or("nfl"))?;

    let home_coach = state.matchups.head_coach(&params.home_team, sport);
    let away_coach = state.matchups.head_coach(&params.away_team, sport);
    if home_coach == "Unknown Coach" || away_coach == "Unknown Coach" {
        return Err(PredictError::NotFound(format!(
            "no coaching data for {} vs {}",
            params.home_team, params.away_team
        )));
    }

    let history = state.matchups.coach_vs_coach(&home_coach, &away_coach);

    Ok(Json(serde_json::json!({
        "home_team": params.home_team,
        "away_team": params.away_team,
        "sport": sport,
        "home_coach": home_coach,
        "away_coach": away_coach,
        "historical_record": history,
    })))
}

// ── Betting ──

/// POST /api/bets/analyze
pub async fn post_analyze_bet(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AnalyzeBetBody>,
) -> Result<Json<serde_json::Value>, PredictError> {
    let opportunity = state.betting.analyze_bet(
        body.true_probability,
        body.odds,
        &body.bet_type,
        &body.selection,
        &body.platform,
    )?;
    state.counters.bets_analyzed.fetch_add(1, Relaxed);
    Ok(Json(serde_json::json!({ "opportunity": opportunity })))
}

/// POST /api/bets/compare
pub async fn post_compare_bets(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CompareBetsBody>,
) -> Result<Json<serde_json::Value>, PredictError> {
    let opportunities = state.betting.compare_odds(
        &body.odds,
        body.true_probability,
        &body.bet_type,
        &body.selection,
    )?;
    let best = state.betting.find_best_bet(&opportunities);
    state
        .counters
        .bets_analyzed
        .fetch_add(opportunities.len() as u64, Relaxed);
    Ok(Json(serde_json::json!({
        "opportunities": opportunities,
        "best_bet": best,
    })))
}

/// POST /api/parlays/calculate
pub async fn post_parlay(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ParlayBody>,
) -> Result<Json<serde_json::Value>, PredictError> {
    let result = calculate_parlay(
        &body.legs,
        body.bet_amount,
        state.config.model.parlay_kelly_fraction,
    )?;
    state.counters.parlays_calculated.fetch_add(1, Relaxed);
    Ok(Json(serde_json::json!(result)))
}

// ── Stored predictions ──

/// GET /api/predictions/history
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<serde_json::Value>, PredictError> {
    let limit = params.limit.unwrap_or(50).min(200);
    let predictions = match params.game_id.as_deref() {
        Some(game_id) => db::get_predictions_by_game(&state.db, game_id)?,
        None => db::get_recent_predictions(&state.db, limit)?,
    };
    Ok(Json(serde_json::json!({ "predictions": predictions })))
}

/// GET /api/predictions/{prediction_id}
pub async fn get_stored_prediction(
    State(state): State<Arc<AppState>>,
    Path(prediction_id): Path<String>,
) -> Result<Json<serde_json::Value>, PredictError> {
    let row = db::get_prediction(&state.db, &prediction_id)?
        .ok_or_else(|| PredictError::NotFound(format!("prediction {prediction_id}")))?;
    Ok(Json(serde_json::json!({ "prediction": row })))
}

/// POST /api/predictions/{prediction_id}/outcome
pub async fn post_outcome(
    State(state): State<Arc<AppState>>,
    Path(prediction_id): Path<String>,
    Json(body): Json<OutcomeBody>,
) -> Result<Json<serde_json::Value>, PredictError> {
    let row = db::get_prediction(&state.db, &prediction_id)?
        .ok_or_else(|| PredictError::NotFound(format!("prediction {prediction_id}")))?;

    if body.actual_winner.is_empty() {
        return Err(PredictError::InvalidInput(
            "actual_winner is required".to_string(),
        ));
    }

    let outcome = if row.predicted_winner == body.actual_winner {
        "correct"
    } else {
        "incorrect"
    };

    let _ = state
        .db_tx
        .send(DbCommand::RecordOutcome {
            prediction_id: prediction_id.clone(),
            actual_winner: body.actual_winner.clone(),
            home_score: body.home_score,
            away_score: body.away_score,
        })
        .await;

    state.counters.outcomes_recorded.fetch_add(1, Relaxed);

    Ok(Json(serde_json::json!({
        "prediction_id": prediction_id,
        "predicted_winner": row.predicted_winner,
        "actual_winner": body.actual_winner,
        "outcome": outcome,
    })))
}

/// GET /api/accuracy
pub async fn get_accuracy(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AccuracyQuery>,
) -> Result<Json<serde_json::Value>, PredictError> {
    let stats = db::get_accuracy_stats(&state.db, params.sport.as_deref())?;
    Ok(Json(serde_json::json!(stats)))
}

/// GET /api/counters -- lock-free reads
pub async fn get_counters(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "games_predicted": state.counters.games_predicted.load(Relaxed),
        "props_predicted": state.counters.props_predicted.load(Relaxed),
        "bets_analyzed": state.counters.bets_analyzed.load(Relaxed),
        "parlays_calculated": state.counters.parlays_calculated.load(Relaxed),
        "predictions_stored": state.counters.predictions_stored.load(Relaxed),
        "outcomes_recorded": state.counters.outcomes_recorded.load(Relaxed),
    }))
}

// ── Helpers ──

async fn store_prediction(
    state: &Arc<AppState>,
    prediction: &crate::predict::GamePrediction,
    game: Option<&GameInfo>,
) -> String {
    let prediction_id = uuid::Uuid::new_v4().to_string();
    let command = DbCommand::StorePrediction {
        prediction_id: prediction_id.clone(),
        game_id: prediction.game_id.clone(),
        sport: prediction.sport.to_string(),
        home_team: prediction.home_team.clone(),
        away_team: prediction.away_team.clone(),
        predicted_winner: prediction.predicted_winner.clone(),
        home_win_probability: prediction.home_win_probability,
        away_win_probability: prediction.away_win_probability,
        confidence: prediction.confidence,
        factors: prediction.factors_json().to_string(),
        game_date: game.map(|g| g.date.to_rfc3339()),
        prediction_date: chrono::Utc::now().to_rfc3339(),
    };
    let _ = state.db_tx.send(command).await;
    state.counters.predictions_stored.fetch_add(1, Relaxed);
    prediction_id
}

/// Generate prop predictions for a team's key players against the opposing
/// roster, returning both the response payload and the aggregate signals.
fn team_props(
    state: &Arc<AppState>,
    game: &GameInfo,
    team: &str,
    opponent_team: &str,
    opponent_stats: &TeamStats,
    team_injuries: &[PlayerInjury],
) -> (Vec<serde_json::Value>, Vec<PropSignal>) {
    let opponent_coach = state.matchups.defensive_coach(opponent_team, game.sport);
    let opponent_coach = (opponent_coach != "Unknown Coach").then_some(opponent_coach);

    let mut props = Vec::new();
    let mut signals = Vec::new();

    for player in state.sports.get_team_players(team, game.sport).iter().take(5) {
        let player_stats = state.sports.get_player_stats(&player.name, game.sport);
        let injury = team_injuries
            .iter()
            .find(|i| i.player_name == player.name);

        for prop_type in position_props(game.sport, &player.position) {
            let line = player_stats
                .prop_average(prop_type)
                .unwrap_or_else(|| default_line(prop_type));

            let prediction = state.prop_predictor.predict_prop(&PropQuery {
                player_name: &player.name,
                prop_type,
                player_stats: &player_stats,
                opponent_stats,
                historical_avg: line,
                line: Some(line),
                opponent_team: Some(opponent_team),
                opponent_coach: opponent_coach.as_deref(),
                injury,
            });

            signals.push(PropSignal {
                player_name: player.name.clone(),
                position: player.position.clone(),
                total_adjustment: prediction
                    .historical_matchup
                    .as_ref()
                    .map(|m| m.total_adjustment)
                    .unwrap_or(0.0),
                over_probability: prediction.over_probability,
            });

            let odds = state
                .odds
                .get_player_prop_odds(&player.name, prop_type, game.sport);
            props.push(serde_json::json!({
                "player_name": player.name,
                "position": player.position,
                "prop_type": prop_type,
                "line": line,
                "prediction": prediction,
                "odds": odds,
            }));
        }
    }

    (props, signals)
}

/// Which props are quoted per position. Positions outside a sport's offensive
/// core carry no props.
fn position_props(sport: Sport, position: &str) -> &'static [&'static str] {
    match sport {
        Sport::Nfl => match position {
            "QB" => &["passing_yards", "passing_touchdowns"],
            "RB" => &["rushing_yards", "rushing_touchdowns"],
            "WR" | "TE" => &["receiving_yards", "receptions"],
            _ => &[],
        },
        Sport::Nba => match position {
            "PG" | "SG" | "SF" => &["points", "assists"],
            "PF" | "C" => &["points", "rebounds"],
            _ => &[],
        },
        Sport::Mlb => match position {
            "P" => &["strikeouts"],
            _ => &["hits", "home_runs"],
        },
        Sport::Nhl => match position {
            "G" => &["saves"],
            _ => &["points", "shots"],
        },
    }
}

/// Typical league-wide per-game baselines, used when a stat line lacks the
/// prop in question.
fn default_line(prop_type: &str) -> f64 {
    match prop_type {
        "passing_yards" => 250.0,
        "rushing_yards" => 80.0,
        "receiving_yards" => 60.0,
        "passing_touchdowns" => 2.0,
        "rushing_touchdowns" => 0.8,
        "receptions" => 5.0,
        "points" => 20.0,
        "assists" => 5.0,
        "rebounds" => 7.0,
        "strikeouts" => 7.0,
        "hits" => 1.2,
        "home_runs" => 0.3,
        "saves" => 28.0,
        "shots" => 3.5,
        _ => 50.0,
    }
}
