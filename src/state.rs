use crate::betting::value::BettingAnalyzer;
use crate::config::AppConfig;
use crate::data::injuries::InjuryProvider;
use crate::data::matchups::{MatchupSource, SimulatedMatchups};
use crate::data::odds::OddsProvider;
use crate::data::provider::SportsDataProvider;
use crate::data::weather::WeatherProvider;
use crate::db::DbPool;
use crate::predict::game::GamePredictor;
use crate::predict::player::PropPredictor;
use portable_atomic::AtomicU64;
use std::sync::Arc;
use tokio::sync::mpsc;

// ── DB Commands (sent to the writer task via bounded channel) ──

#[derive(Debug)]
pub enum DbCommand {
    StorePrediction {
        prediction_id: String,
        game_id: String,
        sport: String,
        home_team: String,
        away_team: String,
        predicted_winner: String,
        home_win_probability: f64,
        away_win_probability: f64,
        confidence: f64,
        factors: String,
        game_date: Option<String>,
        prediction_date: String,
    },
    RecordOutcome {
        prediction_id: String,
        actual_winner: String,
        home_score: Option<i64>,
        away_score: Option<i64>,
    },
}

// ── Performance Counters (lock-free) ──

pub struct PerfCounters {
    pub games_predicted: AtomicU64,
    pub props_predicted: AtomicU64,
    pub bets_analyzed: AtomicU64,
    pub parlays_calculated: AtomicU64,
    pub predictions_stored: AtomicU64,
    pub outcomes_recorded: AtomicU64,
}

impl PerfCounters {
    pub fn new() -> Self {
        Self {
            games_predicted: AtomicU64::new(0),
            props_predicted: AtomicU64::new(0),
            bets_analyzed: AtomicU64::new(0),
            parlays_calculated: AtomicU64::new(0),
            predictions_stored: AtomicU64::new(0),
            outcomes_recorded: AtomicU64::new(0),
        }
    }
}

// ── Application shared state ──

/// Built once at startup. Providers and predictors are immutable; the only
/// mutable pieces are the DB (behind the writer channel) and the counters.
pub struct AppState {
    pub config: AppConfig,
    pub db: DbPool,
    pub db_tx: mpsc::Sender<DbCommand>,
    pub counters: PerfCounters,

    pub sports: SportsDataProvider,
    pub injuries: InjuryProvider,
    pub weather: WeatherProvider,
    pub odds: OddsProvider,
    pub matchups: Arc<dyn MatchupSource>,

    pub game_predictor: GamePredictor,
    pub prop_predictor: PropPredictor,
    pub betting: BettingAnalyzer,
}

impl AppState {
    pub fn new(config: AppConfig, db: DbPool, db_tx: mpsc::Sender<DbCommand>) -> Arc<Self> {
        let matchups: Arc<dyn MatchupSource> = Arc::new(SimulatedMatchups::new());
        let game_predictor = GamePredictor::new(config.model.clone(), matchups.clone());
        let prop_predictor = PropPredictor::new(&config.model, matchups.clone());
        let betting = BettingAnalyzer::new(config.model.kelly_fraction, config.model.kelly_cap);
        let weather = WeatherProvider::new(
            config.weather_api_key.clone(),
            config.weather_base_url.clone(),
        );

        Arc::new(Self {
            config,
            db,
            db_tx,
            counters: PerfCounters::new(),
            sports: SportsDataProvider::new(),
            injuries: InjuryProvider::new(),
            weather,
            odds: OddsProvider::new(),
            matchups,
            game_predictor,
            prop_predictor,
            betting,
        })
    }
}
