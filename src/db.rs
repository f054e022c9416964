use crate::errors::{PredictError, PredictResult};
use crate::state::DbCommand;
use crate::stats::intervals::{confidence_interval, IntervalMethod};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

pub type DbPool = Arc<Mutex<Connection>>;

pub fn init_db(data_dir: &Path) -> PredictResult<DbPool> {
    std::fs::create_dir_all(data_dir)
        .map_err(|e| PredictError::Database(format!("create dir: {e}")))?;
    let db_path = data_dir.join("sharpline.db");
    let conn = Connection::open(&db_path)?;

    conn.execute_batch(
        "PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL; PRAGMA cache_size=-64000;",
    )?;

    let schema = include_str!("../migrations/001_init.sql");
    conn.execute_batch(schema)?;

    tracing::info!("database initialized at {}", db_path.display());
    Ok(Arc::new(Mutex::new(conn)))
}

/// Dedicated DB writer task. Reads commands from the bounded channel and
/// executes SQL; writes never contend with request handlers. Concurrent
/// writers elsewhere would resolve last-write-wins, which is acceptable for
/// an outcome log.
pub async fn run_db_writer(db: DbPool, mut rx: mpsc::Receiver<DbCommand>) {
    tracing::info!("db writer task started");

    while let Some(cmd) = rx.recv().await {
        if let Err(e) = execute_command(&db, cmd) {
            tracing::error!("db write error: {e}");
        }
    }

    tracing::info!("db writer task shutting down");
}

fn execute_command(db: &DbPool, cmd: DbCommand) -> PredictResult<()> {
    let conn = db
        .lock()
        .map_err(|e| PredictError::Database(format!("lock poisoned: {e}")))?;

    match cmd {
        DbCommand::StorePrediction {
            prediction_id,
            game_id,
            sport,
            home_team,
            away_team,
            predicted_winner,
            home_win_probability,
            away_win_probability,
            confidence,
            factors,
            game_date,
            prediction_date,
        } => {
            conn.execute(
                "INSERT INTO predictions (prediction_id, game_id, sport, home_team, away_team, predicted_winner, home_win_probability, away_win_probability, confidence, factors, game_date, prediction_date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                rusqlite::params![
                    prediction_id,
                    game_id,
                    sport,
                    home_team,
                    away_team,
                    predicted_winner,
                    home_win_probability,
                    away_win_probability,
                    confidence,
                    factors,
                    game_date,
                    prediction_date
                ],
            )?;
        }
        DbCommand::RecordOutcome {
            prediction_id,
            actual_winner,
            home_score,
            away_score,
        } => {
            conn.execute(
                "UPDATE predictions
                 SET actual_winner = ?1,
                     home_score = ?2,
                     away_score = ?3,
                     outcome = CASE WHEN predicted_winner = ?1 THEN 'correct' ELSE 'incorrect' END
                 WHERE prediction_id = ?4",
                rusqlite::params![actual_winner, home_score, away_score, prediction_id],
            )?;
        }
    }
    Ok(())
}

// ── Query helpers (server REST reads -- these lock, but only on cold paths) ──

const ROW_COLUMNS: &str = "prediction_id, game_id, sport, home_team, away_team, predicted_winner, home_win_probability, away_win_probability, confidence, factors, game_date, prediction_date, actual_winner, home_score, away_score, outcome";

fn row_from(row: &rusqlite::Row<'_>) -> rusqlite::Result<PredictionRow> {
    Ok(PredictionRow {
        prediction_id: row.get(0)?,
        game_id: row.get(1)?,
        sport: row.get(2)?,
        home_team: row.get(3)?,
        away_team: row.get(4)?,
        predicted_winner: row.get(5)?,
        home_win_probability: row.get(6)?,
        away_win_probability: row.get(7)?,
        confidence: row.get(8)?,
        factors: row.get(9)?,
        game_date: row.get(10)?,
        prediction_date: row.get(11)?,
        actual_winner: row.get(12)?,
        home_score: row.get(13)?,
        away_score: row.get(14)?,
        outcome: row.get(15)?,
    })
}

pub fn get_prediction(db: &DbPool, prediction_id: &str) -> PredictResult<Option<PredictionRow>> {
    let conn = db
        .lock()
        .map_err(|e| PredictError::Database(format!("lock: {e}")))?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {ROW_COLUMNS} FROM predictions WHERE prediction_id = ?1"
    ))?;
    let mut rows = stmt.query_map(rusqlite::params![prediction_id], row_from)?;
    Ok(rows.next().transpose()?)
}

pub fn get_recent_predictions(db: &DbPool, limit: usize) -> PredictResult<Vec<PredictionRow>> {
    let conn = db
        .lock()
        .map_err(|e| PredictError::Database(format!("lock: {e}")))?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {ROW_COLUMNS} FROM predictions ORDER BY prediction_date DESC LIMIT ?1"
    ))?;
    let rows = stmt.query_map(rusqlite::params![limit as i64], row_from)?;
    Ok(rows.filter_map(|r| r.ok()).collect())
}

pub fn get_predictions_by_game(db: &DbPool, game_id: &str) -> PredictResult<Vec<PredictionRow>> {
    let conn = db
        .lock()
        .map_err(|e| PredictError::Database(format!("lock: {e}")))?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {ROW_COLUMNS} FROM predictions WHERE game_id = ?1 ORDER BY prediction_date DESC"
    ))?;
    let rows = stmt.query_map(rusqlite::params![game_id], row_from)?;
    Ok(rows.filter_map(|r| r.ok()).collect())
}

/// Hit-rate over settled predictions, with a bootstrap interval so a handful
/// of lucky calls doesn't read as skill.
pub fn get_accuracy_stats(db: &DbPool, sport: Option<&str>) -> PredictResult<AccuracyStats> {
    let conn = db
        .lock()
        .map_err(|e| PredictError::Database(format!("lock: {e}")))?;

    let (sql, params): (String, Vec<Box<dyn rusqlite::types::ToSql>>) = match sport {
        Some(s) => (
            "SELECT outcome FROM predictions WHERE sport = ?1".into(),
            vec![Box::new(s.to_string())],
        ),
        None => ("SELECT outcome FROM predictions".into(), vec![]),
    };
    let mut stmt = conn.prepare(&sql)?;
    let outcomes: Vec<String> = stmt
        .query_map(rusqlite::params_from_iter(params.iter()), |row| {
            row.get::<_, String>(0)
        })?
        .filter_map(|r| r.ok())
        .collect();

    let correct = outcomes.iter().filter(|o| o.as_str() == "correct").count();
    let incorrect = outcomes.iter().filter(|o| o.as_str() == "incorrect").count();
    let pending = outcomes.iter().filter(|o| o.as_str() == "pending").count();
    let settled = correct + incorrect;

    let accuracy = if settled > 0 {
        correct as f64 / settled as f64
    } else {
        0.0
    };

    let hits: Vec<f64> = outcomes
        .iter()
        .filter(|o| o.as_str() != "pending")
        .map(|o| if o.as_str() == "correct" { 1.0 } else { 0.0 })
        .collect();
    let (_, lower, upper) = confidence_interval(&hits, 0.95, IntervalMethod::Bootstrap);

    Ok(AccuracyStats {
        total: settled,
        correct,
        incorrect,
        pending,
        accuracy,
        accuracy_lower: lower,
        accuracy_upper: upper,
    })
}

// ── Row types ──

#[derive(Debug, Clone, serde::Serialize)]
pub struct PredictionRow {
    pub prediction_id: String,
    pub game_id: String,
    pub sport: String,
    pub home_team: String,
    pub away_team: String,
    pub predicted_winner: String,
    pub home_win_probability: f64,
    pub away_win_probability: f64,
    pub confidence: f64,
    pub factors: String,
    pub game_date: Option<String>,
    pub prediction_date: String,
    pub actual_winner: Option<String>,
    pub home_score: Option<i64>,
    pub away_score: Option<i64>,
    pub outcome: String,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct AccuracyStats {
    pub total: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub pending: usize,
    pub accuracy: f64,
    pub accuracy_lower: f64,
    pub accuracy_upper: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_db() -> DbPool {
        let conn = Connection::open_in_memory().expect("open in-memory db");
        conn.execute_batch(include_str!("../migrations/001_init.sql"))
            .expect("schema");
        Arc::new(Mutex::new(conn))
    }

    fn store(db: &DbPool, id: &str, winner: &str) {
        execute_command(
            db,
            DbCommand::StorePrediction {
                prediction_id: id.to_string(),
                game_id: "nfl_1".to_string(),
                sport: "nfl".to_string(),
                home_team: "Kansas City Chiefs".to_string(),
                away_team: "Buffalo Bills".to_string(),
                predicted_winner: winner.to_string(),
                home_win_probability: 0.61,
                away_win_probability: 0.39,
                confidence: 0.22,
                factors: "{}".to_string(),
                game_date: None,
                prediction_date: format!("2024-10-01T00:00:0{}Z", id.len() % 10),
            },
        )
        .expect("insert");
    }

    #[test]
    fn test_store_and_read_back() {
        let db = memory_db();
        store(&db, "p1", "Kansas City Chiefs");
        let row = get_prediction(&db, "p1").unwrap().expect("row exists");
        assert_eq!(row.game_id, "nfl_1");
        assert_eq!(row.outcome, "pending");
        assert_eq!(row.predicted_winner, "Kansas City Chiefs");
        assert!(get_prediction(&db, "missing").unwrap().is_none());
    }

    #[test]
    fn test_record_outcome_derives_correctness() {
        let db = memory_db();
        store(&db, "p1", "Kansas City Chiefs");
        store(&db, "p2", "Kansas City Chiefs");

        execute_command(
            &db,
            DbCommand::RecordOutcome {
                prediction_id: "p1".to_string(),
                actual_winner: "Kansas City Chiefs".to_string(),
                home_score: Some(27),
                away_score: Some(20),
            },
        )
        .unwrap();
        execute_command(
            &db,
            DbCommand::RecordOutcome {
                prediction_id: "p2".to_string(),
                actual_winner: "Buffalo Bills".to_string(),
                home_score: Some(17),
                away_score: Some(24),
            },
        )
        .unwrap();

        assert_eq!(get_prediction(&db, "p1").unwrap().unwrap().outcome, "correct");
        let p2 = get_prediction(&db, "p2").unwrap().unwrap();
        assert_eq!(p2.outcome, "incorrect");
        assert_eq!(p2.home_score, Some(17));
    }

    #[test]
    fn test_accuracy_stats() {
        let db = memory_db();
        store(&db, "p1", "Kansas City Chiefs");
        store(&db, "p2", "Kansas City Chiefs");
        store(&db, "p3", "Kansas City Chiefs");
        execute_command(
            &db,
            DbCommand::RecordOutcome {
                prediction_id: "p1".to_string(),
                actual_winner: "Kansas City Chiefs".to_string(),
                home_score: None,
                away_score: None,
            },
        )
        .unwrap();
        execute_command(
            &db,
            DbCommand::RecordOutcome {
                prediction_id: "p2".to_string(),
                actual_winner: "Buffalo Bills".to_string(),
                home_score: None,
                away_score: None,
            },
        )
        .unwrap();

        let stats = get_accuracy_stats(&db, Some("nfl")).unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.correct, 1);
        assert_eq!(stats.pending, 1);
        assert!((stats.accuracy - 0.5).abs() < 1e-9);

        let none = get_accuracy_stats(&db, Some("nba")).unwrap();
        assert_eq!(none.total, 0);
        assert_eq!(none.accuracy, 0.0);
    }

    #[test]
    fn test_recent_and_by_game() {
        let db = memory_db();
        store(&db, "p1", "Kansas City Chiefs");
        store(&db, "p2", "Buffalo Bills");
        let recent = get_recent_predictions(&db, 10).unwrap();
        assert_eq!(recent.len(), 2);
        let by_game = get_predictions_by_game(&db, "nfl_1").unwrap();
        assert_eq!(by_game.len(), 2);
        assert!(get_predictions_by_game(&db, "nfl_9").unwrap().is_empty());
    }
}
