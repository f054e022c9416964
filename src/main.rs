mod betting;
mod config;
mod data;
mod db;
mod errors;
mod predict;
mod server;
mod signals;
mod state;
mod stats;

use crate::state::{AppState, DbCommand};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() {
    // Structured logging (line-buffered, stderr)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("sharpline prediction service starting");

    // Load config
    let cfg = match config::AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("config error: {e}");
            std::process::exit(1);
        }
    };

    // Init database
    let db_pool = match db::init_db(&cfg.data_dir) {
        Ok(d) => d,
        Err(e) => {
            tracing::error!("database init error: {e}");
            std::process::exit(1);
        }
    };

    // Bounded channel into the dedicated DB writer
    let (db_tx, db_rx) = mpsc::channel::<DbCommand>(1024);

    let port = cfg.server_port;
    let app_state = AppState::new(cfg, db_pool.clone(), db_tx);

    // DB writer task (owns all writes)
    tokio::spawn(async move {
        db::run_db_writer(db_pool, db_rx).await;
    });

    let app = axum::Router::new()
        .route("/api/games", axum::routing::get(server::routes::get_games))
        .route(
            "/api/predictions/game/{game_id}",
            axum::routing::get(server::routes::get_game_prediction),
        )
        .route(
            "/api/predictions/game",
            axum::routing::post(server::routes::post_game_prediction),
        )
        .route(
            "/api/predictions/player/{player_name}",
            axum::routing::get(server::routes::get_player_prop),
        )
        .route(
            "/api/predictions/coaching",
            axum::routing::get(server::routes::get_coaching_matchup),
        )
        .route(
            "/api/predictions/history",
            axum::routing::get(server::routes::get_history),
        )
        .route(
            "/api/predictions/{prediction_id}",
            axum::routing::get(server::routes::get_stored_prediction),
        )
        .route(
            "/api/predictions/{prediction_id}/outcome",
            axum::routing::post(server::routes::post_outcome),
        )
        .route(
            "/api/bets/analyze",
            axum::routing::post(server::routes::post_analyze_bet),
        )
        .route(
            "/api/bets/compare",
            axum::routing::post(server::routes::post_compare_bets),
        )
        .route(
            "/api/parlays/calculate",
            axum::routing::post(server::routes::post_parlay),
        )
        .route(
            "/api/accuracy",
            axum::routing::get(server::routes::get_accuracy),
        )
        .route(
            "/api/counters",
            axum::routing::get(server::routes::get_counters),
        )
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .with_state(app_state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!("server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("bind error: {e}");
            std::process::exit(1);
        });

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("server error: {e}");
    }
}
