mod app;
mod config;
mod db;
mod error;
mod images;
mod nutrition;
mod state;
mod storage;


use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        "nutrition_assistant=debug,axum=info,tower_http=info,sqlx=warn".to_string()
    });
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = AppState::init().await?;
    tracing::info!(
        label_container = %app_state.config.label_storage.container,
        food_container = %app_state.config.food_storage.container,
        "clients ready"
    );

    let app = app::build_app(app_state);
    app::serve(app).await
}
