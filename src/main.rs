use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cramless::api::router;
use cramless::clock::SystemClock;
use cramless::config::Config;
use cramless::db;
use cramless::quiz::{NoopQuizGenerator, QuizConfig, QuizGenerator, QuizHttpClient};
use cramless::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "cramless=debug,tower_http=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::new_from_env()?;

    let pool = db::connect(&config.database_url).await?;

    let quiz: Arc<dyn QuizGenerator> = match &config.quiz_service_url {
        Some(base_url) => {
            info!("quiz service at {}", base_url);
            Arc::new(QuizHttpClient::new(QuizConfig { base_url: base_url.clone() })?)
        }
        None => {
            warn!("QUIZ_SERVICE_URL is not set, quiz generation disabled");
            Arc::new(NoopQuizGenerator)
        }
    };

    let state = AppState {
        db: pool,
        clock: Arc::new(SystemClock),
        quiz,
    };

    let app = router(state);

    info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
