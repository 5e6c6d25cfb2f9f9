use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

use emmaus::{config, modules, AppState};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("emmaus=info,tower_http=info")),
        )
        .init();

    let db = config::database::connect().await;
    let llm = config::llm::LlmConfig::from_env();

    if !llm.credential.is_configured() {
        tracing::warn!(
            "OPENAI_API_KEY is not configured; journeys will use fallback content"
        );
    }

    let state = AppState { db, llm };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .merge(modules::journey::routes::routes())
        .merge(modules::reflection::routes::routes())
        .layer(cors)
        .with_state(state);

    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let addr = format!("0.0.0.0:{}", port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind address");

    tracing::info!("listening on {}", addr);

    axum::serve(listener, app).await.expect("Server error");
}
