use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use course_backend::api::router;
use course_backend::config::AppConfig;
use course_backend::llm::groq::GroqClient;
use course_backend::llm::{EchoModel, ModelClient};
use course_backend::services::{AgentService, AgentSettings, KeywordRetriever};
use course_backend::state::AppState;
use course_backend::store::open_store;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "course_backend=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::new_from_env()?;

    info!("using store: {}", config.store.describe());
    let store = open_store(&config.store).await?;

    let model: Arc<dyn ModelClient> = if config.llm.api_key.is_some() {
        info!("using Groq model {}", config.llm.model);
        Arc::new(GroqClient::new(&config.llm)?)
    } else {
        warn!("GROQ_API_KEY is not set, answering with the echo model");
        Arc::new(EchoModel)
    };

    let retriever = Arc::new(KeywordRetriever::new(store, config.retrieval_limit));
    let agent = AgentService::new(
        retriever,
        model,
        AgentSettings {
            model: config.llm.model.clone(),
            temperature: config.llm.temperature,
        },
    );

    let state = AppState {
        agent: Arc::new(agent),
    };

    let app = router(state);

    info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
