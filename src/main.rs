use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use celpip_coach::ai::LlmClient;
use celpip_coach::config::AppConfig;
use celpip_coach::state::AppState;
use celpip_coach::{db, handlers};

#[tokio::main]
async fn main() {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "celpip_coach=debug,tower_http=debug".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  let config = AppConfig::load();

  let pool = db::init_db(&config.database_path).expect("Failed to initialize database");

  let llm = match LlmClient::from_settings(&config.llm) {
    Ok(Some(client)) => {
      tracing::info!("AI coaching enabled (model {})", client.model());
      Some(client)
    }
    Ok(None) => {
      tracing::info!("OPENAI_API_KEY not set, AI coaching disabled");
      None
    }
    Err(e) => {
      tracing::warn!("Failed to build LLM client, AI coaching disabled: {}", e);
      None
    }
  };
  tracing::info!("Text to speech via {}", config.tts.program);

  let state = AppState::new(pool, llm, config.tts.clone());
  let app = handlers::router(state);

  let bind_addr = config.bind_addr();
  let listener = tokio::net::TcpListener::bind(&bind_addr)
    .await
    .unwrap_or_else(|_| panic!("Failed to bind to {}", bind_addr));

  tracing::info!("Server running on http://localhost:{}", config.server_port);

  axum::serve(listener, app)
    .await
    .expect("Server failed to start");
}
