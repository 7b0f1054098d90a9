// src/main.rs

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use chameleon::api::create_router;
use chameleon::config::CONFIG;
use chameleon::llm::OpenAIClient;
use chameleon::server::{create_pool, run_migrations};
use chameleon::state::create_app_state;

#[derive(Parser)]
#[command(name = "chameleon")]
#[command(about = "Research-study chat service with rotating personas")]
struct Args {
    /// HTTP server port (overrides CHAMELEON_PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Database path (sqlite URL)
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    // RUST_LOG wins over the configured log level.
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&CONFIG.log_level)),
        )
        .init();

    let args = Args::parse();
    let port = args.port.unwrap_or(CONFIG.port);
    let database_url = args
        .database_url
        .unwrap_or_else(|| CONFIG.database_url.clone());

    info!("Starting Chameleon {}", env!("CARGO_PKG_VERSION"));
    info!("Database: {}", database_url);

    let pool = create_pool(&database_url, CONFIG.sqlite_max_connections).await?;
    run_migrations(&pool).await?;

    if CONFIG.openai_api_key.is_empty() {
        warn!("OPENAI_API_KEY is not set; chat completions will fail");
    }
    let client = Arc::new(OpenAIClient::new(
        CONFIG.openai_api_key.clone(),
        CONFIG.openai_base_url.clone(),
        CONFIG.openai_request_timeout(),
    )?);

    let app_state = Arc::new(create_app_state(pool, client, CONFIG.rotation_curve()));

    // The rotation timer runs from startup; /api/admin/cron/init becomes a
    // no-op once this has happened.
    app_state.scheduler.ensure_timer(CONFIG.rotation_tick());
    info!(
        "Persona rotation timer started - checking every {} seconds",
        CONFIG.rotation_tick().as_secs()
    );

    let app = create_router(app_state);

    let bind_address = format!("{}:{}", CONFIG.host, port);
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("Listening on http://{}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
