use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tokengate_backend::infrastructure::config::{Config, LogFormat, StoreBackend};
use tokengate_backend::infrastructure::db::{check_connection, create_pool, run_migrations};
use tokengate_backend::infrastructure::http::{build_app, start_http_server};
use tokengate_backend::infrastructure::repositories::{InMemoryStore, Repositories};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        "Starting TokenGate Backend on {}:{}",
        config.host,
        config.port
    );
    tracing::info!(
        quiz_cost = config.economy.quiz_cost,
        flashcard_cost = config.economy.flashcard_cost,
        free_use_cap = config.economy.free_use_cap,
        "Token economy policy loaded"
    );

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Instantiate stores
    tracing::info!("Instantiating repositories...");
    let repos = match config.store_backend {
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or("DATABASE_URL is required when STORE_BACKEND=postgres")?;

            let pool = create_pool(database_url).await?;
            tracing::info!("Database connection pool created");

            check_connection(&pool).await?;
            tracing::info!("Database connection verified");

            run_migrations(&pool).await?;
            tracing::info!("Database migrations applied");

            Repositories::postgres(Arc::new(pool))
        }
        StoreBackend::Memory => {
            if !config.is_development() {
                tracing::warn!("In-memory store selected outside development; data is lost on restart");
            }
            Repositories::in_memory(Arc::new(InMemoryStore::new()))
        }
    };

    // 2. Services, controllers and routes
    let config = Arc::new(config);
    let app = build_app(config.clone(), repos);

    // Start HTTP server with all routes
    start_http_server(config, app).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "tokengate_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "tokengate_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
