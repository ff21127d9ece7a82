use clap::Parser;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing_subscriber::{fmt, EnvFilter};

use visage_core::{FaceEncoderClient, PgSessionStore, VisageConfig};
use visage_server::http;
use visage_server::orchestrator::SessionOrchestrator;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "visage.toml")]
    config: String,

    #[arg(long)]
    health: bool,

    /// Drop and recreate the schema before serving. Destructive; never
    /// happens implicitly.
    #[arg(long)]
    reset_db: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (dev convenience — production uses real env vars)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Init logging
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    // Load config
    let config = match VisageConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", args.config, e);
            std::process::exit(1);
        }
    };

    // Connect to DB
    let pool = match visage_core::db::create_pool(&config.database).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    if args.health {
        match visage_core::db::health_check(&pool).await {
            Ok(v) => println!("✅ PostgreSQL connected: {}", v),
            Err(e) => {
                println!("❌ PostgreSQL connection failed: {}", e);
                std::process::exit(1);
            }
        }

        println!("✅ Visage DB health check passed");
        return Ok(());
    }

    if args.reset_db {
        visage_core::db::reset_schema(&pool).await?;
    }
    visage_core::db::run_migrations(&pool).await?;

    // Construct the collaborators once and inject them — no singletons.
    let store = Arc::new(PgSessionStore::new(pool));
    let encoder = FaceEncoderClient::new(&config.encoder)?;
    let orchestrator = SessionOrchestrator::new(store, encoder, config.upload.max_file_size);

    let (tx, _rx) = broadcast::channel(1);
    let shutdown_tx = tx.clone();

    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for Ctrl+C");
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(());
    });

    http::start_http_server(orchestrator, config, tx.subscribe()).await?;

    Ok(())
}
