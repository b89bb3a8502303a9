use std::path::PathBuf;

use clap::Parser;
use hackteams::{
    config::{create_app, run_migrations},
    settings::Settings,
    state::build_pool,
};
use tracing_subscriber::EnvFilter;

/// Registration and team formation portal.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// TOML settings file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Address to listen on, e.g. `0.0.0.0:8000`.
    #[arg(long)]
    bind: Option<String>,
    /// SQLite database path, or `:memory:`.
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        settings.bind = bind;
    }
    if let Some(database_url) = args.database_url {
        settings.database_url = database_url;
    }

    tracing::info!(database = %settings.database_url, "opening database");
    let pool = build_pool(&settings.database_url)?;
    run_migrations(&pool)?;

    let bind = settings.bind.clone();
    let app = create_app(pool, settings)?;

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
