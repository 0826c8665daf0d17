use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use log::info;
use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use tagwizard::login_api;
use tagwizard::store::PgUserStore;
use tagwizard::LoginApiConfig;

#[derive(Parser)]
#[command(author, version, about = "TagWizard JSON login service", long_about = None)]
struct Args {
    /// Port to listen on (overrides LOGIN_API_PORT)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tagwizard::init_logger();
    let args = Args::parse();

    let mut config = LoginApiConfig::from_env().context("Invalid configuration")?;
    if let Some(port) = args.port {
        config.port = port;
    }

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect(config.database_url.expose_secret())
        .await
        .context("Failed to connect to PostgreSQL")?;
    let store = PgUserStore::new(pool);
    store.ensure_schema().await.context("Failed to create users table")?;

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Login API listening on http://{}", addr);

    axum::serve(listener, login_api::router(store))
        .with_graceful_shutdown(tagwizard::shutdown_signal())
        .await?;
    Ok(())
}
