use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use log::{info, warn};
use sqlx::mysql::MySqlPoolOptions;
use tagwizard::auth::create_session_layer;
use tagwizard::store::MySqlUserStore;
use tagwizard::web::{self, AppState};
use tagwizard::{AppConfig, BuiltinModel, ModelError, ModelManager, TagPredictor, Tagger};
use tower_sessions::{ExpiredDeletion, MemoryStore};
use tower_sessions_sqlx_store::MySqlStore;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Force a fresh download of the model files
    #[arg(short, long)]
    fresh: bool,

    /// Port to listen on (overrides TAGWIZARD_PORT)
    #[arg(short, long)]
    port: Option<u16>,
}

async fn connect_database(config: &AppConfig) -> Option<MySqlUserStore> {
    info!("Initializing database connection...");
    let options = match config.database.mysql_options() {
        Ok(options) => options,
        Err(e) => {
            warn!("{}", e);
            warn!("Authentication functionality will be disabled");
            return None;
        }
    };
    let pool = MySqlPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await;

    let store = match pool {
        Ok(pool) => MySqlUserStore::new(pool),
        Err(e) => {
            warn!("Database connection failed: {}", e);
            warn!("Authentication functionality will be disabled");
            return None;
        }
    };

    if let Err(e) = store.ensure_schema().await {
        warn!("Could not verify users table: {}", e);
        warn!("Authentication functionality will be disabled");
        return None;
    }
    info!("Database connection verified");
    Some(store)
}

/// Resolves the model directory, downloading artifacts when a base URL is configured.
async fn resolve_model_dir(config: &AppConfig, fresh: bool) -> anyhow::Result<PathBuf> {
    if let Some(dir) = &config.model_dir {
        return Ok(dir.clone());
    }

    let model = BuiltinModel::StackExchangeDistilBert;
    let manager = ModelManager::new_default().context("Failed to create model cache directory")?;

    match &config.model_base_url {
        Some(base_url) => {
            let model_info = model.get_model_info(base_url);
            if fresh {
                info!("Fresh download requested - removing any existing model files...");
                manager.remove_download(&model_info.name)?;
            }
            manager.ensure_model_downloaded(&model_info).await?;
        }
        None if !manager.is_model_downloaded(model.name()) => {
            return Err(ModelError::NotDownloaded(format!(
                "{} (set TAGWIZARD_MODEL_DIR or TAGWIZARD_MODEL_BASE_URL)",
                model.name()
            ))
            .into());
        }
        None => {}
    }

    Ok(manager.get_model_dir(model.name()))
}

async fn load_tagger(config: &AppConfig, fresh: bool) -> anyhow::Result<Tagger> {
    let dir = resolve_model_dir(config, fresh).await?;
    info!("Loading model from: {}", dir.display());

    let top_k = config.top_k;
    let max_sequence_length = config.max_sequence_length;
    let tagger = tokio::task::spawn_blocking(move || {
        Tagger::builder()
            .with_top_k(top_k)?
            .with_model_dir(&dir, max_sequence_length)?
            .build()
    })
    .await??;
    Ok(tagger)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tagwizard::init_logger();
    let args = Args::parse();

    info!("=== Starting TagWizard ===");
    let mut config = AppConfig::from_env().context("Invalid configuration")?;
    if let Some(port) = args.port {
        config.port = port;
    }

    let users = connect_database(&config).await;

    let start_time = Instant::now();
    let tagger: Option<Arc<dyn TagPredictor>> = match load_tagger(&config, args.fresh).await {
        Ok(tagger) => {
            info!(
                "Model '{}' loaded with {} labels (took {:.2?})",
                tagger.model_name,
                tagger.labels.len(),
                start_time.elapsed()
            );
            let tagger: Arc<dyn TagPredictor> = Arc::new(tagger);
            Some(tagger)
        }
        Err(e) => {
            warn!("Model loading failed: {:#}", e);
            warn!("Tag prediction functionality will be disabled");
            None
        }
    };

    let secure = config.is_secure();
    let state = AppState::new(users.clone(), tagger);
    let app = match users {
        Some(store) => {
            let session_store = MySqlStore::new(store.pool().clone());
            session_store
                .migrate()
                .await
                .context("Failed to create session table")?;
            tokio::task::spawn(
                session_store
                    .clone()
                    .continuously_delete_expired(Duration::from_secs(60)),
            );
            web::router(state).layer(create_session_layer(session_store, secure))
        }
        None => web::router(state).layer(create_session_layer(MemoryStore::default(), secure)),
    };

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("=== TagWizard ready on http://{} ===", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(tagwizard::shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
