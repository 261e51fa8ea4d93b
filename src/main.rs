use mimalloc::MiMalloc;
use practice_cms::db::{ContentStorage, connect};
use practice_cms::router::{CmsState, cms_router};
use practice_cms::uploads::ImageStore;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = practice_cms::config::Config::load()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.database.url,
        uploads_dir = %cfg.uploads.dir.display(),
        loglevel = %cfg.basic.loglevel,
        rollback = ?cfg.editor.rollback,
    );
    if cfg.basic.admin_key == practice_cms::config::BasicConfig::default().admin_key {
        warn!("admin key is still the built-in default; set CMS_BASIC__ADMIN_KEY");
    }

    let pool = connect(&cfg.database.url, cfg.database.max_connections).await?;
    let storage = ContentStorage::new(pool);
    storage.init_schema().await?;

    tokio::fs::create_dir_all(&cfg.uploads.dir).await?;
    let images = ImageStore::new(cfg.uploads.dir.clone(), cfg.uploads.max_image_bytes);

    let state = CmsState::new(
        storage,
        images,
        cfg.basic.admin_key.as_str(),
        cfg.basic.admin_path.as_str(),
    );
    let app = cms_router(state);

    let listener = TcpListener::bind(cfg.basic.listen_addr.as_str()).await?;
    info!("HTTP server listening on {}", cfg.basic.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
    }
}
