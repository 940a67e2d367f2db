use analytics::{Dataset, DatasetCache, LoadError, MetricsEngine};
use axum::{
    Router,
    routing::{get, post},
};
use configuration::Config;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use views::PanelOptions;

use crate::error::AppError;

pub mod error;
pub mod handlers;

/// The shared application state that all handlers can access.
pub struct AppState {
    pub cache: Arc<DatasetCache>,
    pub options: PanelOptions,
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        let engine = MetricsEngine::new(views::classifier(&config.dashboard));
        let cache = DatasetCache::new(
            config.dataset.path.clone(),
            Duration::from_secs(config.dataset.cache_ttl_secs),
            engine,
        );
        Self {
            cache: Arc::new(cache),
            options: PanelOptions::from(&config.dashboard),
        }
    }

    /// The current dataset. A cold or stale cache parses the CSV, so the
    /// lookup runs on the blocking pool rather than an async worker.
    pub async fn dataset(&self) -> Result<Arc<Dataset>, AppError> {
        self.with_cache(|cache| cache.get()).await
    }

    /// Reloads the dataset from disk, also on the blocking pool.
    pub async fn refresh(&self) -> Result<Arc<Dataset>, AppError> {
        self.with_cache(|cache| cache.refresh()).await
    }

    async fn with_cache<F>(&self, load: F) -> Result<Arc<Dataset>, AppError>
    where
        F: FnOnce(&DatasetCache) -> Result<Arc<Dataset>, LoadError> + Send + 'static,
    {
        let cache = Arc::clone(&self.cache);
        Ok(tokio::task::spawn_blocking(move || load(&cache)).await??)
    }
}

/// Every route of the JSON API.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any());

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/summary", get(handlers::get_summary))
        .route("/api/brands", get(handlers::get_brands))
        .route("/api/views/overview", get(handlers::get_overview))
        .route("/api/views/brand-share", get(handlers::get_brand_share))
        .route("/api/views/price-tiers", get(handlers::get_price_tiers))
        .route("/api/views/features", get(handlers::get_features))
        .route("/api/query", get(handlers::get_query))
        .route("/api/cache/refresh", post(handlers::refresh_cache))
        .with_state(state)
        .layer(cors)
        // Logs every incoming request.
        .layer(TraceLayer::new_for_http())
}

/// Serves the API until Ctrl-C.
///
/// The dataset is not read here; the first request that needs it loads it.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let addr = config.server.socket_addr()?;
    let state = Arc::new(AppState::from_config(config));
    let app = router(state);

    tracing::info!(dataset = %config.dataset.path.display(), "Web server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Shutdown signal received.");
            }
        })
        .await?;

    Ok(())
}
