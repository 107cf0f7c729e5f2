use std::sync::Arc;

use anyhow::Context;
use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wlts_core::catalog::Catalog;
use wlts_trajectory::{CollectionRegistry, DatasourceRegistry, TrajectoryService};

use wlts_api::{create_router, ApiConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wlts_api=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ApiConfig::load().context("Failed to load settings")?;

    tracing::info!(
        port = config.port,
        catalog = %config.catalog_path.display(),
        max_concurrency = config.max_concurrency,
        trust_roles_header = config.trust_roles_header,
        "Starting WLTS API server"
    );

    let catalog = Catalog::load(&config.catalog_path).with_context(|| {
        format!(
            "Failed to load catalog from {}. Set WLTS_CATALOG to the catalog file",
            config.catalog_path.display()
        )
    })?;
    let datasources = DatasourceRegistry::from_catalog(&catalog, config.request_timeout)?;
    let collections =
        CollectionRegistry::from_catalog(&catalog, &datasources, config.raster_buffer)?;

    let service = TrajectoryService::new(collections, config.max_concurrency);
    let state = Arc::new(AppState::new(service).with_trusted_roles(config.trust_roles_header));

    let origin = if config.allows_any_origin() {
        AllowOrigin::any()
    } else {
        let origin = config
            .cors_origin
            .parse::<HeaderValue>()
            .with_context(|| format!("Invalid CORS origin '{}'", config.cors_origin))?;
        AllowOrigin::exact(origin)
    };
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let app = create_router(state).layer(cors).layer(TraceLayer::new_for_http());

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Listening on {}", addr);
    tracing::info!("CORS enabled for {}", config.cors_origin);

    axum::serve(listener, app).await?;
    Ok(())
}
