mod config;
mod error;
mod routes;

use contentful_core::generator::list_content_types;
use contentful_core::services::MirrorService;
use contentful_core::ModelRegistry;

use config::AppConfig;
use routes::{app_router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Only load .env in development; production uses platform-native env injection.
    #[cfg(debug_assertions)]
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("contentful=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!("Starting contentful-webhook with config: {:?}", config);

    let contentful = &config.contentful;
    let client = contentful.management_client()?;
    let content_types = list_content_types(&client).await?;
    tracing::info!("Loaded {} content types", content_types.len());

    let mut registry = ModelRegistry::with_defaults(&contentful.table_prefix);
    registry.register_schema(&content_types, &contentful.table_prefix);

    let mirror = MirrorService::open_path(
        &contentful.database_path,
        contentful.database_options(),
        registry,
        &contentful.default_locale,
    )
    .await?;

    let router = app_router(AppState::new(mirror, config.webhook_secret.clone()));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("contentful-webhook listening on {}", config.bind_addr);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {error}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
