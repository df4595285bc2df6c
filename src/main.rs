//! Main entry point for Inpaint Studio

use inpaint_studio::{
    api, config::Settings, provider::ReplicateProvider, AppState,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Load configuration; a missing credential stops the process here
    let settings = Settings::load()?;
    settings.validate()?;

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));

    if settings.logging.format == "pretty" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().pretty())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    }

    info!("Starting Inpaint Studio");
    info!(
        model = %settings.provider.model,
        uploads = %settings.storage.upload_dir,
        outputs = %settings.storage.output_dir,
        "Loaded configuration"
    );

    let provider = Arc::new(ReplicateProvider::new(&settings.provider)?);
    let app_state = Arc::new(AppState::new(settings, provider));

    // Ensure the directories exist
    app_state.pipeline.uploads().ensure_dir().await?;
    app_state.pipeline.outputs().ensure_dir().await?;

    let addr = format!(
        "{}:{}",
        app_state.settings.server.host, app_state.settings.server.port
    );

    // Build the router
    let app = api::routes::create_router(app_state);

    info!("Server listening on {}", addr);

    // Start the server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
