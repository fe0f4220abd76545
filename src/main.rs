use std::sync::Arc;

use damdfe_render::config::{AppConfig, DEFAULT_CONFIG_PATH};
use damdfe_render::logger::init_logger;
use damdfe_render::server::{router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logger(false);

    // Charge la configuration du rendu et du serveur
    let config_path =
        std::env::var("DAMDFE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = AppConfig::load(&config_path)?;
    let bind = config.server.bind.clone();

    let app = router(Arc::new(AppState::new(config)?));

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!("Serveur sur http://{}", bind);
    axum::serve(listener, app).await?;
    Ok(())
}
