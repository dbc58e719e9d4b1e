use anyhow::Context;
use dotenvy::dotenv;
use shiftdesk::logging::init_tracing;
use shiftdesk::metrics::{init_metrics, metrics_app};
use shiftdesk::router::init_router;
use shiftdesk::shiftdesk_config::ServerConfig;
use shiftdesk::state::init_app_state;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing()?;

    let config = ServerConfig::from_env()?;
    let state = init_app_state(&config).await?;

    if let Some(handle) = init_metrics()? {
        let metrics_addr = config.metrics_addr();
        let listener = tokio::net::TcpListener::bind(&metrics_addr)
            .await
            .with_context(|| format!("Failed to bind metrics server on {}", metrics_addr))?;
        info!(addr = %metrics_addr, "Metrics server listening");

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, metrics_app(handle)).await {
                error!(error = %e, "Metrics server stopped");
            }
        });
    }

    let app = init_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(addr = %addr, "Server running");
    info!("Swagger UI available at http://{}/swagger-ui", addr);
    info!("Scalar UI available at http://{}/scalar", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
