use anyhow::Context;

use holotrack_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    holotrack_observability::init();

    let config = AppConfig::from_env()?;
    let app = holotrack_api::app::build_app_from_config(&config).await?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
