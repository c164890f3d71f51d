/// API сервер конвейера модели стоимости

use anyhow::Context;

use costmodel_ml::{server, PipelineConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Инициализация логирования
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = match std::env::var("COSTMODEL_CONFIG") {
        Ok(path) => PipelineConfig::from_json_file(&path)
            .with_context(|| format!("failed to load config from {}", path))?,
        Err(_) => PipelineConfig::default(),
    };
    tracing::info!(
        "Pipeline: operator '{}', target '{}', {} categorical domains",
        config.operator_type,
        config.target_column,
        config.domains.len()
    );

    let app = server::router(server::AppState::new(config));

    let addr = std::env::var("COSTMODEL_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
