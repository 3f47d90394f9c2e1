use crate::config::AppConfig;
use crate::server;

pub async fn handle(config: AppConfig) -> anyhow::Result<()> {
    tracing::info!(port = config.server.port, "Starting HTTP server");
    server::serve(config).await
}
