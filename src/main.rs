use std::sync::Arc;

use systemd_health_sampler::{
    build_app,
    config::{EngineConfig, ServerConfig},
    directives, logging,
    metrics::{LogSink, MetricSink, SampleStore},
    sampler::{run_schedule, Engine},
    systemd_client::DbusServiceManager,
    AppState,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging();

    let server = ServerConfig::from_env()?;
    let directives = directives::load(&server.config_path)?;
    let config = EngineConfig::from_directives(&directives)?;

    let store = Arc::new(SampleStore::new());
    if let Some(engine) = Engine::start(config, DbusServiceManager::new()).await {
        let sink: Arc<dyn MetricSink> = if engine.config().verbose {
            Arc::new((store.clone(), LogSink))
        } else {
            store.clone()
        };
        tokio::spawn(run_schedule(engine, sink));
    }

    let app = build_app(AppState::new(store));
    let listener = tokio::net::TcpListener::bind(server.bind_socket()?).await?;

    info!(
        config_path = %server.config_path.display(),
        bind_addr = %server.bind_addr,
        bind_port = server.bind_port,
        "server starting"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
