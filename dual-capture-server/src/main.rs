use dual_capture_server::{serve, MemoryStorage, ServerConfig, ServerError};

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from_env()?;
    let storage = MemoryStorage::new();
    if config.seed_demo_data {
        storage.seed_demo()?;
    }

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    log::info!("Capture API listening on http://{}", listener.local_addr()?);

    serve(listener, storage, shutdown_signal()).await?;
    log::info!("Capture API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
