use craftdeck_core::{api::ApiServer, config::AppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    tracing::info!("craftdeck core daemon starting");

    let config = AppConfig::load();
    tracing::info!(
        servers_root = %config.servers_root.display(),
        java_bin = %config.java_bin,
        "configuration loaded"
    );

    ApiServer::new(config).start().await?;

    tracing::info!("craftdeck core daemon shutting down");
    Ok(())
}
