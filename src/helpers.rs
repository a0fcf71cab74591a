use crate::Config;
use log::info;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;

/// Write side of a control connection. The session loop and its background
/// transfer tasks all reply through it.
pub type ControlWriter = Arc<Mutex<OwnedWriteHalf>>;

/// Sends a response to the client.
pub async fn send_response(writer: &ControlWriter, message: &[u8]) -> Result<(), std::io::Error> {
    let mut writer = writer.lock().await;
    writer.write_all(message).await?;
    writer.flush().await?;
    Ok(())
}

// Helper function to log configuration options
pub fn log_config(config: &Config) {
    info!("  Listen Address: {}", config.server.listen_address);
    info!("  Listen Port: {}", config.server.listen_port);
    info!(
        "  PASV Address: {}",
        config
            .server
            .pasv_address
            .as_deref()
            .unwrap_or("(control connection address)")
    );
    info!(
        "  PASV Ports: {}-{}",
        config.server.pasv_port_start,
        config
            .server
            .pasv_port_start
            .saturating_add(config.server.pasv_port_count.saturating_sub(1))
    );
    info!(
        "  Upload Buffer Size: {} KB",
        config.server.upload_buffer() / 1024
    );
    info!(
        "  Download Buffer Size: {} KB",
        config.server.download_buffer() / 1024
    );
}
