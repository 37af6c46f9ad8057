use tracing::info;
use tracing_subscriber::EnvFilter;

use smoothie_server::{serve, AppState, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // Logging: RUST_LOG overrides the default filter
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,smoothie_server=debug")),
        )
        .init();

    info!("Starting Smoothie recipe service v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // Configuration from the environment
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(
        addr = %config.http_addr,
        auth_enabled = config.api_token.is_some(),
        "Loaded configuration"
    );

    let http_addr = config.http_addr;
    let state = AppState::new(config);

    // -----------------------------------------------------------------------
    // Serve until the listener fails or Ctrl+C
    // -----------------------------------------------------------------------
    tokio::select! {
        result = serve(state, http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
