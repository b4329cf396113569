//! Pixsheet sheet service binary.

use pixsheet_server::{ADDR_ENV, DEFAULT_ADDR, SheetStore, router};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pixsheet_server=info,tower_http=info".into()),
        )
        .init();

    let raw_addr = std::env::var(ADDR_ENV).unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let addr: SocketAddr = match raw_addr.parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!("Invalid {} {:?}: {}", ADDR_ENV, raw_addr, e);
            std::process::exit(1);
        }
    };

    let app = router(Arc::new(SheetStore::new()));

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    info!("Pixsheet sheet service listening on {}", addr);

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
    }
}
