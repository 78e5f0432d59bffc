// Standalone fixture server for manual runs against a real browser

use std::net::SocketAddr;
use tracing::{Level, error, info};

include!("../../tests/common/fixture_app.rs");

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let port: u16 = std::env::args()
        .nth(1)
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    info!("Fixture server listening on http://{}", addr);
    if let Err(e) = axum::serve(listener, create_app()).await {
        error!("Server failed: {}", e);
        std::process::exit(1);
    }
}
