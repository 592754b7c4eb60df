//! In-memory mock of the bus administration backend.
//!
//! Serves the same REST contract as the real API, seeded with fixture data,
//! for local development and client integration tests.

pub mod fixtures;
pub mod rest;
pub mod store;

use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;

pub use rest::{router, AppState};
pub use store::{MockStore, StoreError};

/// Serve `state` on `addr` in a background task and return the bound address.
///
/// Bind to port 0 to get an ephemeral port.
pub async fn spawn(addr: SocketAddr, state: AppState) -> anyhow::Result<SocketAddr> {
    let listener = TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    let app = router(state);
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("❌ Mock backend stopped: {}", e);
        }
    });
    info!("🚌 Mock backend listening on {}", local);
    Ok(local)
}
