use std::net::SocketAddr;

use busadmin_mock_backend::{fixtures, router, AppState};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("BUSADMIN_MOCK_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));

    let state = AppState::new(fixtures::seed());
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("🚌 Mock backend listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
