use std::net::SocketAddr;
use std::sync::Arc;

use busadmin_frontend::{AdminConfig, ApiClient};
use busadmin_mock_backend::{fixtures, AppState, MockStore};

pub struct TestBackend {
    pub state: AppState,
    pub gateway: Arc<ApiClient>,
    pub config: AdminConfig,
}

/// Start a seeded mock backend on an ephemeral port
pub async fn start() -> TestBackend {
    start_with(fixtures::seed()).await
}

pub async fn start_with(store: MockStore) -> TestBackend {
    let state = AppState::new(store);
    let addr = busadmin_mock_backend::spawn(SocketAddr::from(([127, 0, 0, 1], 0)), state.clone())
        .await
        .expect("Failed to start mock backend");
    let config = AdminConfig {
        api_base_url: format!("http://{}", addr),
        ..AdminConfig::default()
    };
    let gateway = Arc::new(ApiClient::new(&config).expect("Failed to build client"));
    TestBackend {
        state,
        gateway,
        config,
    }
}
