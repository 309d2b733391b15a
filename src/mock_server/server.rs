//! axum router and lifecycle for the mock MobSF server.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use super::fixtures::{DefaultScenario, Fixtures};
use super::handlers;
use super::state::MockState;

/// Largest upload the mock accepts.
const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// In-process MobSF stand-in bound to a random localhost port.
///
/// Dropping the handle without calling [`MockServer::shutdown`] leaves the
/// task running until the runtime stops.
pub struct MockServer {
    base_url: String,
    task: JoinHandle<()>,
    shared: Arc<RwLock<MockState>>,
}

impl MockServer {
    /// Serve the default scenario: one scanned sample APK.
    pub async fn start() -> Self {
        Self::with_state(Self::seeded_state()).await
    }

    /// Serve with no uploads or scans.
    pub async fn start_empty() -> Self {
        Self::with_state(MockState::new()).await
    }

    /// Serve the given state.
    pub async fn with_state(state: MockState) -> Self {
        let shared = state.shared();
        let router = Self::routes(shared.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock MobSF listener");
        let addr = listener.local_addr().expect("mock MobSF local address");

        let task = tokio::spawn(async move {
            axum::serve(listener, router)
                .await
                .expect("mock MobSF server stopped");
        });

        Self {
            base_url: format!("http://{addr}"),
            task,
            shared,
        }
    }

    /// Base URL to hand to `MobsfClient::new`.
    pub fn url(&self) -> &str {
        &self.base_url
    }

    /// The live state, for seeding or inspecting data mid-test.
    pub fn state(&self) -> Arc<RwLock<MockState>> {
        Arc::clone(&self.shared)
    }

    /// Number of API requests served so far.
    pub async fn request_count(&self) -> usize {
        self.shared.read().await.requests
    }

    /// Stop serving and wait for the task to wind down.
    pub async fn shutdown(self) {
        self.task.abort();
        let _ = self.task.await;
    }

    fn seeded_state() -> MockState {
        let DefaultScenario { uploads, scans } = Fixtures::default_scenario();

        let state = uploads.into_iter().fold(MockState::new(), MockState::with_upload);
        scans
            .into_iter()
            .fold(state, |state, (hash, scan)| state.with_scan(&hash, scan))
    }

    fn routes(state: Arc<RwLock<MockState>>) -> Router {
        Router::new()
            .route("/api/v1/upload", post(handlers::upload))
            .route("/api/v1/scans", get(handlers::list_scans))
            .route("/api/v1/scan", post(handlers::scan))
            .route("/api/v1/delete_scan", post(handlers::delete_scan))
            .route("/api/v1/download_pdf", post(handlers::download_pdf))
            .route("/api/v1/report_json", post(handlers::report_json))
            .route("/api/v1/view_source", post(handlers::view_source))
            .route("/health", get(health))
            .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
            .with_state(state)
    }
}

async fn health() -> &'static str {
    "ok"
}
