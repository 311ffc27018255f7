use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{
    Router,
    routing::{get, post},
};

use super::{attachments, auth, hashnames};
use crate::auth::{AuthGate, NonceStore};
use crate::registry::{AttachmentService, ClaimService};
use crate::store::Store;

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub store_timeout: Duration,
    pub nonces: NonceStore,
    pub gate: AuthGate,
    pub claims: ClaimService,
    pub attachments: AttachmentService,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn Store>, store_timeout: Duration) -> Self {
        Self {
            nonces: NonceStore::new(Arc::clone(&store), store_timeout),
            gate: AuthGate::new(Arc::clone(&store), store_timeout),
            claims: ClaimService::new(Arc::clone(&store), store_timeout),
            attachments: AttachmentService::new(Arc::clone(&store), store_timeout),
            store,
            store_timeout,
        }
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/auth/nonce", post(auth::issue_nonce))
        .route("/api/v1/hashnames/claim", post(hashnames::claim_hashname))
        .route("/api/v1/hashnames/{handle}", get(hashnames::get_hashname))
        .route(
            "/api/v1/attachments/request",
            post(attachments::request_attachment),
        )
        .route(
            "/api/v1/attachments/resolve",
            post(attachments::resolve_attachment),
        )
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
