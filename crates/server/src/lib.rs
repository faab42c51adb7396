//! HTTP ingress and server shell
//!
//! Exposes the counting service over HTTP:
//!
//! - `PUT /v1/ingress` - ingest a single JSON event
//! - `GET /v1/query/...`, `/v1/domain/...`, `/v1/range/...` - reserved
//! - `GET /` - redirect to `/ui` (reserved)
//!
//! Each request is handled on an independent task; the ingress pipeline is
//! stateless between requests and contention is pushed down to the store's
//! connection pool. When authentication is enabled a bearer-token check
//! runs before routing; failures yield 403.
//!
//! The approximate store is best-effort on the ingress path: a store
//! failure is logged and the client still sees success. Losing a single
//! event costs one increment of an estimate; surfacing the failure would
//! cost retries against a store that is already unhappy.

mod auth;
mod error;
mod event;
mod handlers;


use std::sync::Arc;

use axum::http::{header, StatusCode};
use axum::routing::{get, put};
use axum::Router;
use counterd_config::{AttributesConfig, AuthConfig};
use counterd_keys::IntervalSet;
use counterd_store::CounterStore;
use tokio::net::TcpListener;
use tracing::info;

pub use error::ServerError;
pub use event::IngressRequest;

use handlers::{domain, ingress, query, range, ui};

/// Shared state for handlers
pub struct HandlerState {
    pub store: Arc<dyn CounterStore>,
    pub intervals: IntervalSet,
    pub attributes: AttributesConfig,
}

/// The counterd HTTP server
pub struct IngressServer {
    listen_address: String,
    auth: AuthConfig,
    state: Arc<HandlerState>,
}

impl IngressServer {
    /// Create a server for the given listener address and configuration
    pub fn new(
        listen_address: impl Into<String>,
        auth: AuthConfig,
        attributes: AttributesConfig,
        store: Arc<dyn CounterStore>,
    ) -> Self {
        Self {
            listen_address: listen_address.into(),
            auth,
            state: Arc::new(HandlerState {
                store,
                intervals: IntervalSet::ALL,
                attributes,
            }),
        }
    }

    /// Bind the listener and serve until it errors
    pub async fn run(self) -> Result<(), ServerError> {
        let listener =
            TcpListener::bind(&self.listen_address)
                .await
                .map_err(|e| ServerError::Bind {
                    address: self.listen_address.clone(),
                    source: e,
                })?;
        info!(address = %self.listen_address, "listener started");

        let app = build_router(self.state, &self.auth);
        axum::serve(listener, app).await.map_err(ServerError::Http)
    }
}

/// Build the router for all endpoints
///
/// When `auth.required` is set the whole router sits behind the bearer
/// check, which rejects with 403 before any route work.
pub fn build_router(state: Arc<HandlerState>, auth: &AuthConfig) -> Router {
    let router = Router::new()
        .route("/v1/ingress", put(ingress))
        .route("/v1/query/{*rest}", get(query))
        .route("/v1/domain/{*rest}", get(domain))
        .route("/v1/range/{*rest}", get(range))
        .route("/ui", get(ui))
        .route(
            "/",
            get(|| async {
                (
                    StatusCode::MOVED_PERMANENTLY,
                    [(header::LOCATION, "/ui")],
                )
            }),
        )
        .with_state(state);

    if auth.required {
        let tokens = Arc::new(auth.tokens.clone());
        router.layer(axum::middleware::from_fn(
            move |req: axum::extract::Request, next: axum::middleware::Next| {
                let tokens = Arc::clone(&tokens);
                auth::require_bearer(tokens, req, next)
            },
        ))
    } else {
        router
    }
}
