//! HTTP route handlers

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use counterd_keys::counter_keys;
use tracing::{debug, error};

use crate::event::IngressRequest;
use crate::HandlerState;

/// PUT /v1/ingress - ingest a single JSON event
///
/// Decode and validation failures are 400s with a describing body. A store
/// failure is logged and the response is still success: the approximate
/// store is best-effort on a per-event basis.
pub async fn ingress(State(state): State<Arc<HandlerState>>, body: Bytes) -> Response {
    let mut request: IngressRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => return invalid_request(format!("failed to parse: {e}")),
    };

    if let Err(e) = request.validate() {
        return invalid_request(e);
    }
    request.filter_attributes(&state.attributes);
    debug!(id = %request.id, attributes = ?request.attributes, "ingress event");

    // validate() fills in the date
    let date = request.date.unwrap_or_default();
    let labels = state.intervals.date_labels(date);
    let keys = counter_keys(&labels, &request.attributes);

    if let Err(err) = state.store.update_keys(&keys, &request.id).await {
        error!(error = %err, "failed to update approximate store");
    }
    StatusCode::OK.into_response()
}

fn invalid_request(detail: impl std::fmt::Display) -> Response {
    (StatusCode::BAD_REQUEST, format!("Invalid Request: {detail}")).into_response()
}

/// GET /v1/query/... - reserved for counter queries
pub async fn query() -> StatusCode {
    StatusCode::OK
}

/// GET /v1/domain/... - reserved for domain enumeration
pub async fn domain() -> StatusCode {
    StatusCode::OK
}

/// GET /v1/range/... - reserved for range queries
pub async fn range() -> StatusCode {
    StatusCode::OK
}

/// GET /ui - reserved for the web UI
pub async fn ui() -> StatusCode {
    StatusCode::OK
}
