//! Reserve/release HTTP routes.
//!
//! ## Endpoints
//!
//! - `POST /reserve/{resource}/{token}` - check out one index; a success
//!   response carries the index as a decimal string body.
//! - `DELETE /release/{resource}/{allocation}/{token}` - return an index;
//!   success has an empty body.
//! - `GET /health` - liveness probe.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::error::ServiceError;
use crate::service::ReservationService;

/// Application state for the reservation routes.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ReservationService>,
}

/// Create the reservation router.
pub fn reservation_router(service: Arc<ReservationService>) -> Router {
    Router::new()
        .route("/reserve/:resource/:token", post(reserve))
        .route("/release/:resource/:allocation/:token", delete(release))
        .route("/health", get(health))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(AppState { service })
}

async fn health() -> &'static str {
    "OK"
}

/// POST /reserve/{resource}/{token}
async fn reserve(
    State(state): State<AppState>,
    Path((resource, token)): Path<(String, String)>,
) -> Result<String, (StatusCode, String)> {
    match state.service.reserve(&resource, &token).await {
        Ok(index) => Ok(index.to_string()),
        Err(err) => Err(map_service_error(err)),
    }
}

/// DELETE /release/{resource}/{allocation}/{token}
///
/// The allocation segment must parse as an unsigned integer; anything else
/// (a negative number included) is rejected with 400 before reaching the
/// core.
async fn release(
    State(state): State<AppState>,
    Path((resource, allocation, token)): Path<(String, u32, String)>,
) -> Result<(), (StatusCode, String)> {
    match state
        .service
        .release(&resource, i64::from(allocation), &token)
        .await
    {
        Ok(()) => Ok(()),
        Err(err) => Err(map_service_error(err)),
    }
}

/// Map core errors onto wire statuses: expected allocation outcomes and
/// unknown resources are 503, auth failures 401, failed snapshot commits
/// 500.
fn map_service_error(err: ServiceError) -> (StatusCode, String) {
    match err {
        ServiceError::UnknownResource { .. } | ServiceError::Pool(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "Resource unavailable".to_string(),
        ),
        ServiceError::Unauthorized { .. } => {
            (StatusCode::UNAUTHORIZED, "Unauthorized".to_string())
        }
        ServiceError::Snapshot(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Snapshot write failed".to_string(),
        ),
    }
}
