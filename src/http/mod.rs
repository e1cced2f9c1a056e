pub mod actor;
pub mod handlers;
pub mod response;

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch};
use axum::Router;
use std::time::Duration;
use tracing::Instrument;

use crate::core::VehicleService;
use crate::http::response::ApiError;
use crate::utils::error::FleetError;

pub use actor::{Actor, ACTOR_HEADER};

#[derive(Clone)]
pub struct AppState {
    pub service: VehicleService,
    pub default_page: i64,
    pub default_limit: i64,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(service: VehicleService) -> Self {
        Self {
            service,
            default_page: 1,
            default_limit: 10,
            request_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_pagination_defaults(mut self, page: i64, limit: i64) -> Self {
        self.default_page = page;
        self.default_limit = limit;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Wraps every request in a span and bounds its duration.
async fn request_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let span = tracing::info_span!(
        "http.request",
        method = %request.method(),
        route = %request.uri().path(),
    );
    let timeout = state.request_timeout;

    async move {
        let started = std::time::Instant::now();
        let response = match tokio::time::timeout(timeout, next.run(request)).await {
            Ok(response) => response,
            Err(_) => ApiError(FleetError::Timeout {
                millis: timeout.as_millis() as u64,
            })
            .into_response(),
        };
        tracing::info!(
            status = response.status().as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "request completed"
        );
        response
    }
    .instrument(span)
    .await
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route(
            "/api/vehicles",
            get(handlers::list_vehicles).post(handlers::create_vehicle),
        )
        .route(
            "/api/vehicles/:id/status",
            patch(handlers::update_vehicle_status),
        )
        .fallback(handlers::route_not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            request_middleware,
        ))
        .with_state(state)
}
