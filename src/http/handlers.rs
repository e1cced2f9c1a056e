use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::domain::model::{StatusInput, VehicleInput};
use crate::domain::validation::status_text;
use crate::http::actor::Actor;
use crate::http::response::{success, ApiError};
use crate::http::AppState;
use crate::utils::error::FleetError;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Leading-integer parse; unparsable input and zero fall back to `default`.
pub fn parse_int_or(raw: Option<&str>, default: i64) -> i64 {
    let Some(raw) = raw else {
        return default;
    };
    let raw = raw.trim();
    let sign_len = usize::from(raw.starts_with(['-', '+']));
    let digits_len = raw[sign_len..]
        .bytes()
        .take_while(|b| b.is_ascii_digit())
        .count();
    match raw[..sign_len + digits_len].parse::<i64>() {
        Ok(0) | Err(_) => default,
        Ok(value) => value,
    }
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(value)| value).map_err(|rejection| {
        ApiError(FleetError::MalformedBody {
            message: rejection.body_text(),
        })
    })
}

pub async fn health() -> Response {
    success(
        StatusCode::OK,
        Some("Server is running"),
        json!({ "status": "ok", "timestamp": chrono::Utc::now() }),
    )
}

pub async fn list_vehicles(
    State(state): State<AppState>,
    _actor: Actor,
    Query(params): Query<ListParams>,
) -> Result<Response, ApiError> {
    let page = parse_int_or(params.page.as_deref(), state.default_page);
    let limit = parse_int_or(params.limit.as_deref(), state.default_limit);

    let result = state.service.list(page, limit).await?;
    Ok(success(StatusCode::OK, None, result))
}

pub async fn create_vehicle(
    State(state): State<AppState>,
    Actor(actor): Actor,
    payload: Result<Json<VehicleInput>, JsonRejection>,
) -> Result<Response, ApiError> {
    let input = body(payload)?;
    let vehicle = state.service.create(&input, actor).await?;
    Ok(success(
        StatusCode::CREATED,
        Some("Vehicle created successfully"),
        json!({ "vehicle": vehicle }),
    ))
}

pub async fn update_vehicle_status(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<String>,
    payload: Result<Json<StatusInput>, JsonRejection>,
) -> Result<Response, ApiError> {
    let input = body(payload)?;
    let status = status_text(input.status.as_ref());
    let vehicle = state
        .service
        .update_status(&id, status.as_deref(), actor)
        .await?;
    Ok(success(
        StatusCode::OK,
        Some("Vehicle status updated successfully"),
        json!({ "vehicle": vehicle }),
    ))
}

pub async fn route_not_found() -> ApiError {
    ApiError(FleetError::NotFound {
        entity: "Route".to_string(),
    })
}
