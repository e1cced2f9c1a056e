use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::domain::model::RecordId;
use crate::http::response::ApiError;
use crate::utils::error::FleetError;

/// Header the authentication gateway sets to the verified user id.
pub const ACTOR_HEADER: &str = "x-user-id";

/// The verified identity performing the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor(pub RecordId);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Actor {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let unauthorized = |message: &str| {
            ApiError(FleetError::Unauthorized {
                message: message.to_string(),
            })
        };

        let raw = parts
            .headers
            .get(ACTOR_HEADER)
            .ok_or_else(|| unauthorized("missing user identity"))?
            .to_str()
            .map_err(|_| unauthorized("user identity is not valid text"))?;

        raw.trim()
            .parse()
            .map(Actor)
            .map_err(|_| unauthorized("user identity is malformed"))
    }
}
