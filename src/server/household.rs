use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::server::AppState;
use crate::server::response::ApiError;

pub const HOUSEHOLD_HEADER: &str = "x-household-id";

/// Extractor for the household a request acts on behalf of.
///
/// Sessions are handled in front of this service, which forwards the
/// authenticated household id in the `X-Household-Id` header.
pub struct ActingHousehold(pub i64);

impl FromRequestParts<Arc<AppState>> for ActingHousehold {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(HOUSEHOLD_HEADER)
            .ok_or_else(|| ApiError::unauthorized("Household required"))?
            .to_str()
            .ok()
            .and_then(|v| v.trim().parse::<i64>().ok())
            .ok_or_else(|| ApiError::bad_request("Invalid household id"))?;

        state
            .store
            .get_household(id)
            .map_err(|_| ApiError::internal("Failed to look up household"))?
            .ok_or_else(|| ApiError::unauthorized("Unknown household"))?;

        Ok(ActingHousehold(id))
    }
}
