use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::PrincipalData;
use crate::domain::principal::errors::PrincipalError;
use crate::domain::principal::models::Identifier;
use crate::inbound::http::router::AppState;

#[derive(Debug, Deserialize)]
pub struct SetEnabledRequest {
    pub enabled: bool,
}

pub async fn set_principal_enabled(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
    Json(req): Json<SetEnabledRequest>,
) -> Result<ApiSuccess<PrincipalData>, ApiError> {
    let identifier = Identifier::new(identifier).map_err(PrincipalError::from)?;

    state
        .principal_service
        .set_enabled(&identifier, req.enabled)
        .await
        .map_err(ApiError::from)
        .map(|ref principal| ApiSuccess::new(StatusCode::OK, principal.into()))
}
