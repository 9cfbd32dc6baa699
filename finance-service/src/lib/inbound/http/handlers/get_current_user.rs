use axum::extract::State;
use axum::http::StatusCode;

use super::ApiError;
use super::ApiSuccess;
use super::PrincipalData;
use crate::inbound::http::middleware::CurrentIdentity;
use crate::inbound::http::router::AppState;

pub async fn get_current_user(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
) -> Result<ApiSuccess<PrincipalData>, ApiError> {
    state
        .principal_service
        .get_principal(&identity.id())
        .await
        .map_err(ApiError::from)
        .map(|ref principal| ApiSuccess::new(StatusCode::OK, principal.into()))
}
