use axum::extract::State;
use axum::http::StatusCode;

use super::ApiError;
use super::ApiSuccess;
use super::PrincipalData;
use crate::inbound::http::router::AppState;

pub async fn list_principals(
    State(state): State<AppState>,
) -> Result<ApiSuccess<Vec<PrincipalData>>, ApiError> {
    state
        .principal_service
        .list_principals()
        .await
        .map_err(ApiError::from)
        .map(|principals| {
            ApiSuccess::new(
                StatusCode::OK,
                principals.iter().map(PrincipalData::from).collect(),
            )
        })
}
