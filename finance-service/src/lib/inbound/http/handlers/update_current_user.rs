use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::AuthResponseData;
use crate::domain::principal::errors::PrincipalError;
use crate::domain::principal::models::EmailAddress;
use crate::domain::principal::models::Identifier;
use crate::domain::principal::models::Password;
use crate::domain::principal::models::UpdateProfileCommand;
use crate::inbound::http::middleware::CurrentIdentity;
use crate::inbound::http::router::AppState;

/// HTTP request body for updating the caller's profile (raw JSON)
///
/// Absent and empty fields are left unchanged.
#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl UpdateProfileRequest {
    fn try_into_command(self) -> Result<UpdateProfileCommand, PrincipalError> {
        let identifier = non_empty(self.username).map(Identifier::new).transpose()?;
        let email = non_empty(self.email).map(EmailAddress::new).transpose()?;
        let password = non_empty(self.password).map(Password::new).transpose()?;

        Ok(UpdateProfileCommand {
            identifier,
            email,
            password,
        })
    }
}

fn non_empty(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.is_empty())
}

/// Tokens are bound to the principal ID, so existing tokens stay valid after
/// a rename and the response carries a null token.
pub async fn update_current_user(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<ApiSuccess<AuthResponseData>, ApiError> {
    let command = req.try_into_command()?;

    state
        .principal_service
        .update_profile(&identity.id(), command)
        .await
        .map_err(ApiError::from)
        .map(|ref principal| {
            ApiSuccess::new(StatusCode::OK, AuthResponseData::without_token(principal))
        })
}
