use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use crate::domain::access::AccessDenied;
use crate::domain::principal::errors::PrincipalError;
use crate::domain::principal::models::AuthenticatedPrincipal;
use crate::domain::principal::models::Principal;

pub mod get_current_user;
pub mod health;
pub mod list_principals;
pub mod login;
pub mod register;
pub mod set_principal_enabled;
pub mod update_current_user;

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, data)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    UnprocessableEntity(String),
    NotFound(String),
    Conflict(String),
    Unauthorized(String),
    Forbidden(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::UnprocessableEntity(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
        };

        (status, Json(ApiResponseBody::new_error(status, message))).into_response()
    }
}

impl From<PrincipalError> for ApiError {
    fn from(err: PrincipalError) -> Self {
        match err {
            PrincipalError::NotFound(_) => ApiError::NotFound(err.to_string()),
            PrincipalError::DuplicateIdentifier(_) | PrincipalError::DuplicateEmail(_) => {
                ApiError::Conflict(err.to_string())
            }
            PrincipalError::InvalidCredentials | PrincipalError::Disabled(_) => {
                ApiError::Unauthorized(PrincipalError::InvalidCredentials.to_string())
            }
            PrincipalError::InvalidIdentifier(_)
            | PrincipalError::InvalidEmail(_)
            | PrincipalError::InvalidRoles(_)
            | PrincipalError::InvalidCredential(_) => {
                ApiError::UnprocessableEntity(err.to_string())
            }
            PrincipalError::Password(_)
            | PrincipalError::Token(_)
            | PrincipalError::DatabaseError(_)
            | PrincipalError::Unknown(_) => {
                tracing::error!(error = %err, "Principal operation failed");
                ApiError::InternalServerError("Internal server error".to_string())
            }
        }
    }
}

impl From<AccessDenied> for ApiError {
    fn from(denied: AccessDenied) -> Self {
        match denied {
            AccessDenied::Unauthenticated => ApiError::Unauthorized(denied.to_string()),
            AccessDenied::Forbidden => ApiError::Forbidden(denied.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status_code: u16,
    data: T,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(status_code: StatusCode, data: T) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data,
        }
    }
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(status_code: StatusCode, message: String) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data: ApiErrorData { message },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,
}

/// Response data for register, login, and profile update.
///
/// `token` is null when no new token was issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthResponseData {
    pub token: Option<String>,
    #[serde(rename = "type")]
    pub token_type: &'static str,
    pub expires_at: Option<DateTime<Utc>>,
    pub username: String,
    pub email: String,
    pub roles: Vec<String>,
}

impl AuthResponseData {
    pub fn without_token(principal: &Principal) -> Self {
        Self {
            token: None,
            token_type: "Bearer",
            expires_at: None,
            username: principal.identifier.as_str().to_string(),
            email: principal.email.as_str().to_string(),
            roles: principal.roles.names(),
        }
    }
}

impl From<&AuthenticatedPrincipal> for AuthResponseData {
    fn from(authenticated: &AuthenticatedPrincipal) -> Self {
        Self {
            token: Some(authenticated.access_token.clone()),
            expires_at: Some(authenticated.expires_at),
            ..Self::without_token(&authenticated.principal)
        }
    }
}

/// Principal as exposed to its owner and to administrators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrincipalData {
    pub id: String,
    pub username: String,
    pub email: String,
    pub roles: Vec<String>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Principal> for PrincipalData {
    fn from(principal: &Principal) -> Self {
        Self {
            id: principal.id.to_string(),
            username: principal.identifier.as_str().to_string(),
            email: principal.email.as_str().to_string(),
            roles: principal.roles.names(),
            enabled: principal.enabled,
            created_at: principal.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_errors_hide_details() {
        let error = ApiError::from(PrincipalError::DatabaseError(
            "connection refused at 10.0.0.3".to_string(),
        ));
        assert_eq!(
            error,
            ApiError::InternalServerError("Internal server error".to_string())
        );
    }

    #[test]
    fn test_disabled_principal_maps_to_invalid_credentials() {
        assert_eq!(
            ApiError::from(PrincipalError::Disabled("carol".to_string())),
            ApiError::from(PrincipalError::InvalidCredentials)
        );
    }

    #[test]
    fn test_access_denied_status() {
        assert_eq!(
            ApiError::from(AccessDenied::Unauthenticated)
                .into_response()
                .status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AccessDenied::Forbidden).into_response().status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_duplicate_maps_to_conflict() {
        assert!(matches!(
            ApiError::from(PrincipalError::DuplicateEmail("alice@x.com".to_string())),
            ApiError::Conflict(_)
        ));
    }
}
