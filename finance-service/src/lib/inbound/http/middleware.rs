use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;

use crate::domain::access;
use crate::domain::access::AccessDenied;
use crate::domain::access::RouteSensitivity;
use crate::domain::principal::errors::PrincipalError;
use crate::domain::principal::models::Identity;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Authentication state of a single request.
///
/// Installed into the request's extensions by [`identify`] and dropped with
/// the request, so concurrent requests never see each other's identity.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    identity: Option<Identity>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self { identity: None }
    }

    fn authenticated(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }
}

/// Request interceptor establishing the caller's identity.
///
/// Never rejects: a missing, malformed, forged, or expired token, or a
/// subject that no longer resolves to an enabled principal, leaves the
/// request anonymous. Whether anonymous is acceptable is decided later by
/// [`enforce_access`].
pub async fn identify(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let context = match bearer_token(req.headers()) {
        Some(token) => establish(&state, &token).await,
        None => RequestContext::anonymous(),
    };

    req.extensions_mut().insert(context);

    next.run(req).await
}

async fn establish(state: &AppState, token: &str) -> RequestContext {
    let claims = match state.authenticator.verify_token(token, Utc::now()) {
        Ok(claims) => claims,
        Err(reason) => {
            tracing::debug!(reason = %reason, "Bearer token rejected, continuing anonymously");
            return RequestContext::anonymous();
        }
    };

    match state.principal_service.resolve(&claims.sub).await {
        Ok(identity) => {
            tracing::debug!(identifier = %identity.identifier(), "Request authenticated");
            RequestContext::authenticated(identity)
        }
        Err(PrincipalError::DatabaseError(e)) => {
            tracing::warn!(error = %e, "Credential store lookup failed, continuing anonymously");
            RequestContext::anonymous()
        }
        Err(e) => {
            tracing::debug!(
                subject = %claims.sub,
                reason = %e,
                "Token subject did not resolve, continuing anonymously"
            );
            RequestContext::anonymous()
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Route-group access stage.
///
/// Layered per route group with that group's declared sensitivity; runs
/// after [`identify`] on every request.
pub async fn enforce_access(
    State(sensitivity): State<RouteSensitivity>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = req
        .extensions()
        .get::<RequestContext>()
        .and_then(RequestContext::identity);

    if let Err(denied) = access::decide(sensitivity, identity) {
        tracing::debug!(
            uri = %req.uri(),
            sensitivity = ?sensitivity,
            reason = %denied,
            "Access denied"
        );
        return Err(ApiError::from(denied));
    }

    Ok(next.run(req).await)
}

/// Extractor giving handlers read access to the caller's identity.
///
/// Rejects with 401 when the request is anonymous.
#[derive(Debug, Clone)]
pub struct CurrentIdentity(pub Identity);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .and_then(RequestContext::identity)
            .cloned()
            .map(CurrentIdentity)
            .ok_or_else(|| ApiError::from(AccessDenied::Unauthenticated))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_present() {
        assert_eq!(
            bearer_token(&headers("Bearer abc.def.ghi")),
            Some("abc.def.ghi".to_string())
        );
    }

    #[test]
    fn test_bearer_token_absent_or_other_scheme() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwYXNz")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&headers("bearer abc")), None);
    }

    #[test]
    fn test_anonymous_context_has_no_identity() {
        assert!(RequestContext::anonymous().identity().is_none());
        assert!(RequestContext::default().identity().is_none());
    }
}
