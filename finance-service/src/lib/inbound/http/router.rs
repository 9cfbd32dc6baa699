use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::routing::put;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::get_current_user::get_current_user;
use super::handlers::health::health;
use super::handlers::list_principals::list_principals;
use super::handlers::login::login;
use super::handlers::register::register;
use super::handlers::set_principal_enabled::set_principal_enabled;
use super::handlers::update_current_user::update_current_user;
use super::middleware::enforce_access;
use super::middleware::identify;
use crate::domain::access::RouteSensitivity;
use crate::domain::principal::models::Role;
use crate::domain::principal::ports::PrincipalServicePort;

#[derive(Clone)]
pub struct AppState {
    pub principal_service: Arc<dyn PrincipalServicePort>,
    pub authenticator: Arc<Authenticator>,
}

/// Build the HTTP surface.
///
/// Every request passes CORS, tracing, and identity establishment in that
/// order; each route group then checks its own sensitivity before the
/// handler runs.
pub fn create_router(
    principal_service: Arc<dyn PrincipalServicePort>,
    authenticator: Arc<Authenticator>,
) -> Router {
    let state = AppState {
        principal_service,
        authenticator,
    };

    let public_routes = Router::new()
        .route("/api/public/health", get(health))
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route_layer(middleware::from_fn_with_state(
            RouteSensitivity::Public,
            enforce_access,
        ));

    let authenticated_routes = Router::new()
        .route(
            "/api/users/me",
            get(get_current_user).put(update_current_user),
        )
        .route_layer(middleware::from_fn_with_state(
            RouteSensitivity::Authenticated,
            enforce_access,
        ));

    let admin_routes = Router::new()
        .route("/api/admin/principals", get(list_principals))
        .route(
            "/api/admin/principals/:identifier/enabled",
            put(set_principal_enabled),
        )
        .route_layer(middleware::from_fn_with_state(
            RouteSensitivity::RoleGated(Role::Administrator),
            enforce_access,
        ));

    // Headers are left out of the span: they carry bearer tokens.
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(authenticated_routes)
        .merge(admin_routes)
        .layer(middleware::from_fn_with_state(state.clone(), identify))
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
