use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, middleware::Next};
use serde_json::json;

use campus_core::error::error_code;

use crate::api::AppState;

/// Paths that don't require authentication.
const PUBLIC_PATHS: &[&str] = &[
    "/api/auth/register",
    "/api/auth/login",
    "/api/files/",
];

/// Bearer-token authentication middleware.
///
/// Public paths pass through untouched. Everything else needs a valid
/// `Authorization: Bearer <jwt>` whose session has not been revoked;
/// the decoded Claims are stored as a request extension for handlers.
pub async fn auth_middleware(
    State(svc): State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();
    if is_public_path(&path) {
        return next.run(req).await;
    }

    let token = match extract_bearer(req.headers()) {
        Some(t) => t.to_string(),
        None => return unauthorized("missing authorization header"),
    };

    match svc.verify_token(&token) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(e) => unauthorized(&e.to_string()),
    }
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"code": error_code::UNAUTHENTICATED, "message": message})),
    )
        .into_response()
}

/// Extract the Bearer token from the Authorization header.
fn extract_bearer(headers: &axum::http::HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

fn is_public_path(path: &str) -> bool {
    PUBLIC_PATHS.iter().any(|prefix| path.starts_with(prefix))
}
