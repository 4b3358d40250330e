use axum::extract::{Path, State};
use axum::routing::{delete, get, post, put};
use axum::{Extension, Json, Router};

use campus_core::ServiceError;

use crate::api::AppState;
use crate::model::Claims;
use crate::service::student::StudentQuery;

// Networking is a UI-facing stub: the browse endpoints are real reads,
// the request/accept/reject endpoints acknowledge and store nothing.
// A real implementation needs a pending/accepted/rejected state machine
// per user pair; nothing here persists such state.

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/connections/students", get(browse_students))
        .route("/connections/alumni", get(browse_alumni))
        .route("/connections/requests", get(list_requests))
        .route("/connections/send/{id}", post(send_request))
        .route("/connections/accept/{id}", put(accept_request))
        .route("/connections/reject/{id}", delete(reject_request))
}

const BROWSE_LIMIT: usize = 20;

async fn browse_students(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let (items, _) = svc.list_students(&StudentQuery {
        is_alumni: Some(false),
        limit: Some(BROWSE_LIMIT + 1),
        ..Default::default()
    })?;
    let items: Vec<_> = items
        .into_iter()
        .filter(|u| u.id != claims.sub)
        .take(BROWSE_LIMIT)
        .collect();
    Ok(Json(serde_json::json!({"items": items})))
}

async fn browse_alumni(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let (items, _) = svc.list_alumni(&crate::service::alumni::AlumniQuery {
        limit: Some(BROWSE_LIMIT + 1),
        ..Default::default()
    })?;
    let items: Vec<_> = items
        .into_iter()
        .filter(|u| u.id != claims.sub)
        .take(BROWSE_LIMIT)
        .collect();
    Ok(Json(serde_json::json!({"items": items})))
}

async fn list_requests() -> Json<serde_json::Value> {
    Json(serde_json::json!({"items": []}))
}

async fn send_request(Path(_id): Path<String>) -> Json<serde_json::Value> {
    Json(serde_json::json!({"message": "connection request sent"}))
}

async fn accept_request(Path(_id): Path<String>) -> Json<serde_json::Value> {
    Json(serde_json::json!({"message": "connection request accepted"}))
}

async fn reject_request(Path(_id): Path<String>) -> Json<serde_json::Value> {
    Json(serde_json::json!({"message": "connection request rejected"}))
}
