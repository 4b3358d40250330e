use axum::extract::{Path, Query, State};
use axum::routing::{get, put};
use axum::{Extension, Json, Router};

use campus_core::{ListParams, ServiceError};

use crate::api::AppState;
use crate::model::Claims;
use crate::service::batch::CreateBatchInput;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/batches", get(list_batches).post(create_batch))
        .route("/batches/{id}", get(get_batch))
        .route("/batches/{id}/complete", put(complete_batch))
}

async fn create_batch(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(input): Json<CreateBatchInput>,
) -> Result<(axum::http::StatusCode, Json<serde_json::Value>), ServiceError> {
    claims.require_admin()?;
    let batch = svc.create_batch(input)?;
    Ok((
        axum::http::StatusCode::CREATED,
        Json(serde_json::to_value(batch).unwrap()),
    ))
}

async fn list_batches(
    State(svc): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let result = svc.list_batches(&params)?;
    Ok(Json(serde_json::json!({
        "items": result.items,
        "total": result.total,
    })))
}

async fn get_batch(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let batch = svc.get_batch(&id)?;
    Ok(Json(serde_json::to_value(batch).unwrap()))
}

async fn complete_batch(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    claims.require_admin()?;
    let batch = svc.complete_batch(&id)?;
    Ok(Json(serde_json::to_value(batch).unwrap()))
}
