use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::Deserialize;

use campus_core::{ListParams, ServiceError};

use crate::api::AppState;
use crate::model::Claims;
use crate::service::company::CreateCompanyInput;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/companies", get(list_companies).post(create_company))
        .route("/companies/{id}", get(get_company))
        .route("/companies/{id}/share-students", post(share_students))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShareBody {
    batch_id: Option<String>,
    message: Option<String>,
}

async fn create_company(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(input): Json<CreateCompanyInput>,
) -> Result<(axum::http::StatusCode, Json<serde_json::Value>), ServiceError> {
    claims.require_admin()?;
    let company = svc.create_company(input)?;
    Ok((
        axum::http::StatusCode::CREATED,
        Json(serde_json::to_value(company).unwrap()),
    ))
}

async fn list_companies(
    State(svc): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let result = svc.list_companies(&params)?;
    Ok(Json(serde_json::json!({
        "items": result.items,
        "total": result.total,
    })))
}

async fn get_company(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let company = svc.get_company(&id)?;
    Ok(Json(serde_json::to_value(company).unwrap()))
}

async fn share_students(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(body): Json<ShareBody>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    claims.require_admin()?;
    let batch_id = body
        .batch_id
        .filter(|b| !b.is_empty())
        .ok_or_else(|| ServiceError::Validation("batchId is required".into()))?;
    let shared = svc.share_students(&id, &batch_id, body.message)?;
    Ok(Json(serde_json::json!({"sharedCount": shared})))
}
