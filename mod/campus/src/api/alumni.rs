use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};

use campus_core::ServiceError;

use crate::api::AppState;
use crate::service::alumni::AlumniQuery;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/alumni", get(list_alumni))
        .route("/alumni/companies", get(companies))
        .route("/alumni/{id}", get(get_alumnus))
}

async fn list_alumni(
    State(svc): State<AppState>,
    Query(query): Query<AlumniQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let (items, total) = svc.list_alumni(&query)?;
    Ok(Json(serde_json::json!({"items": items, "total": total})))
}

async fn companies(
    State(svc): State<AppState>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let companies = svc.alumni_companies()?;
    Ok(Json(serde_json::json!({"items": companies})))
}

async fn get_alumnus(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let user = svc.get_alumnus(&id)?;
    Ok(Json(serde_json::to_value(user).unwrap()))
}
