use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Extension, Json, Router};

use campus_core::ServiceError;

use crate::api::AppState;
use crate::model::Claims;
use crate::service::student::{CreateStudentInput, StudentQuery};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/students", get(list_students).post(create_student))
        // Literal segments must be declared alongside the {id} routes;
        // axum matches them before the capture.
        .route("/students/profile", get(my_profile).put(update_my_profile))
        .route("/students/stats", get(my_stats))
        .route("/students/my-batch", get(my_batch))
        .route(
            "/students/{id}",
            get(get_student).put(update_student).delete(delete_student),
        )
}

async fn create_student(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(input): Json<CreateStudentInput>,
) -> Result<(axum::http::StatusCode, Json<serde_json::Value>), ServiceError> {
    claims.require_admin()?;
    let student = svc.create_student(input)?;
    Ok((
        axum::http::StatusCode::CREATED,
        Json(serde_json::to_value(student).unwrap()),
    ))
}

async fn list_students(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<StudentQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    claims.require_admin()?;
    let (items, total) = svc.list_students(&query)?;
    Ok(Json(serde_json::json!({"items": items, "total": total})))
}

async fn get_student(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    claims.require_admin()?;
    let student = svc.get_student(&id)?;
    Ok(Json(serde_json::to_value(student).unwrap()))
}

async fn update_student(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    claims.require_admin()?;
    let student = svc.update_student(&id, patch)?;
    Ok(Json(serde_json::to_value(student).unwrap()))
}

async fn delete_student(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<axum::http::StatusCode, ServiceError> {
    claims.require_admin()?;
    svc.delete_student(&id)?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

// ── Self-service ──

async fn my_profile(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    claims.require_student()?;
    let user = svc.get_student(&claims.sub)?;
    Ok(Json(serde_json::to_value(user).unwrap()))
}

async fn update_my_profile(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    claims.require_student()?;
    let user = svc.update_own_profile(&claims.sub, patch)?;
    Ok(Json(serde_json::to_value(user).unwrap()))
}

async fn my_stats(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    claims.require_student()?;
    let stats = svc.student_stats(&claims.sub)?;
    Ok(Json(serde_json::to_value(stats).unwrap()))
}

async fn my_batch(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    claims.require_student()?;
    let mates = svc.my_batch(&claims.sub)?;
    Ok(Json(serde_json::json!({"items": mates})))
}
