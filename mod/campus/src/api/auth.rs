use axum::extract::State;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::Deserialize;

use campus_core::ServiceError;

use crate::api::AppState;
use crate::model::Claims;
use crate::service::auth::RegisterInput;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RegisterBody {
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
    role: Option<String>,
    student_id: Option<String>,
    batch: Option<String>,
    course: Option<String>,
    department: Option<String>,
    year: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct LoginBody {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

async fn register(
    State(svc): State<AppState>,
    Json(body): Json<RegisterBody>,
) -> Result<(axum::http::StatusCode, Json<serde_json::Value>), ServiceError> {
    let (token, user) = svc.register(RegisterInput {
        name: body.name,
        email: body.email,
        password: body.password,
        role: body.role,
        student_id: body.student_id,
        batch: body.batch,
        course: body.course,
        department: body.department,
        year: body.year,
    })?;
    Ok((
        axum::http::StatusCode::CREATED,
        Json(serde_json::json!({"token": token, "user": user})),
    ))
}

async fn login(
    State(svc): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let (token, user) = svc.login(&body.email, &body.password)?;
    Ok(Json(serde_json::json!({"token": token, "user": user})))
}

async fn me(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let user = svc.get_user(&claims.sub)?;
    Ok(Json(serde_json::to_value(user).unwrap()))
}
