use axum::extract::State;
use axum::routing::get;
use axum::{Extension, Json, Router};

use campus_core::ServiceError;

use crate::api::AppState;
use crate::model::Claims;

pub fn routes() -> Router<AppState> {
    Router::new().route("/dashboard/stats", get(stats))
}

async fn stats(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    claims.require_admin()?;
    let stats = svc.dashboard_stats()?;
    Ok(Json(serde_json::to_value(stats).unwrap()))
}
