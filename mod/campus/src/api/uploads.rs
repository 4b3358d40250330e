use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::Deserialize;

use campus_core::ServiceError;

use crate::api::AppState;
use crate::model::Claims;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/upload/profile-picture",
            post(upload_picture).delete(delete_picture),
        )
        .route("/upload/resume", post(upload_resume).delete(delete_resume))
        .route("/files/{*key}", get(serve_file))
}

#[derive(Debug, Deserialize)]
struct UploadParams {
    filename: String,
}

async fn upload_picture(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<UploadParams>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ServiceError> {
    if body.is_empty() {
        return Err(ServiceError::Validation("empty upload".into()));
    }
    let url = svc.upload_profile_picture(&claims.sub, &params.filename, &body)?;
    Ok(Json(serde_json::json!({"url": url})))
}

async fn delete_picture(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<StatusCode, ServiceError> {
    svc.delete_profile_picture(&claims.sub)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn upload_resume(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<UploadParams>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ServiceError> {
    claims.require_student()?;
    if body.is_empty() {
        return Err(ServiceError::Validation("empty upload".into()));
    }
    let url = svc.upload_resume(&claims.sub, &params.filename, &body)?;
    Ok(Json(serde_json::json!({"url": url})))
}

async fn delete_resume(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<StatusCode, ServiceError> {
    claims.require_student()?;
    svc.delete_resume(&claims.sub)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Serve a stored blob. Public: stored URLs are embedded in profiles
/// rendered for any user.
async fn serve_file(
    State(svc): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response, ServiceError> {
    match svc.get_file(&key)? {
        Some(data) => {
            let mime = content_type_for(&key);
            Ok(([(header::CONTENT_TYPE, mime)], data).into_response())
        }
        None => Err(ServiceError::NotFound(format!("file {} not found", key))),
    }
}

/// Content type from the key's extension. Everything unknown is served
/// as an opaque download.
fn content_type_for(key: &str) -> &'static str {
    match key.rsplit_once('.').map(|(_, e)| e) {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("pdf") => "application/pdf",
        Some("doc") => "application/msword",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_types() {
        assert_eq!(content_type_for("avatars/u1.png"), "image/png");
        assert_eq!(content_type_for("avatars/u1.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("resumes/u1.pdf"), "application/pdf");
        assert_eq!(content_type_for("weird/noext"), "application/octet-stream");
    }
}
