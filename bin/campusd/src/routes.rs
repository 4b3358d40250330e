//! Route registration — module routes plus system endpoints.

use axum::Router;
use axum::response::IntoResponse;
use axum::routing::get;

/// Build the complete router. Module routers arrive fully formed (own
/// prefix, own state, own middleware) and are merged as-is.
pub fn build_router(module_routes: Vec<(&str, Router)>) -> Router {
    let mut app = Router::new()
        .route("/health", get(health))
        .route("/version", get(version));

    for (_name, router) in module_routes {
        app = app.merge(router);
    }

    app
}

async fn health() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
    }))
}

async fn version() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": "campusd",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
