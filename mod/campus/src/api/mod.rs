mod alumni;
mod auth;
mod batches;
mod companies;
mod connections;
mod dashboard;
mod middleware;
mod students;
mod uploads;

use std::sync::Arc;

use axum::Router;

use crate::service::CampusService;

/// Shared application state.
pub type AppState = Arc<CampusService>;

/// Build the complete campus API router.
///
/// Everything is mounted under `/api` with the bearer-token middleware
/// applied; the binary merges the result as-is.
pub fn build_router(svc: Arc<CampusService>) -> Router {
    let api = Router::new()
        .merge(auth::routes())
        .merge(batches::routes())
        .merge(students::routes())
        .merge(alumni::routes())
        .merge(companies::routes())
        .merge(dashboard::routes())
        .merge(uploads::routes())
        .merge(connections::routes());

    Router::new()
        .nest("/api", api)
        .layer(axum::middleware::from_fn_with_state(
            svc.clone(),
            middleware::auth_middleware,
        ))
        .with_state(svc)
}
