pub mod api;
pub mod model;
pub mod service;

use std::sync::Arc;

use axum::Router;
use campus_core::Module;

use service::CampusService;

/// Campus module — alumni and batch-lifecycle management.
pub struct CampusModule {
    service: Arc<CampusService>,
}

impl CampusModule {
    pub fn new(service: Arc<CampusService>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &Arc<CampusService> {
        &self.service
    }
}

impl Module for CampusModule {
    fn name(&self) -> &str {
        "campus"
    }

    fn routes(&self) -> Router {
        api::build_router(self.service.clone())
    }
}
