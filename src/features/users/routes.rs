use axum::{routing::get, Router};
use std::sync::Arc;

use crate::features::users::handlers;
use crate::features::users::services::SettingsService;

/// Config routes (require JWT authentication)
pub fn routes(service: Arc<SettingsService>) -> Router {
    Router::new()
        .route(
            "/config",
            get(handlers::get_config).put(handlers::update_config),
        )
        .with_state(service)
}
