use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::features::providers::handlers;
use crate::features::providers::services::ProviderService;

/// Provider Registry routes (require JWT authentication)
pub fn routes(service: Arc<ProviderService>) -> Router {
    Router::new()
        .route(
            "/providers",
            get(handlers::list_providers).post(handlers::create_provider),
        )
        .route(
            "/providers/{id}",
            put(handlers::update_provider).delete(handlers::delete_provider),
        )
        .route("/providers/{id}/test", post(handlers::test_provider))
        .route("/providers/{id}/stats", get(handlers::provider_stats))
        .route("/providers/{id}/files", get(handlers::browse_provider))
        .with_state(service)
}
