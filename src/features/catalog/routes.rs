use axum::{routing::get, Router};
use std::sync::Arc;

use crate::features::catalog::handlers;
use crate::features::catalog::services::CatalogService;

/// Catalog routes (require JWT authentication)
pub fn routes(service: Arc<CatalogService>) -> Router {
    Router::new()
        .route(
            "/files/metadata",
            get(handlers::list_entries)
                .post(handlers::append_entry)
                .delete(handlers::remove_entry),
        )
        .with_state(service)
}
