use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::core::middleware::{provider_auth_middleware, ProviderCredential};
use crate::features::storage::handlers;
use crate::features::storage::services::{ShareService, StorageService};

/// Provider file API (requires the provider credential)
pub fn protected_routes(
    storage: Arc<StorageService>,
    shares: Arc<ShareService>,
    credential: Arc<ProviderCredential>,
    max_upload_size: usize,
) -> Router {
    let files = Router::new()
        .route(
            "/api/files",
            get(handlers::list_files).delete(handlers::delete_file),
        )
        .route(
            "/api/upload",
            post(handlers::upload_file).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/api/download", get(handlers::download_file))
        .route("/api/stats", get(handlers::get_stats))
        .with_state(storage);

    let share = Router::new()
        .route("/api/share", post(handlers::create_share))
        .with_state(shares);

    files
        .merge(share)
        .route_layer(from_fn_with_state(credential, provider_auth_middleware))
}

/// Public share downloads
pub fn public_routes(shares: Arc<ShareService>) -> Router {
    Router::new()
        .route("/s/{share_id}", get(handlers::access_share))
        .with_state(shares)
}
