use axum::{middleware::from_fn_with_state, Router};
use std::sync::Arc;

use crate::core::config::{AuthConfig, StorageConfig, TransferConfig};
use crate::core::error::Result;
use crate::core::middleware::{self, ProviderCredential};
use crate::features::auth::{routes as auth_routes, AuthService, PasswordHasher, TokenService};
use crate::features::catalog::{routes as catalog_routes, CatalogService};
use crate::features::providers::{routes as providers_routes, ProviderClient, ProviderService};
use crate::features::storage::{routes as storage_routes, ShareService, StorageService};
use crate::features::transfers::models::TaskStore;
use crate::features::transfers::services::{
    ArchiveService, DeletionService, ReplicationService, RetrievalService,
};
use crate::features::transfers::{routes as transfers_routes, TransferServices};
use crate::features::users::{routes as users_routes, SettingsService, UserService};
use crate::modules::storage::{DocumentStore, ObjectStore};

/// Everything the gateway role serves, wired over one document store
pub struct GatewayServices {
    pub tokens: Arc<TokenService>,
    pub auth: Arc<AuthService>,
    pub settings: Arc<SettingsService>,
    pub catalog: Arc<CatalogService>,
    pub providers: Arc<ProviderService>,
    pub transfers: TransferServices,
}

impl GatewayServices {
    pub fn new(
        docs: Arc<DocumentStore>,
        auth: &AuthConfig,
        transfer: &TransferConfig,
    ) -> Result<Self> {
        let users = Arc::new(UserService::new(Arc::clone(&docs)));
        let tokens = Arc::new(TokenService::new(auth));
        let hasher = PasswordHasher::new(auth.password_hash_iterations)?;
        let auth_service = Arc::new(AuthService::new(
            Arc::clone(&users),
            Arc::clone(&tokens),
            hasher,
        ));
        tracing::info!("Auth services initialized");

        let client = Arc::new(ProviderClient::new(transfer.provider_timeout)?);
        let catalog = Arc::new(CatalogService::new(docs, Arc::clone(&users)));
        let providers = Arc::new(ProviderService::new(
            Arc::clone(&users),
            Arc::clone(&catalog),
            Arc::clone(&client),
        ));
        let settings = Arc::new(SettingsService::new(
            Arc::clone(&users),
            Arc::clone(&providers),
        ));
        tracing::info!("Provider registry and catalog initialized");

        let uploads = Arc::new(TaskStore::new());
        let downloads = Arc::new(TaskStore::new());

        let replication = Arc::new(ReplicationService::new(
            Arc::clone(&catalog),
            Arc::clone(&providers),
            Arc::clone(&client),
            Arc::clone(&uploads),
            transfer,
        ));
        let retrieval = Arc::new(RetrievalService::new(
            Arc::clone(&catalog),
            Arc::clone(&providers),
            Arc::clone(&client),
            Arc::clone(&downloads),
        ));
        let archive = Arc::new(ArchiveService::new(Arc::clone(&retrieval)));
        let deletion = Arc::new(DeletionService::new(
            Arc::clone(&catalog),
            Arc::clone(&providers),
            client,
        ));
        tracing::info!(
            "Transfer coordinators initialized (provider concurrency: {}, file parallelism: {})",
            transfer.max_provider_concurrency,
            transfer.file_parallelism
        );

        Ok(Self {
            tokens,
            auth: auth_service,
            settings,
            catalog,
            providers,
            transfers: TransferServices {
                replication,
                retrieval,
                archive,
                deletion,
                uploads,
                downloads,
            },
        })
    }
}

/// Gateway API: auth endpoints are public, everything else requires an access token
pub fn gateway_router(services: &GatewayServices, max_upload_size: usize) -> Router {
    let protected_routes = Router::new()
        .merge(auth_routes::protected_routes(Arc::clone(&services.auth)))
        .merge(users_routes::routes(Arc::clone(&services.settings)))
        .merge(providers_routes::routes(Arc::clone(&services.providers)))
        .merge(catalog_routes::routes(Arc::clone(&services.catalog)))
        .merge(transfers_routes::routes(&services.transfers, max_upload_size))
        .route_layer(from_fn_with_state(
            Arc::clone(&services.tokens),
            middleware::auth_middleware,
        ));

    let public_routes = auth_routes::public_routes(Arc::clone(&services.auth));

    Router::new().merge(protected_routes).merge(public_routes)
}

/// Provider backend over `store`, guarded by the configured credential
pub fn storage_router(
    store: Arc<dyn ObjectStore>,
    config: &StorageConfig,
    credential: &str,
    public_base_url: &str,
    max_upload_size: usize,
) -> Router {
    let storage = Arc::new(StorageService::new(Arc::clone(&store), config.quota_bytes));
    let shares = Arc::new(ShareService::new(
        store,
        config.default_share_ttl,
        public_base_url.to_string(),
    ));
    tracing::info!(
        "Provider backend initialized (quota: {} bytes, share TTL: {}s)",
        config.quota_bytes,
        config.default_share_ttl.as_secs()
    );

    Router::new()
        .merge(storage_routes::protected_routes(
            storage,
            Arc::clone(&shares),
            Arc::new(ProviderCredential::new(credential)),
            max_upload_size,
        ))
        .merge(storage_routes::public_routes(shares))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::storage::MemoryObjectStore;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use std::time::Duration;
    use tower::ServiceExt;

    fn auth_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "router-test-secret".to_string(),
            access_token_ttl: Duration::from_secs(3600),
            refresh_token_ttl: Duration::from_secs(3600),
            password_hash_iterations: 1,
        }
    }

    fn gateway() -> GatewayServices {
        let docs = Arc::new(DocumentStore::new(Arc::new(MemoryObjectStore::new())));
        GatewayServices::new(docs, &auth_config(), &TransferConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_protected_routes_require_access_token() {
        let app = gateway_router(&gateway(), 1024 * 1024);

        for uri in ["/config", "/providers", "/files/metadata", "/tasks/uploads", "/auth/me"] {
            let response = app
                .clone()
                .oneshot(Request::get(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_refresh_token_is_not_an_access_token() {
        let services = gateway();
        let pair = services
            .tokens
            .issue_pair_at("user-1", "a@example.com", chrono::Utc::now().timestamp())
            .unwrap();
        let app = gateway_router(&services, 1024 * 1024);

        let request = |token: &str| {
            Request::get("/tasks/uploads")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap()
        };

        let refused = app.clone().oneshot(request(&pair.refresh_token)).await.unwrap();
        assert_eq!(refused.status(), StatusCode::UNAUTHORIZED);

        let accepted = app.oneshot(request(&pair.access_token)).await.unwrap();
        assert_eq!(accepted.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_storage_router_checks_credential() {
        let app = storage_router(
            Arc::new(MemoryObjectStore::new()),
            &StorageConfig {
                auth_token: Some("secret".to_string()),
                quota_bytes: 1024,
                default_share_ttl: Duration::from_secs(60),
            },
            "secret",
            "http://localhost",
            1024,
        );

        let anonymous = app
            .clone()
            .oneshot(Request::get("/api/stats").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

        let authorized = app
            .clone()
            .oneshot(
                Request::get("/api/stats")
                    .header(header::AUTHORIZATION, "Bearer secret")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(authorized.status(), StatusCode::OK);

        let missing_share = app
            .oneshot(Request::get("/s/unknown").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(missing_share.status(), StatusCode::NOT_FOUND);
    }
}
