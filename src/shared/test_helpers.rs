use axum::Router;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use fake::faker::internet::en::SafeEmail;
use fake::Fake;

use crate::core::config::{AuthConfig, TransferConfig};
use crate::core::middleware::ProviderCredential;
use crate::core::router::{gateway_router, GatewayServices};
use crate::features::auth::dtos::{AuthResponseDto, RegisterRequestDto};
use crate::features::auth::TokenService;
use crate::features::providers::dtos::CreateProviderDto;
use crate::features::providers::models::ProviderConfig;
use crate::features::storage::{routes as storage_routes, ShareService, StorageService};
use crate::modules::storage::{DocumentStore, MemoryObjectStore, ObjectStore};

/// Binds an ephemeral local port and returns it with its base URL
pub async fn bind_local() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    (listener, base_url)
}

pub fn serve(listener: TcpListener, router: Router) {
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
}

pub async fn spawn_router(router: Router) -> String {
    let (listener, base_url) = bind_local().await;
    serve(listener, router);
    base_url
}

/// A provider backend running on an in-memory bucket
pub struct TestProvider {
    pub base_url: String,
    pub store: Arc<MemoryObjectStore>,
}

pub async fn spawn_provider(token: &str) -> TestProvider {
    let (listener, base_url) = bind_local().await;
    let store = Arc::new(MemoryObjectStore::new());

    let storage = Arc::new(StorageService::new(store.clone(), 10 * 1024 * 1024));
    let shares = Arc::new(ShareService::new(
        store.clone(),
        Duration::from_secs(7 * 24 * 3600),
        base_url.clone(),
    ));

    let router = Router::new()
        .merge(storage_routes::protected_routes(
            storage,
            Arc::clone(&shares),
            Arc::new(ProviderCredential::new(token)),
            64 * 1024 * 1024,
        ))
        .merge(storage_routes::public_routes(shares));

    serve(listener, router);
    TestProvider { base_url, store }
}

pub fn provider_config(id: &str, base_url: &str, token: &str) -> ProviderConfig {
    ProviderConfig {
        id: id.to_string(),
        name: format!("Provider {}", id),
        endpoint: base_url.to_string(),
        credential: token.to_string(),
        is_active: true,
        added_at: Utc::now(),
    }
}

pub fn test_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "test-jwt-secret".to_string(),
        access_token_ttl: Duration::from_secs(3600),
        refresh_token_ttl: Duration::from_secs(14 * 24 * 3600),
        password_hash_iterations: 1_000,
    }
}

/// A gateway running on an in-memory config bucket
pub struct TestGateway {
    pub base_url: String,
    pub tokens: Arc<TokenService>,
    pub services: GatewayServices,
}

pub async fn spawn_gateway() -> TestGateway {
    spawn_gateway_with(&TransferConfig::default()).await
}

pub async fn spawn_gateway_with(transfer: &TransferConfig) -> TestGateway {
    spawn_gateway_on(Arc::new(MemoryObjectStore::new()), transfer).await
}

/// A gateway persisting users and catalogs into `store`
pub async fn spawn_gateway_on(
    store: Arc<dyn ObjectStore>,
    transfer: &TransferConfig,
) -> TestGateway {
    let docs = Arc::new(DocumentStore::new(store));
    let services = GatewayServices::new(docs, &test_auth_config(), transfer).unwrap();
    let base_url = spawn_router(gateway_router(&services, 64 * 1024 * 1024)).await;

    TestGateway {
        base_url,
        tokens: Arc::clone(&services.tokens),
        services,
    }
}

impl TestGateway {
    /// Registers a fresh account and returns its tokens
    pub async fn register(&self) -> AuthResponseDto {
        self.services
            .auth
            .register(RegisterRequestDto {
                email: SafeEmail().fake(),
                password: "password123".to_string(),
                name: None,
            })
            .await
            .unwrap()
    }

    /// Registers `backend` for `user_id` under the given credential
    pub async fn add_provider(
        &self,
        user_id: &str,
        name: &str,
        backend: &TestProvider,
        token: &str,
    ) -> ProviderConfig {
        self.services
            .providers
            .add(
                user_id,
                CreateProviderDto {
                    name: name.to_string(),
                    worker_url: backend.base_url.clone(),
                    auth_token: token.to_string(),
                },
            )
            .await
            .unwrap()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
