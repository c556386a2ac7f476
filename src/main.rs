use axum::{middleware::from_fn, Router};
use socket2::{Domain, Protocol, Socket, TcpKeepalive, Type};
use std::sync::Arc;
use std::time::Duration;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use vaultic_core::core::config::{Config, ObjectStoreBackend, ObjectStoreConfig};
use vaultic_core::core::middleware;
use vaultic_core::core::openapi::{ApiDoc, SwaggerInfoModifier};
use vaultic_core::core::router::{gateway_router, storage_router, GatewayServices};
use vaultic_core::modules::storage::{DocumentStore, MemoryObjectStore, MinIOClient, ObjectStore};

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    // Log system info
    let available_cpus = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);
    tracing::info!(
        "System info: available_cpus={}, tokio_worker_threads={}, pid={}",
        available_cpus,
        worker_threads,
        std::process::id()
    );

    tracing::info!(
        "Configuration loaded successfully (gateway: {}, storage: {})",
        config.app.roles.gateway,
        config.app.roles.storage
    );

    let mut api_routes = Router::new();

    if config.app.roles.gateway {
        let store =
            object_store(&config.object_store, &config.object_store.minio.config_bucket).await?;
        let docs = Arc::new(DocumentStore::new(store));
        let services = GatewayServices::new(docs, &config.auth, &config.transfer)
            .map_err(|e| anyhow::anyhow!("Failed to initialize gateway: {}", e))?;

        api_routes = api_routes.merge(gateway_router(
            &services,
            config.app.max_request_body_size,
        ));
        tracing::info!("Gateway routes enabled");
    }

    if config.app.roles.storage {
        let credential = config
            .storage
            .auth_token
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("STORAGE_AUTH_TOKEN is required for the storage role"))?;
        let store =
            object_store(&config.object_store, &config.object_store.minio.storage_bucket).await?;

        api_routes = api_routes.merge(storage_router(
            store,
            &config.storage,
            credential,
            &config.app.public_base_url,
            config.app.max_request_body_size,
        ));
        tracing::info!(
            "Storage routes enabled (share links under {}/s/)",
            config.app.public_base_url
        );
    }

    // Build application router with dynamic swagger config
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    // Build swagger router
    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    // Simple health check endpoint (no auth required)
    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    let app = Router::new()
        .merge(swagger)
        .merge(api_routes)
        .merge(health_route)
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    let addr = config.app.server_address();
    let listener = bind_listener(&addr)?;
    tracing::info!("Server listening on {}", format!("http://{}", addr));
    tracing::info!(
        "Swagger UI available at {}",
        format!("http://{}/swagger-ui/", addr)
    );

    axum::serve(listener, app).await?;

    Ok(())
}

/// TCP listener tuned for long-lived transfer connections
fn bind_listener(addr: &str) -> anyhow::Result<tokio::net::TcpListener> {
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address {}: {}", addr, e))?;

    let socket = Socket::new(
        Domain::for_address(socket_addr),
        Type::STREAM,
        Some(Protocol::TCP),
    )?;
    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;

    let buffer_size = 1024 * 1024;
    socket.set_recv_buffer_size(buffer_size)?;
    socket.set_send_buffer_size(buffer_size)?;

    let keepalive = TcpKeepalive::new().with_time(Duration::from_secs(60));
    #[cfg(target_os = "linux")]
    let keepalive = keepalive
        .with_interval(Duration::from_secs(10))
        .with_retries(3);
    socket.set_tcp_keepalive(&keepalive)?;

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    Ok(tokio::net::TcpListener::from_std(socket.into())?)
}

/// Opens the object store a role persists into
async fn object_store(
    config: &ObjectStoreConfig,
    bucket: &str,
) -> anyhow::Result<Arc<dyn ObjectStore>> {
    match config.backend {
        ObjectStoreBackend::Memory => {
            tracing::warn!(
                "Using in-memory object store for '{}'; data is lost on restart",
                bucket
            );
            Ok(Arc::new(MemoryObjectStore::new()))
        }
        ObjectStoreBackend::MinIO => {
            let client = MinIOClient::new(&config.minio, bucket)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to initialize MinIO client: {}", e))?;
            // Ensure bucket exists (create if not)
            client
                .ensure_bucket_exists()
                .await
                .map_err(|e| anyhow::anyhow!("Failed to ensure MinIO bucket exists: {}", e))?;
            tracing::info!("MinIO client initialized for bucket: {}", client.bucket_name());
            Ok(Arc::new(client))
        }
    }
}
