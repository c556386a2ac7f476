use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub auth: AuthConfig,
    pub swagger: SwaggerConfig,
    pub object_store: ObjectStoreConfig,
    pub storage: StorageConfig,
    pub transfer: TransferConfig,
}

/// Which route groups this process serves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceRoles {
    pub gateway: bool,
    pub storage: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_request_body_size: usize,
    /// Base URL used when building public share links
    pub public_base_url: String,
    pub roles: ServiceRoles,
}

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    pub password_hash_iterations: u32,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectStoreBackend {
    Memory,
    MinIO,
}

#[derive(Debug, Clone)]
pub struct ObjectStoreConfig {
    pub backend: ObjectStoreBackend,
    pub minio: MinIOConfig,
}

/// MinIO/S3 connection settings shared by both buckets
#[derive(Debug, Clone)]
pub struct MinIOConfig {
    /// MinIO/S3 endpoint URL
    pub endpoint: String,
    /// Access key for authentication
    pub access_key: String,
    /// Secret key for authentication
    pub secret_key: String,
    /// AWS region (for S3 compatibility)
    pub region: String,
    /// Bucket holding user documents and catalogs (gateway role)
    pub config_bucket: String,
    /// Bucket holding file objects and share records (storage role)
    pub storage_bucket: String,
}

/// Settings for the provider backend role
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Bearer credential every authenticated provider call must present
    pub auth_token: Option<String>,
    pub quota_bytes: u64,
    pub default_share_ttl: Duration,
}

/// Settings for the replication, retrieval and archive coordinators
#[derive(Debug, Clone)]
pub struct TransferConfig {
    /// Upper bound on simultaneous provider calls within one fan-out
    pub max_provider_concurrency: usize,
    /// Files of one batch replicated at the same time (1 keeps batches sequential)
    pub file_parallelism: usize,
    pub provider_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        let app = AppConfig::from_env()?;
        let auth = AuthConfig::from_env(app.roles)?;
        let storage = StorageConfig::from_env(app.roles)?;

        Ok(Config {
            app,
            auth,
            swagger: SwaggerConfig::from_env()?,
            object_store: ObjectStoreConfig::from_env()?,
            storage,
            transfer: TransferConfig::from_env()?,
        })
    }
}

impl ServiceRoles {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let mut roles = Self {
            gateway: false,
            storage: false,
        };

        for role in raw.split(',').map(|s| s.trim()).filter(|s| !s.is_empty()) {
            match role.to_lowercase().as_str() {
                "gateway" => roles.gateway = true,
                "storage" => roles.storage = true,
                other => return Err(format!("Unknown role in APP_ROLES: {}", other)),
            }
        }

        if !roles.gateway && !roles.storage {
            return Err("APP_ROLES must enable at least one of: gateway, storage".to_string());
        }

        Ok(roles)
    }
}

impl AppConfig {
    const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 100 * 1024 * 1024; // 100MB

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_request_body_size = env::var("MAX_REQUEST_BODY_SIZE")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_REQUEST_BODY_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| "MAX_REQUEST_BODY_SIZE must be a valid number".to_string())?;

        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://{}:{}", host, port))
            .trim_end_matches('/')
            .to_string();

        let roles = ServiceRoles::parse(
            &env::var("APP_ROLES").unwrap_or_else(|_| "gateway,storage".to_string()),
        )?;

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            max_request_body_size,
            public_base_url,
            roles,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl AuthConfig {
    const DEFAULT_ACCESS_TOKEN_TTL_SECS: u64 = 3600; // 1 hour
    const DEFAULT_REFRESH_TOKEN_TTL_SECS: u64 = 14 * 24 * 3600; // 14 days
    const DEFAULT_PASSWORD_HASH_ITERATIONS: u32 = 100_000;

    pub fn from_env(roles: ServiceRoles) -> Result<Self, String> {
        let jwt_secret = match env::var("JWT_SECRET").ok().filter(|s| !s.is_empty()) {
            Some(secret) => secret,
            None if roles.gateway => {
                return Err("JWT_SECRET environment variable is required".to_string())
            }
            None => String::new(),
        };

        let access_token_ttl_secs = env::var("ACCESS_TOKEN_TTL_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_ACCESS_TOKEN_TTL_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "ACCESS_TOKEN_TTL_SECS must be a valid number".to_string())?;

        let refresh_token_ttl_secs = env::var("REFRESH_TOKEN_TTL_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_REFRESH_TOKEN_TTL_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "REFRESH_TOKEN_TTL_SECS must be a valid number".to_string())?;

        let password_hash_iterations = env::var("PASSWORD_HASH_ITERATIONS")
            .unwrap_or_else(|_| Self::DEFAULT_PASSWORD_HASH_ITERATIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "PASSWORD_HASH_ITERATIONS must be a valid number".to_string())?;

        if password_hash_iterations == 0 {
            return Err("PASSWORD_HASH_ITERATIONS must be greater than zero".to_string());
        }

        Ok(Self {
            jwt_secret,
            access_token_ttl: Duration::from_secs(access_token_ttl_secs),
            refresh_token_ttl: Duration::from_secs(refresh_token_ttl_secs),
            password_hash_iterations,
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Vaultic API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "Multi-provider file replication API".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

impl ObjectStoreConfig {
    pub fn from_env() -> Result<Self, String> {
        let backend = match env::var("OBJECT_STORE_BACKEND")
            .unwrap_or_else(|_| "minio".to_string())
            .to_lowercase()
            .as_str()
        {
            "memory" => ObjectStoreBackend::Memory,
            "minio" | "s3" => ObjectStoreBackend::MinIO,
            other => {
                return Err(format!(
                    "OBJECT_STORE_BACKEND must be 'memory' or 'minio', got '{}'",
                    other
                ))
            }
        };

        Ok(Self {
            backend,
            minio: MinIOConfig::from_env()?,
        })
    }
}

impl MinIOConfig {
    pub fn from_env() -> Result<Self, String> {
        let endpoint =
            env::var("MINIO_ENDPOINT").unwrap_or_else(|_| "http://localhost:9000".to_string());

        let access_key = env::var("MINIO_ACCESS_KEY").unwrap_or_else(|_| "minioadmin".to_string());

        let secret_key = env::var("MINIO_SECRET_KEY").unwrap_or_else(|_| "minioadmin".to_string());

        let region = env::var("MINIO_REGION").unwrap_or_else(|_| "us-east-1".to_string());

        let config_bucket =
            env::var("MINIO_CONFIG_BUCKET").unwrap_or_else(|_| "vaultic-config".to_string());

        let storage_bucket =
            env::var("MINIO_STORAGE_BUCKET").unwrap_or_else(|_| "vaultic-storage".to_string());

        Ok(Self {
            endpoint,
            access_key,
            secret_key,
            region,
            config_bucket,
            storage_bucket,
        })
    }
}

impl StorageConfig {
    const DEFAULT_QUOTA_BYTES: u64 = 10 * 1024 * 1024 * 1024; // 10GB
    const DEFAULT_SHARE_TTL_SECS: u64 = 7 * 24 * 3600; // 7 days

    pub fn from_env(roles: ServiceRoles) -> Result<Self, String> {
        let auth_token = env::var("STORAGE_AUTH_TOKEN").ok().filter(|s| !s.is_empty());
        if roles.storage && auth_token.is_none() {
            return Err("STORAGE_AUTH_TOKEN environment variable is required".to_string());
        }

        let quota_bytes = env::var("STORAGE_QUOTA_BYTES")
            .unwrap_or_else(|_| Self::DEFAULT_QUOTA_BYTES.to_string())
            .parse::<u64>()
            .map_err(|_| "STORAGE_QUOTA_BYTES must be a valid number".to_string())?;

        let share_ttl_secs = env::var("SHARE_DEFAULT_TTL_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_SHARE_TTL_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "SHARE_DEFAULT_TTL_SECS must be a valid number".to_string())?;

        Ok(Self {
            auth_token,
            quota_bytes,
            default_share_ttl: Duration::from_secs(share_ttl_secs),
        })
    }
}

impl TransferConfig {
    const DEFAULT_MAX_PROVIDER_CONCURRENCY: usize = 4;
    const DEFAULT_FILE_PARALLELISM: usize = 1;
    const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 300; // 5 minutes

    pub fn from_env() -> Result<Self, String> {
        let max_provider_concurrency = env::var("TRANSFER_MAX_PROVIDER_CONCURRENCY")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_PROVIDER_CONCURRENCY.to_string())
            .parse::<usize>()
            .map_err(|_| "TRANSFER_MAX_PROVIDER_CONCURRENCY must be a valid number".to_string())?;

        let file_parallelism = env::var("TRANSFER_FILE_PARALLELISM")
            .unwrap_or_else(|_| Self::DEFAULT_FILE_PARALLELISM.to_string())
            .parse::<usize>()
            .map_err(|_| "TRANSFER_FILE_PARALLELISM must be a valid number".to_string())?;

        let provider_timeout_secs = env::var("TRANSFER_PROVIDER_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_PROVIDER_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "TRANSFER_PROVIDER_TIMEOUT_SECS must be a valid number".to_string())?;

        if max_provider_concurrency == 0 || file_parallelism == 0 {
            return Err(
                "TRANSFER_MAX_PROVIDER_CONCURRENCY and TRANSFER_FILE_PARALLELISM must be at least 1"
                    .to_string(),
            );
        }

        Ok(Self {
            max_provider_concurrency,
            file_parallelism,
            provider_timeout: Duration::from_secs(provider_timeout_secs),
        })
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            max_provider_concurrency: Self::DEFAULT_MAX_PROVIDER_CONCURRENCY,
            file_parallelism: Self::DEFAULT_FILE_PARALLELISM,
            provider_timeout: Duration::from_secs(Self::DEFAULT_PROVIDER_TIMEOUT_SECS),
        }
    }
}
