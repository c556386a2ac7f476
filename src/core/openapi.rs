use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth;
use crate::features::catalog::{
    dtos as catalog_dtos, handlers as catalog_handlers, models as catalog_models,
};
use crate::features::providers::{
    dtos as providers_dtos, handlers as providers_handlers, models as providers_models,
};
use crate::features::storage::{dtos as storage_dtos, handlers as storage_handlers};
use crate::features::transfers::{
    dtos as transfers_dtos, handlers as transfers_handlers, models as transfers_models,
};
use crate::features::users::{dtos as users_dtos, handlers as users_handlers, models as users_models};
use crate::shared::types::{ErrorResponse, SuccessResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handlers::register,
        auth::handlers::login,
        auth::handlers::refresh_token,
        auth::handlers::logout,
        auth::handlers::get_me,
        // Config
        users_handlers::get_config,
        users_handlers::update_config,
        // Providers
        providers_handlers::list_providers,
        providers_handlers::create_provider,
        providers_handlers::update_provider,
        providers_handlers::delete_provider,
        providers_handlers::test_provider,
        providers_handlers::provider_stats,
        providers_handlers::browse_provider,
        // Catalog
        catalog_handlers::list_entries,
        catalog_handlers::append_entry,
        catalog_handlers::remove_entry,
        // Transfers
        transfers_handlers::upload_files,
        transfers_handlers::download_file,
        transfers_handlers::download_archive,
        transfers_handlers::delete_files,
        transfers_handlers::share_file,
        // Tasks
        transfers_handlers::list_upload_tasks,
        transfers_handlers::remove_upload_task,
        transfers_handlers::clear_upload_tasks,
        transfers_handlers::list_download_tasks,
        transfers_handlers::remove_download_task,
        transfers_handlers::clear_download_tasks,
        // Provider backend
        storage_handlers::list_files,
        storage_handlers::upload_file,
        storage_handlers::download_file,
        storage_handlers::delete_file,
        storage_handlers::get_stats,
        storage_handlers::create_share,
        storage_handlers::access_share,
    ),
    components(
        schemas(
            // Shared
            ErrorResponse,
            SuccessResponse,
            // Auth
            auth::model::AuthenticatedUser,
            auth::dtos::RegisterRequestDto,
            auth::dtos::LoginRequestDto,
            auth::dtos::RefreshTokenRequestDto,
            auth::dtos::RefreshTokenResponseDto,
            auth::dtos::AuthResponseDto,
            auth::dtos::AuthUserDto,
            // Config
            users_models::Theme,
            users_models::UserSettings,
            users_dtos::ConfigResponseDto,
            users_dtos::SettingsPatchDto,
            users_dtos::UpdateConfigDto,
            users_dtos::UpdateConfigResponseDto,
            // Providers
            providers_models::ProviderConfig,
            providers_dtos::CreateProviderDto,
            providers_dtos::UpdateProviderDto,
            providers_dtos::ProviderListResponseDto,
            providers_dtos::ProviderResponseDto,
            providers_dtos::ConnectionTestResponseDto,
            // Catalog
            catalog_models::CatalogEntry,
            catalog_dtos::CatalogListResponseDto,
            catalog_dtos::AppendCatalogEntryDto,
            catalog_dtos::CatalogEntryResponseDto,
            // Transfers
            transfers_models::ProviderFailure,
            transfers_models::ReplicationReport,
            transfers_models::KeyDeletion,
            transfers_models::DeletionReport,
            transfers_models::SkippedFile,
            transfers_models::UploadStatus,
            transfers_models::DownloadStatus,
            transfers_models::UploadTask,
            transfers_models::DownloadTask,
            transfers_dtos::TransferUploadFormDto,
            transfers_dtos::TransferUploadResponseDto,
            transfers_dtos::ArchiveRequestDto,
            transfers_dtos::DeleteFilesDto,
            transfers_dtos::ShareFileDto,
            transfers_dtos::UploadTaskListDto,
            transfers_dtos::DownloadTaskListDto,
            transfers_dtos::ClearTasksResponseDto,
            // Provider backend
            storage_dtos::FileEntryDto,
            storage_dtos::FileListResponseDto,
            storage_dtos::UploadFormDto,
            storage_dtos::UploadResponseDto,
            storage_dtos::StorageStatsDto,
            storage_dtos::CreateShareRequestDto,
            storage_dtos::ShareLinkDto,
        )
    ),
    tags(
        (name = "auth", description = "Registration, login and token refresh"),
        (name = "config", description = "Per-user providers and settings"),
        (name = "providers", description = "Provider Registry"),
        (name = "catalog", description = "Metadata Catalog"),
        (name = "transfers", description = "Replicated upload, retrieval, archive and deletion"),
        (name = "tasks", description = "Upload and download task stores"),
        (name = "storage", description = "Provider backend file API"),
        (name = "shares", description = "Public share-link downloads"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Vaultic API",
        version = "0.1.0",
        description = "API documentation for Vaultic",
    )
)]
pub struct ApiDoc;

/// Adds the gateway JWT and provider credential security schemes
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            components.add_security_scheme(
                "provider_auth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
