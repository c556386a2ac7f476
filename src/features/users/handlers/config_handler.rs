use axum::{extract::State, Json};
use std::sync::Arc;

use crate::core::error::Result;
use crate::core::extractor::ValidJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::users::dtos::{ConfigResponseDto, UpdateConfigDto, UpdateConfigResponseDto};
use crate::features::users::services::SettingsService;
use crate::shared::types::ErrorResponse;

/// Get the provider registry and settings
#[utoipa::path(
    get,
    path = "/config",
    responses(
        (status = 200, description = "Current configuration", body = ConfigResponseDto),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "config",
    security(("bearer_auth" = []))
)]
pub async fn get_config(
    user: AuthenticatedUser,
    State(service): State<Arc<SettingsService>>,
) -> Result<Json<ConfigResponseDto>> {
    Ok(Json(service.get(&user.user_id).await?))
}

/// Update configuration
///
/// `settings` is merged field by field; `providers`, when present, replaces
/// the whole registry.
#[utoipa::path(
    put,
    path = "/config",
    request_body = UpdateConfigDto,
    responses(
        (status = 200, description = "Configuration saved", body = UpdateConfigResponseDto),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "config",
    security(("bearer_auth" = []))
)]
pub async fn update_config(
    user: AuthenticatedUser,
    State(service): State<Arc<SettingsService>>,
    ValidJson(dto): ValidJson<UpdateConfigDto>,
) -> Result<Json<UpdateConfigResponseDto>> {
    Ok(Json(service.update(&user.user_id, dto).await?))
}
