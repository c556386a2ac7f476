use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::features::providers::models::ProviderConfig;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProviderDto {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(url(message = "Invalid worker URL"))]
    pub worker_url: String,

    #[validate(length(min = 1, message = "Auth token is required"))]
    pub auth_token: String,
}

/// Partial update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProviderDto {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(url(message = "Invalid worker URL"))]
    pub worker_url: Option<String>,

    #[validate(length(min = 1, message = "Auth token must not be empty"))]
    pub auth_token: Option<String>,

    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProviderListResponseDto {
    pub providers: Vec<ProviderConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProviderResponseDto {
    pub success: bool,
    pub provider: ProviderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConnectionTestResponseDto {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct BrowseQuery {
    pub prefix: Option<String>,
}
