use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::providers::models::ProviderConfig;
use crate::features::users::models::{Theme, UserSettings};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConfigResponseDto {
    pub providers: Vec<ProviderConfig>,
    pub settings: UserSettings,
}

/// Field-wise settings merge; absent fields keep their value
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatchDto {
    pub default_upload_targets: Option<Vec<String>>,
    pub theme: Option<Theme>,
    #[validate(range(min = 1, max = 100, message = "Quota alert threshold must be 1-100"))]
    pub quota_alert_threshold: Option<u8>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateConfigDto {
    /// Replaces the whole provider registry when present
    pub providers: Option<Vec<ProviderConfig>>,
    #[validate(nested)]
    pub settings: Option<SettingsPatchDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateConfigResponseDto {
    pub success: bool,
    pub updated_at: DateTime<Utc>,
}
