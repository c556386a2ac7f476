use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::providers::models::ProviderConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

/// Per-user preferences stored alongside the provider registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    #[serde(default)]
    pub default_upload_targets: Vec<String>,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default = "default_quota_alert_threshold")]
    pub quota_alert_threshold: u8,
}

fn default_quota_alert_threshold() -> u8 {
    80
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            default_upload_targets: Vec::new(),
            theme: Theme::default(),
            quota_alert_threshold: default_quota_alert_threshold(),
        }
    }
}

/// The user document: account, provider registry and settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub user_id: String,
    pub email: String,
    pub name: Option<String>,
    pub password_hash: String,
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
    #[serde(default)]
    pub settings: UserSettings,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserAccount {
    pub fn provider(&self, provider_id: &str) -> Option<&ProviderConfig> {
        self.providers.iter().find(|p| p.id == provider_id)
    }

    pub fn has_provider(&self, provider_id: &str) -> bool {
        self.provider(provider_id).is_some()
    }
}

/// Index document mapping a normalized email to its owner
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailIndex {
    pub user_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults_fill_missing_fields() {
        let settings: UserSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, UserSettings::default());
        assert_eq!(settings.theme, Theme::System);
        assert_eq!(settings.quota_alert_threshold, 80);

        let json = serde_json::to_value(UserSettings::default()).unwrap();
        assert_eq!(json["theme"], "system");
        assert_eq!(json["defaultUploadTargets"], serde_json::json!([]));
    }
}
