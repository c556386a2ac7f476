mod settings_service;
mod user_service;

pub use settings_service::SettingsService;
pub use user_service::UserService;
