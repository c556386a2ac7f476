mod provider_service;

pub(crate) use provider_service::detach;
pub use provider_service::ProviderService;
