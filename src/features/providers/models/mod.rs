mod provider;

pub use provider::ProviderConfig;
