pub mod provider_handler;

pub use provider_handler::{
    __path_browse_provider, __path_create_provider, __path_delete_provider,
    __path_list_providers, __path_provider_stats, __path_test_provider, __path_update_provider,
    browse_provider, create_provider, delete_provider, list_providers, provider_stats,
    test_provider, update_provider,
};
