pub mod config_handler;

pub use config_handler::{__path_get_config, __path_update_config, get_config, update_config};
