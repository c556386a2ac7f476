pub mod catalog_handler;

pub use catalog_handler::{
    __path_append_entry, __path_list_entries, __path_remove_entry, append_entry, list_entries,
    remove_entry,
};
