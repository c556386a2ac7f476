pub mod share_handler;
pub mod storage_handler;

pub use share_handler::{__path_access_share, access_share};
pub use storage_handler::{
    __path_create_share, __path_delete_file, __path_download_file, __path_get_stats,
    __path_list_files, __path_upload_file, create_share, delete_file, download_file, get_stats,
    list_files, upload_file,
};
