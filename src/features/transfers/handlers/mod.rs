pub mod file_handler;
pub mod task_handler;
pub mod transfer_handler;

pub use file_handler::{__path_delete_files, __path_share_file, delete_files, share_file};
pub use task_handler::{
    __path_clear_download_tasks, __path_clear_upload_tasks, __path_list_download_tasks,
    __path_list_upload_tasks, __path_remove_download_task, __path_remove_upload_task,
    clear_download_tasks, clear_upload_tasks, list_download_tasks, list_upload_tasks,
    remove_download_task, remove_upload_task,
};
pub use transfer_handler::{
    __path_download_archive, __path_download_file, __path_upload_files, download_archive,
    download_file, upload_files,
};
