mod share_service;
mod storage_service;

pub use share_service::ShareService;
pub use storage_service::StorageService;
