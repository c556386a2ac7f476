/// Content type used when a part or object carries none
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Prefix under which provider backends keep share records
pub const SHARE_RECORD_PREFIX: &str = "_shares/";

/// Size of the chunks an upload body is split into for progress reporting
pub const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Compression level applied to archives
pub const ARCHIVE_COMPRESSION_LEVEL: i64 = 6;

/// Default file name for generated archives
pub const DEFAULT_ARCHIVE_NAME: &str = "download.zip";
