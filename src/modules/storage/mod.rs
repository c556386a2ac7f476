//! Storage module
//!
//! The object store contract, its MinIO/S3 and in-memory engines, and a
//! JSON document layer on top of them.

mod document_store;
mod memory_store;
mod minio_client;
mod object_store;

pub use document_store::DocumentStore;
pub use memory_store::MemoryObjectStore;
pub use minio_client::MinIOClient;
pub use object_store::{ObjectStore, StoredObject};
#[cfg(test)]
pub use object_store::{ObjectListing, ObjectMeta};
