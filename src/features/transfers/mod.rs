//! Transfer coordinators and their task stores.
//!
//! Replication fans one upload out to several providers and reconciles the
//! catalog from the settled outcomes. Retrieval reads from a single provider
//! holding a copy. Deletion is best-effort across holders. Archives bundle
//! retrievals into one zip.
//!
//! Upload and download tasks are process-local and scoped to their owner.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/transfers/upload` | Replicate files (multipart) |
//! | GET | `/transfers/download?key=&provider=` | Fetch one file |
//! | POST | `/transfers/archive` | Fetch several files as a zip |
//! | DELETE | `/files` | Delete files everywhere |
//! | POST | `/files/share` | Share link on a holding provider |
//! | GET | `/tasks/uploads` | Upload tasks |
//! | DELETE | `/tasks/uploads/{id}` | Remove an upload task |
//! | POST | `/tasks/uploads/clear` | Remove completed upload tasks |
//! | GET | `/tasks/downloads` | Download tasks |
//! | DELETE | `/tasks/downloads/{id}` | Remove a download task |
//! | POST | `/tasks/downloads/clear` | Remove finished download tasks |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use routes::TransferServices;
