//! Provider backend.
//!
//! Serves one object store over the provider HTTP contract and issues share
//! links against it.
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/files?prefix=` | One-level listing |
//! | POST | `/api/upload` | Multipart upload (`file`, `path`) |
//! | GET | `/api/download?key=` | Raw bytes |
//! | DELETE | `/api/files?key=` | Delete an object |
//! | GET | `/api/stats` | Usage statistics |
//! | POST | `/api/share` | Create a share link |
//! | GET | `/s/{shareId}?password=` | Public share download |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::{ShareService, StorageService};
