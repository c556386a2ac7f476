//! Metadata Catalog.
//!
//! One document per user mapping each file key to the providers holding a
//! copy. Coordinators append on successful writes and remove on deletes.
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/files/metadata?prefix=` | List entries |
//! | POST | `/files/metadata` | Record a provider copy |
//! | DELETE | `/files/metadata?key=` | Remove an entry |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::CatalogService;
