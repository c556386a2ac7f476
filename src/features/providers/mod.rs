//! Provider Registry.
//!
//! Each user's storage backends live on the user document and are referenced
//! by ID everywhere else. The [`clients::ProviderClient`] speaks the provider
//! HTTP contract on behalf of the registry and the transfer coordinators.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/providers` | List providers |
//! | POST | `/providers` | Register a provider |
//! | PUT | `/providers/{id}` | Partial update |
//! | DELETE | `/providers/{id}` | Remove and detach from the catalog |
//! | POST | `/providers/{id}/test` | Connectivity check |
//! | GET | `/providers/{id}/stats` | Usage on the provider |
//! | GET | `/providers/{id}/files?prefix=` | Raw provider listing |

pub mod clients;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use clients::ProviderClient;
pub use services::ProviderService;
