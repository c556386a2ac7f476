//! User documents and per-user configuration.
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/config` | Providers and settings |
//! | PUT | `/config` | Merge settings, optionally replace providers |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::{SettingsService, UserService};
