//! Vaultic core: a gateway that replicates files across independently
//! operated storage providers, and the provider backend those providers run.
//!
//! The `vaultic-core` binary serves either role or both, selected by
//! `APP_ROLES`. [`features::auth::clients::SessionClient`] is the client side of the
//! gateway's token lifecycle.

pub mod core;
pub mod features;
pub mod modules;
pub mod shared;
