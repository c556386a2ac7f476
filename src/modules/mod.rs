//! Modules layer - Infrastructure components for external integrations
//!
//! Contains the object store engines both service roles persist into.

pub mod storage;
