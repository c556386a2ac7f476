//! Accounts and the Token Service.
//!
//! Access tokens last one hour, refresh tokens fourteen days. Both are HS256
//! JWTs signed with `JWT_SECRET`; refresh tokens carry `type: "refresh"` and
//! are refused by [`crate::core::middleware::auth_middleware`].
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | POST | `/auth/register` | No | Create an account |
//! | POST | `/auth/login` | No | Email + password login |
//! | POST | `/auth/refresh` | No | Exchange a refresh token |
//! | POST | `/auth/logout` | No | Stateless logout |
//! | GET | `/auth/me` | Yes | Current user |

pub mod clients;
pub mod dtos;
pub mod handlers;
pub mod model;
pub mod routes;
pub mod services;

pub use services::{AuthService, PasswordHasher, TokenService};
