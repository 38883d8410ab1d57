//! Request middleware and extractors

pub mod auth;
pub mod client;

pub use auth::{auth_middleware, require_admin, AuthUser, CurrentUser};
pub use client::ClientInfo;
