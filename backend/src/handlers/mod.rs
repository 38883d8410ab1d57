//! HTTP handlers

pub mod admin;
pub mod auth;
pub mod availability;
pub mod cocktail;
pub mod health;
pub mod ingredient;
pub mod restock;
pub mod stock;
pub mod user;

pub use admin::*;
pub use auth::*;
pub use availability::*;
pub use cocktail::*;
pub use health::*;
pub use ingredient::*;
pub use restock::*;
pub use stock::*;
pub use user::*;
