//! Domain models for the bar management application

mod audit;
mod cocktail;
mod cost;
mod description;
mod ingredient;
mod restock;
mod stock;
mod user;

pub use audit::*;
pub use cocktail::*;
pub use cost::*;
pub use description::*;
pub use ingredient::*;
pub use restock::*;
pub use stock::*;
pub use user::*;
