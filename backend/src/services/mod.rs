//! Business logic services for the bar management backend

pub mod audit;
pub mod auth;
pub mod availability;
pub mod cocktail;
pub mod export;
pub mod ingredient;
pub mod restock;
pub mod settings;
pub mod stats;
pub mod stock;
pub mod user;

#[cfg(test)]
pub(crate) mod testing;

pub use audit::AuditService;
pub use auth::AuthService;
pub use availability::AvailabilityService;
pub use cocktail::CocktailService;
pub use export::ExportService;
pub use ingredient::IngredientService;
pub use restock::RestockService;
pub use settings::SettingsService;
pub use stats::StatsService;
pub use stock::StockService;
pub use user::UserService;
