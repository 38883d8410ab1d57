//! Shared types and models for the bar management application
//!
//! Pure domain computations (stock ledger arithmetic, cocktail doability,
//! cost of goods, restock partitioning) shared between the backend and the
//! browser via WASM. Nothing in this crate performs I/O.

pub mod matching;
pub mod models;
pub mod types;
pub mod validation;

pub use matching::*;
pub use models::*;
pub use types::*;
pub use validation::*;
