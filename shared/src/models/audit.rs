//! Audit trail models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Administrative action recorded in the audit trail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "audit_action", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    UserCreated,
    UserUpdated,
    UserDeleted,
    IngredientCreated,
    IngredientUpdated,
    IngredientDeleted,
    CocktailCreated,
    CocktailUpdated,
    CocktailDeleted,
    StockCreated,
    StockUpdated,
    StockDeleted,
    StockMovement,
    BarAvailabilityUpdated,
    RestockScheduled,
    RestockCompleted,
    RestockDeleted,
    SettingsUpdated,
    LoginSuccess,
    LoginFailed,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::UserCreated => "user_created",
            AuditAction::UserUpdated => "user_updated",
            AuditAction::UserDeleted => "user_deleted",
            AuditAction::IngredientCreated => "ingredient_created",
            AuditAction::IngredientUpdated => "ingredient_updated",
            AuditAction::IngredientDeleted => "ingredient_deleted",
            AuditAction::CocktailCreated => "cocktail_created",
            AuditAction::CocktailUpdated => "cocktail_updated",
            AuditAction::CocktailDeleted => "cocktail_deleted",
            AuditAction::StockCreated => "stock_created",
            AuditAction::StockUpdated => "stock_updated",
            AuditAction::StockDeleted => "stock_deleted",
            AuditAction::StockMovement => "stock_movement",
            AuditAction::BarAvailabilityUpdated => "bar_availability_updated",
            AuditAction::RestockScheduled => "restock_scheduled",
            AuditAction::RestockCompleted => "restock_completed",
            AuditAction::RestockDeleted => "restock_deleted",
            AuditAction::SettingsUpdated => "settings_updated",
            AuditAction::LoginSuccess => "login_success",
            AuditAction::LoginFailed => "login_failed",
        }
    }

    /// French label shown in the back office
    pub fn label_fr(&self) -> &'static str {
        match self {
            AuditAction::UserCreated => "Utilisateur créé",
            AuditAction::UserUpdated => "Utilisateur modifié",
            AuditAction::UserDeleted => "Utilisateur supprimé",
            AuditAction::IngredientCreated => "Ingrédient créé",
            AuditAction::IngredientUpdated => "Ingrédient modifié",
            AuditAction::IngredientDeleted => "Ingrédient supprimé",
            AuditAction::CocktailCreated => "Cocktail créé",
            AuditAction::CocktailUpdated => "Cocktail modifié",
            AuditAction::CocktailDeleted => "Cocktail supprimé",
            AuditAction::StockCreated => "Stock créé",
            AuditAction::StockUpdated => "Stock modifié",
            AuditAction::StockDeleted => "Stock supprimé",
            AuditAction::StockMovement => "Mouvement de stock",
            AuditAction::BarAvailabilityUpdated => "Disponibilité bar",
            AuditAction::RestockScheduled => "Réapprovisionnement planifié",
            AuditAction::RestockCompleted => "Réapprovisionnement terminé",
            AuditAction::RestockDeleted => "Réapprovisionnement supprimé",
            AuditAction::SettingsUpdated => "Paramètres modifiés",
            AuditAction::LoginSuccess => "Connexion réussie",
            AuditAction::LoginFailed => "Connexion échouée",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted audit entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub user_email: Option<String>,
    pub user_name: Option<String>,
    pub action: AuditAction,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub entity_name: Option<String>,
    pub details: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}
