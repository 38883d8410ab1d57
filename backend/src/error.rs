//! Error handling for the bar management server
//!
//! Provides consistent error responses in English and French

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::{CostError, LedgerError, ValidationFailure};
use thiserror::Error;

/// Postgres SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";
/// Postgres SQLSTATE for foreign_key_violation
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String, message_fr: String },

    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_fr: String,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Conflict: {message}")]
    Conflict {
        resource: String,
        message: String,
        message_fr: String,
    },

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Ledger errors
    #[error("Insufficient stock: requested {requested} {unit}, available {available} {unit}")]
    InsufficientStock {
        requested: Decimal,
        available: Decimal,
        unit: String,
    },

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(sqlx::Error),

    #[error("Export error: {0}")]
    Export(String),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(field: &str, message: &str, message_fr: &str) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: message.to_string(),
            message_fr: message_fr.to_string(),
        }
    }

    pub fn conflict(resource: &str, message: &str, message_fr: &str) -> Self {
        AppError::Conflict {
            resource: resource.to_string(),
            message: message.to_string(),
            message_fr: message_fr.to_string(),
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_fr: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorDetail {
    pub fn new(code: &str, message_en: impl Into<String>, message_fr: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message_en: message_en.into(),
            message_fr: message_fr.into(),
            field: None,
            details: None,
        }
    }

    fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new(
                    "INVALID_CREDENTIALS",
                    "Invalid email or password",
                    "Email ou mot de passe incorrect",
                ),
            ),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new("INVALID_TOKEN", "Invalid token", "Jeton invalide"),
            ),
            AppError::InsufficientPermissions => (
                StatusCode::FORBIDDEN,
                ErrorDetail::new(
                    "INSUFFICIENT_PERMISSIONS",
                    "You do not have permission to perform this action",
                    "Vous n'avez pas les droits pour effectuer cette action",
                ),
            ),
            AppError::Unauthorized { message, message_fr } => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new("UNAUTHORIZED", message.clone(), message_fr.clone()),
            ),
            AppError::Validation {
                field,
                message,
                message_fr,
            } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new("VALIDATION_ERROR", message.clone(), message_fr.clone())
                    .with_field(field.clone()),
            ),
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new(
                    "VALIDATION_ERROR",
                    msg.clone(),
                    format!("Données invalides : {}", msg),
                ),
            ),
            AppError::Conflict {
                resource,
                message,
                message_fr,
            } => (
                StatusCode::CONFLICT,
                ErrorDetail::new("CONFLICT", message.clone(), message_fr.clone())
                    .with_field(resource.clone()),
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail::new(
                    "NOT_FOUND",
                    format!("{} not found", resource),
                    format!("{} introuvable", resource),
                ),
            ),
            AppError::InsufficientStock {
                requested,
                available,
                unit,
            } => {
                let mut detail = ErrorDetail::new(
                    "INSUFFICIENT_STOCK",
                    format!(
                        "Insufficient stock: requested {} {}, available {} {}",
                        requested, unit, available, unit
                    ),
                    format!(
                        "Stock insuffisant : demandé {} {}, disponible {} {}",
                        requested, unit, available, unit
                    ),
                )
                .with_field("quantity");
                detail.details = Some(serde_json::json!({
                    "requested": requested,
                    "available": available,
                    "unit": unit,
                }));
                (StatusCode::BAD_REQUEST, detail)
            }
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new(
                    "DATABASE_ERROR",
                    "A database error occurred",
                    "Une erreur de base de données est survenue",
                ),
            ),
            AppError::Export(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new(
                    "EXPORT_ERROR",
                    "The export could not be generated",
                    "L'export n'a pas pu être généré",
                ),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new(
                    "INTERNAL_ERROR",
                    msg.clone(),
                    "Erreur interne du serveur",
                ),
            ),
        };

        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.code().as_deref() {
                Some(UNIQUE_VIOLATION) => {
                    return AppError::conflict(
                        db_err.constraint().unwrap_or("record"),
                        "A record with the same value already exists",
                        "Un enregistrement avec cette valeur existe déjà",
                    );
                }
                Some(FOREIGN_KEY_VIOLATION) => {
                    return AppError::conflict(
                        db_err.constraint().unwrap_or("record"),
                        "The record is still referenced elsewhere",
                        "L'enregistrement est encore référencé ailleurs",
                    );
                }
                _ => {}
            }
        }
        AppError::DatabaseError(err)
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::NonPositiveQuantity(_) => AppError::validation(
                "quantity",
                "Quantity must be greater than zero",
                "La quantité doit être supérieure à zéro",
            ),
            LedgerError::InsufficientStock {
                requested,
                available,
                unit,
            } => AppError::InsufficientStock {
                requested,
                available,
                unit,
            },
            LedgerError::UnitMismatch { stock, movement } => AppError::Validation {
                field: "unit".to_string(),
                message: format!("Unit {} does not match stock unit {}", movement, stock),
                message_fr: format!(
                    "L'unité {} ne correspond pas à l'unité du stock {}",
                    movement, stock
                ),
            },
            LedgerError::UnknownMovementType(kind) => AppError::Validation {
                field: "type".to_string(),
                message: format!("Unknown movement type: {}", kind),
                message_fr: format!("Type de mouvement inconnu : {}", kind),
            },
            LedgerError::TooPrecise(quantity) => AppError::Validation {
                field: "quantity".to_string(),
                message: format!("Quantity {} has more than 3 decimal places", quantity),
                message_fr: format!("La quantité {} a plus de 3 décimales", quantity),
            },
            LedgerError::OutOfRange(quantity) => AppError::Validation {
                field: "quantity".to_string(),
                message: format!("Quantity {} is out of range", quantity),
                message_fr: format!("La quantité {} est hors limites", quantity),
            },
        }
    }
}

impl From<CostError> for AppError {
    fn from(err: CostError) -> Self {
        let field = match err {
            CostError::PriceOverflow(_) => "margin",
            CostError::LineOverflow(_) | CostError::TotalOverflow => "ingredients",
        };
        AppError::Validation {
            field: field.to_string(),
            message: err.to_string(),
            message_fr: format!("Coût hors limites : {}", err),
        }
    }
}

impl From<ValidationFailure> for AppError {
    fn from(failure: ValidationFailure) -> Self {
        AppError::Validation {
            field: failure.field.to_string(),
            message: format!("{} {}", failure.field, failure.message),
            message_fr: format!("Valeur invalide pour {}", failure.field),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field_errors = errors.field_errors();
        let mut fields: Vec<&str> = field_errors.keys().copied().collect();
        fields.sort_unstable();
        match fields.first() {
            Some(field) => AppError::Validation {
                field: field.to_string(),
                message: format!("{} is invalid", field),
                message_fr: format!("Valeur invalide pour {}", field),
            },
            None => AppError::ValidationError(errors.to_string()),
        }
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_ledger_range_errors_are_bad_requests() {
        for err in [
            LedgerError::TooPrecise(dec!(0.0005)),
            LedgerError::OutOfRange(Decimal::MAX),
        ] {
            let response = AppError::from(err).into_response();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn test_cost_overflow_is_a_bad_request() {
        let app_err = AppError::from(CostError::PriceOverflow(dec!(1000)));
        assert!(matches!(&app_err, AppError::Validation { field, .. } if field == "margin"));
        assert_eq!(app_err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
