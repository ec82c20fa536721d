// utils/error.rs
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error;
use validator::ValidationErrors;

/// Type de résultat standard pour l'application
pub type AppResult<T> = Result<T, AppError>;

/// Erreurs principales de l'application
#[derive(Error, Debug)]
pub enum AppError {
    // Erreurs de données
    #[error("Validation error: {0}")]
    Validation(String),

    /// Ressource non trouvée (404 Not Found)
    #[error("{0} not found")]
    NotFound(String),

    /// Doublon métier, ex. email client déjà utilisé (409 Conflict)
    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// Suppression refusée car des enregistrements dépendants existent
    #[error("Referential integrity: {0}")]
    ReferentialIntegrity(String),

    // Erreurs du cycle de vie des documents
    #[error("Invalid transition from {de} to {vers}")]
    InvalidTransition { de: String, vers: String },

    #[error("Payment info incomplete: mode de paiement et date de règlement requis")]
    IncompletePaymentInfo,

    #[error("Document is immutable in its current status")]
    ImmutableDocument,

    /// Tentatives de numérotation épuisées sur conflit d'unicité
    #[error("Numbering conflict: {0}")]
    NumberingConflict(String),

    // Erreurs d'infrastructure
    #[error("Database error: {0}")]
    Database(SqlxError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Convertit l'erreur en code HTTP approprié
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::ReferentialIntegrity(_)
            | AppError::InvalidTransition { .. }
            | AppError::IncompletePaymentInfo
            | AppError::ImmutableDocument => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Duplicate(_) => StatusCode::CONFLICT,
            AppError::NumberingConflict(_)
            | AppError::Database(_)
            | AppError::Configuration(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Code court stable pour les clients de l'API
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Duplicate(_) => "DUPLICATE",
            AppError::ReferentialIntegrity(_) => "REFERENTIAL_INTEGRITY",
            AppError::InvalidTransition { .. } => "INVALID_TRANSITION",
            AppError::IncompletePaymentInfo => "INCOMPLETE_PAYMENT_INFO",
            AppError::ImmutableDocument => "IMMUTABLE_DOCUMENT",
            AppError::NumberingConflict(_) => "NUMBERING_CONFLICT",
            AppError::Database(_) | AppError::Configuration(_) | AppError::Internal(_) => {
                "INTERNAL_ERROR"
            }
        }
    }
}

/// Structure de réponse d'erreur standardisée
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status_code()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        // Les détails internes ne sortent jamais vers le client
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "erreur interne");
            "Une erreur interne est survenue".to_string()
        } else {
            self.to_string()
        };

        HttpResponse::build(status).json(ErrorBody {
            error: message,
            code: self.error_code(),
        })
    }
}

impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        match &err {
            SqlxError::RowNotFound => AppError::NotFound("Resource".to_string()),
            SqlxError::Database(db_err) => {
                // 23505 = violation de contrainte d'unicité PostgreSQL
                if db_err.code().map(|code| code == "23505").unwrap_or(false) {
                    AppError::Duplicate("contrainte d'unicité violée".to_string())
                } else {
                    AppError::Database(err)
                }
            }
            _ => AppError::Database(err),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let messages: Vec<String> = errors
            .field_errors()
            .iter()
            .map(|(field, field_errors)| {
                let details: Vec<String> = field_errors
                    .iter()
                    .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                    .collect();
                format!("{}: {}", field, details.join(", "))
            })
            .collect();

        AppError::Validation(messages.join("; "))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("serialization: {}", err))
    }
}

// Helpers pour créer les erreurs courantes
pub fn not_found<T: Into<String>>(resource: T) -> AppError {
    AppError::NotFound(resource.into())
}

pub fn duplicate<T: Into<String>>(message: T) -> AppError {
    AppError::Duplicate(message.into())
}

pub fn validation<T: Into<String>>(message: T) -> AppError {
    AppError::Validation(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::NotFound("Client".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Duplicate("email".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::IncompletePaymentInfo.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NumberingConflict("FAC".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_invalid_transition_message() {
        let err = AppError::InvalidTransition {
            de: "PAYEE".into(),
            vers: "EN_ATTENTE".into(),
        };
        assert!(err.to_string().contains("PAYEE"));
        assert!(err.to_string().contains("EN_ATTENTE"));
        assert_eq!(err.error_code(), "INVALID_TRANSITION");
    }
}
