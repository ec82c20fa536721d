use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// Famille de service du catalogue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "VARCHAR", rename_all = "snake_case")]
pub enum TypeService {
    Carrosserie,
    Mecanique,
}

impl fmt::Display for TypeService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeService::Carrosserie => write!(f, "CARROSSERIE"),
            TypeService::Mecanique => write!(f, "MECANIQUE"),
        }
    }
}

/// Prestation du catalogue de services
///
/// Une prestation référencée par une ligne de devis, d'ODR ou de facture
/// ne peut plus être supprimée (contrôle référentiel côté service).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Prestation {
    pub id: Uuid,
    pub nom: String,
    pub description: Option<String>,
    pub type_service: TypeService,
    /// Prix de base TTC proposé lors de l'ajout en ligne de document
    pub prix_base_ttc: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Données requises pour créer une prestation
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewPrestation {
    pub nom: String,
    pub description: Option<String>,
    pub type_service: TypeService,
    pub prix_base_ttc: Decimal,
}

impl Prestation {
    pub fn new(data: NewPrestation) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            nom: data.nom,
            description: data.description,
            type_service: data.type_service,
            prix_base_ttc: data.prix_base_ttc,
            created_at: now,
            updated_at: now,
        }
    }
}
