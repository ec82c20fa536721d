use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

use crate::domain::ligne::LigneDocument;

/// Statut d'un ordre de réparation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "VARCHAR", rename_all = "snake_case")]
pub enum StatutOdr {
    EnCours,
    Termine,
    Annule,
}

impl Default for StatutOdr {
    fn default() -> Self {
        StatutOdr::EnCours
    }
}

impl fmt::Display for StatutOdr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StatutOdr::EnCours => "EN_COURS",
            StatutOdr::Termine => "TERMINE",
            StatutOdr::Annule => "ANNULE",
        };
        write!(f, "{}", label)
    }
}

impl StatutOdr {
    /// Transitions autorisées depuis ce statut
    pub fn transitions_autorisees(&self) -> &'static [StatutOdr] {
        match self {
            StatutOdr::EnCours => &[StatutOdr::Termine, StatutOdr::Annule],
            StatutOdr::Termine | StatutOdr::Annule => &[],
        }
    }

    pub fn peut_passer_a(&self, vers: StatutOdr) -> bool {
        self.transitions_autorisees().contains(&vers)
    }

    pub fn est_terminal(&self) -> bool {
        self.transitions_autorisees().is_empty()
    }
}

/// Un ordre de réparation (travaux en cours sur un véhicule)
///
/// Même forme qu'un devis, mais les lignes deviennent immuables une fois
/// l'ordre terminé ou annulé.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrdreReparation {
    pub id: Uuid,
    /// Numéro attribué à la création (ODR-2024-012), jamais modifié
    pub numero: String,
    pub client_id: Uuid,
    pub vehicule_id: Uuid,
    /// Devis accepté dont l'ordre est issu, si conversion
    pub devis_id: Option<Uuid>,
    /// Lignes ordonnées de l'ordre (colonne JSONB)
    pub lignes: Json<Vec<LigneDocument>>,
    pub statut: StatutOdr,
    /// Montant total TTC, recalculé à chaque modification des lignes
    /// et figé au passage à TERMINE
    pub montant_total: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Données requises pour créer un ordre de réparation
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewOrdreReparation {
    pub client_id: Uuid,
    pub vehicule_id: Uuid,
    pub devis_id: Option<Uuid>,
    pub lignes: Vec<LigneDocument>,
}

impl OrdreReparation {
    /// Crée un ordre en cours avec son montant déjà calculé
    pub fn new(
        numero: String,
        data: NewOrdreReparation,
        montant_total: Decimal,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            numero,
            client_id: data.client_id,
            vehicule_id: data.vehicule_id,
            devis_id: data.devis_id,
            lignes: Json(data.lignes),
            statut: StatutOdr::EnCours,
            montant_total,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_transitions_odr() {
        assert!(StatutOdr::EnCours.peut_passer_a(StatutOdr::Termine));
        assert!(StatutOdr::EnCours.peut_passer_a(StatutOdr::Annule));
        assert!(!StatutOdr::Termine.peut_passer_a(StatutOdr::EnCours));
        assert!(StatutOdr::Termine.est_terminal());
        assert!(StatutOdr::Annule.est_terminal());
    }
}
