use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

use crate::domain::ligne::LigneDocument;

/// Statut d'un devis
///
/// `BROUILLON → ENVOYE → {ACCEPTE, REFUSE, EXPIRE}` ; les trois états
/// d'arrivée sont terminaux.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "VARCHAR", rename_all = "snake_case")]
pub enum StatutDevis {
    Brouillon,
    Envoye,
    Accepte,
    Refuse,
    Expire,
}

impl Default for StatutDevis {
    fn default() -> Self {
        StatutDevis::Brouillon
    }
}

impl fmt::Display for StatutDevis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StatutDevis::Brouillon => "BROUILLON",
            StatutDevis::Envoye => "ENVOYE",
            StatutDevis::Accepte => "ACCEPTE",
            StatutDevis::Refuse => "REFUSE",
            StatutDevis::Expire => "EXPIRE",
        };
        write!(f, "{}", label)
    }
}

impl StatutDevis {
    /// Transitions autorisées depuis ce statut
    pub fn transitions_autorisees(&self) -> &'static [StatutDevis] {
        match self {
            StatutDevis::Brouillon => &[StatutDevis::Envoye],
            StatutDevis::Envoye => &[StatutDevis::Accepte, StatutDevis::Refuse, StatutDevis::Expire],
            StatutDevis::Accepte | StatutDevis::Refuse | StatutDevis::Expire => &[],
        }
    }

    pub fn peut_passer_a(&self, vers: StatutDevis) -> bool {
        self.transitions_autorisees().contains(&vers)
    }

    pub fn est_terminal(&self) -> bool {
        self.transitions_autorisees().is_empty()
    }
}

/// Un devis émis pour un client et un véhicule
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Devis {
    pub id: Uuid,
    /// Numéro attribué à la création (DEV-2024-003), jamais modifié
    pub numero: String,
    pub client_id: Uuid,
    pub vehicule_id: Uuid,
    /// Lignes ordonnées du devis (colonne JSONB)
    pub lignes: Json<Vec<LigneDocument>>,
    pub statut: StatutDevis,
    /// Total hors taxes, recalculé à chaque modification des lignes
    pub total_ht: Decimal,
    /// Montant de TVA, dérivé par soustraction (total_ttc - total_ht)
    pub montant_tva: Decimal,
    /// Total toutes taxes comprises
    pub total_ttc: Decimal,
    /// Date limite de validité de l'offre
    pub date_validite: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Données requises pour créer un devis
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewDevis {
    pub client_id: Uuid,
    pub vehicule_id: Uuid,
    pub lignes: Vec<LigneDocument>,
    /// Absente, la date de validité est déduite de la configuration
    pub date_validite: Option<NaiveDate>,
}

impl Devis {
    /// Crée un devis en brouillon avec ses totaux déjà calculés
    pub fn new(
        numero: String,
        client_id: Uuid,
        vehicule_id: Uuid,
        lignes: Vec<LigneDocument>,
        totaux: (Decimal, Decimal, Decimal),
        date_validite: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        let (total_ht, montant_tva, total_ttc) = totaux;

        Self {
            id: Uuid::new_v4(),
            numero,
            client_id,
            vehicule_id,
            lignes: Json(lignes),
            statut: StatutDevis::Brouillon,
            total_ht,
            montant_tva,
            total_ttc,
            date_validite,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_transitions_devis() {
        assert!(StatutDevis::Brouillon.peut_passer_a(StatutDevis::Envoye));
        assert!(!StatutDevis::Brouillon.peut_passer_a(StatutDevis::Accepte));
        assert!(StatutDevis::Envoye.peut_passer_a(StatutDevis::Refuse));
        assert!(StatutDevis::Accepte.est_terminal());
        assert!(StatutDevis::Refuse.est_terminal());
        assert!(StatutDevis::Expire.est_terminal());
        assert!(!StatutDevis::Envoye.est_terminal());
    }
}
