use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

use crate::domain::ligne::LigneDocument;

/// Statut de paiement d'une facture
///
/// `EN_ATTENTE` est l'état initial. `ANNULEE` est accessible depuis tout
/// état non payé ; l'annulation d'une facture `PAYEE` passe par une
/// opération d'extourne distincte et auditée, jamais par la table normale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "VARCHAR", rename_all = "snake_case")]
pub enum StatutFacture {
    EnAttente,
    PartiellementPayee,
    Payee,
    Impayee,
    Annulee,
}

impl Default for StatutFacture {
    fn default() -> Self {
        StatutFacture::EnAttente
    }
}

impl fmt::Display for StatutFacture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StatutFacture::EnAttente => "EN_ATTENTE",
            StatutFacture::PartiellementPayee => "PARTIELLEMENT_PAYEE",
            StatutFacture::Payee => "PAYEE",
            StatutFacture::Impayee => "IMPAYEE",
            StatutFacture::Annulee => "ANNULEE",
        };
        write!(f, "{}", label)
    }
}

impl StatutFacture {
    /// Transitions autorisées depuis ce statut
    pub fn transitions_autorisees(&self) -> &'static [StatutFacture] {
        match self {
            StatutFacture::EnAttente => &[
                StatutFacture::PartiellementPayee,
                StatutFacture::Payee,
                StatutFacture::Impayee,
                StatutFacture::Annulee,
            ],
            StatutFacture::PartiellementPayee => &[
                StatutFacture::Payee,
                StatutFacture::Impayee,
                StatutFacture::EnAttente,
                StatutFacture::Annulee,
            ],
            StatutFacture::Impayee => &[
                StatutFacture::PartiellementPayee,
                StatutFacture::Payee,
                StatutFacture::EnAttente,
                StatutFacture::Annulee,
            ],
            StatutFacture::Payee | StatutFacture::Annulee => &[],
        }
    }

    pub fn peut_passer_a(&self, vers: StatutFacture) -> bool {
        self.transitions_autorisees().contains(&vers)
    }

    pub fn est_terminal(&self) -> bool {
        self.transitions_autorisees().is_empty()
    }

    /// Statuts qui exigent mode de paiement et date de règlement
    pub fn exige_reglement(&self) -> bool {
        matches!(self, StatutFacture::Payee | StatutFacture::PartiellementPayee)
    }

    /// Statuts qui effacent toute information de règlement antérieure
    pub fn efface_reglement(&self) -> bool {
        matches!(self, StatutFacture::EnAttente | StatutFacture::Impayee)
    }
}

/// Mode de paiement accepté par l'atelier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "VARCHAR", rename_all = "snake_case")]
pub enum ModePaiement {
    Especes,
    Cheque,
    Virement,
    TpeVivawallet,
    CreditInterne,
    Mixte,
}

impl fmt::Display for ModePaiement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ModePaiement::Especes => "ESPECES",
            ModePaiement::Cheque => "CHEQUE",
            ModePaiement::Virement => "VIREMENT",
            ModePaiement::TpeVivawallet => "TPE_VIVAWALLET",
            ModePaiement::CreditInterne => "CREDIT_INTERNE",
            ModePaiement::Mixte => "MIXTE",
        };
        write!(f, "{}", label)
    }
}

/// Informations de règlement fournies avec un passage en statut payé
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reglement {
    pub mode_paiement: ModePaiement,
    pub date_reglement: NaiveDate,
}

/// Une facture émise pour un client, éventuellement issue d'un ODR
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Facture {
    pub id: Uuid,
    /// Numéro attribué à la création (FAC-2024-007), jamais modifié
    pub numero: String,
    pub client_id: Uuid,
    /// Ordre de réparation facturé, si applicable
    pub odr_id: Option<Uuid>,
    /// Lignes ordonnées de la facture (colonne JSONB)
    pub lignes: Json<Vec<LigneDocument>>,
    pub statut: StatutFacture,
    /// Montant hors taxes, recalculé à chaque modification des lignes
    pub montant_ht: Decimal,
    /// Montant de TVA, dérivé par soustraction (montant_ttc - montant_ht)
    pub montant_tva: Decimal,
    /// Montant toutes taxes comprises
    pub montant_ttc: Decimal,
    /// Renseigné uniquement quand le statut porte un paiement
    pub mode_paiement: Option<ModePaiement>,
    /// Renseignée uniquement quand le statut porte un paiement
    pub date_reglement: Option<NaiveDate>,
    /// Date limite de paiement
    pub date_echeance: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Données requises pour créer une facture
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewFacture {
    pub client_id: Uuid,
    pub odr_id: Option<Uuid>,
    pub lignes: Vec<LigneDocument>,
    /// Absente, la date d'échéance est déduite de la configuration
    pub date_echeance: Option<NaiveDate>,
}

impl Facture {
    /// Crée une facture en attente de paiement avec ses montants calculés
    pub fn new(
        numero: String,
        client_id: Uuid,
        odr_id: Option<Uuid>,
        lignes: Vec<LigneDocument>,
        totaux: (Decimal, Decimal, Decimal),
        date_echeance: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        let (montant_ht, montant_tva, montant_ttc) = totaux;

        Self {
            id: Uuid::new_v4(),
            numero,
            client_id,
            odr_id,
            lignes: Json(lignes),
            statut: StatutFacture::EnAttente,
            montant_ht,
            montant_tva,
            montant_ttc,
            mode_paiement: None,
            date_reglement: None,
            date_echeance,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_transitions_facture() {
        assert!(StatutFacture::EnAttente.peut_passer_a(StatutFacture::Payee));
        assert!(StatutFacture::Impayee.peut_passer_a(StatutFacture::EnAttente));
        assert!(StatutFacture::PartiellementPayee.peut_passer_a(StatutFacture::Payee));
        // PAYEE n'est jamais quittée par la table normale
        assert!(!StatutFacture::Payee.peut_passer_a(StatutFacture::Annulee));
        assert!(StatutFacture::Payee.est_terminal());
        assert!(StatutFacture::Annulee.est_terminal());
    }

    #[test]
    fn test_statuts_payants() {
        assert!(StatutFacture::Payee.exige_reglement());
        assert!(StatutFacture::PartiellementPayee.exige_reglement());
        assert!(!StatutFacture::Impayee.exige_reglement());
        assert!(StatutFacture::EnAttente.efface_reglement());
        assert!(StatutFacture::Impayee.efface_reglement());
        assert!(!StatutFacture::Annulee.efface_reglement());
    }
}
