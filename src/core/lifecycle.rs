//! Machine à états des documents commerciaux
//!
//! Centralise les transitions de statut des devis, ordres de réparation
//! et factures. Les tables de transitions sont portées par les enums de
//! statut (`domain`), les règles d'accompagnement (informations de
//! règlement, recalcul des montants, immutabilité) vivent ici. Toutes les
//! fonctions sont pures : elles rendent une copie mise à jour du document
//! et laissent l'original intact, la persistance restant à la charge de
//! l'appelant.

use chrono::Utc;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::core::totals::compute_totals;
use crate::domain::devis::{Devis, StatutDevis};
use crate::domain::facture::{Facture, Reglement, StatutFacture};
use crate::domain::ordre_reparation::{OrdreReparation, StatutOdr};
use crate::utils::error::AppError;

/// Violations de la machine à états
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// Le statut cible n'est pas atteignable depuis le statut courant
    #[error("Transition invalide de {de} vers {vers}")]
    InvalidTransition { de: String, vers: String },

    /// Passage en statut payé sans mode de paiement ou date de règlement
    #[error("Informations de règlement incomplètes")]
    IncompletePaymentInfo,

    /// Modification d'un document figé par son statut
    #[error("Document non modifiable dans son statut courant")]
    ImmutableDocument,
}

impl From<TransitionError> for AppError {
    fn from(error: TransitionError) -> Self {
        match error {
            TransitionError::InvalidTransition { de, vers } => {
                AppError::InvalidTransition { de, vers }
            }
            TransitionError::IncompletePaymentInfo => AppError::IncompletePaymentInfo,
            TransitionError::ImmutableDocument => AppError::ImmutableDocument,
        }
    }
}

fn invalid<D: std::fmt::Display>(de: D, vers: D) -> TransitionError {
    TransitionError::InvalidTransition {
        de: de.to_string(),
        vers: vers.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Devis
// ---------------------------------------------------------------------------

/// Fait passer un devis vers un nouveau statut
pub fn transition_devis(devis: &Devis, vers: StatutDevis) -> Result<Devis, TransitionError> {
    if !devis.statut.peut_passer_a(vers) {
        return Err(invalid(devis.statut, vers));
    }

    let mut updated = devis.clone();
    updated.statut = vers;
    updated.updated_at = Utc::now();
    Ok(updated)
}

/// Un devis n'est convertible en ordre de réparation que s'il est accepté
pub fn can_convert_to_odr(devis: &Devis) -> bool {
    devis.statut == StatutDevis::Accepte
}

/// Les lignes d'un devis arrivé en statut terminal sont figées
pub fn ensure_devis_modifiable(devis: &Devis) -> Result<(), TransitionError> {
    if devis.statut.est_terminal() {
        return Err(TransitionError::ImmutableDocument);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Ordre de réparation
// ---------------------------------------------------------------------------

/// Fait passer un ordre de réparation vers un nouveau statut
///
/// Le passage à TERMINE fige le montant total en le recalculant depuis
/// les lignes courantes.
pub fn transition_odr(
    odr: &OrdreReparation,
    vers: StatutOdr,
    taux_tva: Decimal,
) -> Result<OrdreReparation, TransitionError> {
    if !odr.statut.peut_passer_a(vers) {
        return Err(invalid(odr.statut, vers));
    }

    let mut updated = odr.clone();
    updated.statut = vers;
    if vers == StatutOdr::Termine {
        updated.montant_total = compute_totals(&odr.lignes, taux_tva).total_ttc;
    }
    updated.updated_at = Utc::now();
    Ok(updated)
}

/// Les lignes d'un ordre terminé ou annulé sont figées
pub fn ensure_odr_modifiable(odr: &OrdreReparation) -> Result<(), TransitionError> {
    if odr.statut != StatutOdr::EnCours {
        return Err(TransitionError::ImmutableDocument);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Facture
// ---------------------------------------------------------------------------

/// Fait passer une facture vers un nouveau statut de paiement
///
/// L'entrée en PAYEE ou PARTIELLEMENT_PAYEE exige un règlement complet
/// fourni atomiquement avec la transition. Le retour en EN_ATTENTE ou le
/// passage en IMPAYEE efface toute information de règlement antérieure :
/// un retour en arrière ne laisse jamais de métadonnées de paiement
/// périmées.
pub fn transition_facture(
    facture: &Facture,
    vers: StatutFacture,
    reglement: Option<Reglement>,
) -> Result<Facture, TransitionError> {
    if !facture.statut.peut_passer_a(vers) {
        return Err(invalid(facture.statut, vers));
    }

    let mut updated = facture.clone();
    updated.statut = vers;

    if vers.exige_reglement() {
        let reglement = reglement.ok_or(TransitionError::IncompletePaymentInfo)?;
        updated.mode_paiement = Some(reglement.mode_paiement);
        updated.date_reglement = Some(reglement.date_reglement);
    } else if vers.efface_reglement() {
        updated.mode_paiement = None;
        updated.date_reglement = None;
    }

    updated.updated_at = Utc::now();
    Ok(updated)
}

/// Extourne : annulation d'une facture déjà payée
///
/// Transition distincte de la table normale, à auditer par l'appelant
/// (acteur + motif). Les informations de règlement sont conservées sur la
/// facture annulée pour garder la trace du paiement extourné.
pub fn annuler_facture_payee(facture: &Facture) -> Result<Facture, TransitionError> {
    if facture.statut != StatutFacture::Payee {
        return Err(invalid(facture.statut, StatutFacture::Annulee));
    }

    let mut updated = facture.clone();
    updated.statut = StatutFacture::Annulee;
    updated.updated_at = Utc::now();
    Ok(updated)
}

/// Les lignes d'une facture ne sont modifiables qu'en attente de paiement
pub fn ensure_facture_modifiable(facture: &Facture) -> Result<(), TransitionError> {
    if facture.statut != StatutFacture::EnAttente {
        return Err(TransitionError::ImmutableDocument);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use uuid::Uuid;

    use crate::domain::facture::ModePaiement;
    use crate::domain::ligne::LigneDocument;

    fn taux() -> Decimal {
        Decimal::new(20, 2)
    }

    fn lignes_test() -> Vec<LigneDocument> {
        vec![
            LigneDocument {
                designation: "Remplacement pare-chocs".to_string(),
                prix_unitaire_ttc: Decimal::new(10000, 2),
                quantite: 1,
                prestation_id: None,
            },
            LigneDocument {
                designation: "Peinture".to_string(),
                prix_unitaire_ttc: Decimal::new(5000, 2),
                quantite: 2,
                prestation_id: None,
            },
        ]
    }

    fn devis_en(statut: StatutDevis) -> Devis {
        let mut devis = Devis::new(
            "DEV-2024-001".to_string(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            lignes_test(),
            (
                Decimal::new(16667, 2),
                Decimal::new(3333, 2),
                Decimal::new(20000, 2),
            ),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        );
        devis.statut = statut;
        devis
    }

    fn odr_en(statut: StatutOdr) -> OrdreReparation {
        let mut odr = OrdreReparation::new(
            "ODR-2024-001".to_string(),
            crate::domain::ordre_reparation::NewOrdreReparation {
                client_id: Uuid::new_v4(),
                vehicule_id: Uuid::new_v4(),
                devis_id: None,
                lignes: lignes_test(),
            },
            Decimal::new(20000, 2),
        );
        odr.statut = statut;
        odr
    }

    fn facture_en(statut: StatutFacture) -> Facture {
        let mut facture = Facture::new(
            "FAC-2024-001".to_string(),
            Uuid::new_v4(),
            None,
            lignes_test(),
            (
                Decimal::new(16667, 2),
                Decimal::new(3333, 2),
                Decimal::new(20000, 2),
            ),
            NaiveDate::from_ymd_opt(2024, 11, 30).unwrap(),
        );
        facture.statut = statut;
        facture
    }

    fn reglement() -> Reglement {
        Reglement {
            mode_paiement: ModePaiement::Virement,
            date_reglement: NaiveDate::from_ymd_opt(2024, 11, 15).unwrap(),
        }
    }

    const STATUTS_DEVIS: [StatutDevis; 5] = [
        StatutDevis::Brouillon,
        StatutDevis::Envoye,
        StatutDevis::Accepte,
        StatutDevis::Refuse,
        StatutDevis::Expire,
    ];

    const STATUTS_FACTURE: [StatutFacture; 5] = [
        StatutFacture::EnAttente,
        StatutFacture::PartiellementPayee,
        StatutFacture::Payee,
        StatutFacture::Impayee,
        StatutFacture::Annulee,
    ];

    #[test]
    fn test_devis_toute_paire_hors_table_rejetee() {
        for de in STATUTS_DEVIS {
            for vers in STATUTS_DEVIS {
                let devis = devis_en(de);
                let resultat = transition_devis(&devis, vers);
                if de.peut_passer_a(vers) {
                    assert_eq!(resultat.unwrap().statut, vers);
                } else {
                    assert_eq!(resultat.unwrap_err(), invalid(de, vers));
                    // Le document d'origine n'a pas bougé
                    assert_eq!(devis.statut, de);
                }
            }
        }
    }

    #[test]
    fn test_devis_cycle_nominal() {
        let devis = devis_en(StatutDevis::Brouillon);
        let envoye = transition_devis(&devis, StatutDevis::Envoye).unwrap();
        let accepte = transition_devis(&envoye, StatutDevis::Accepte).unwrap();
        assert!(can_convert_to_odr(&accepte));
        assert!(!can_convert_to_odr(&envoye));
        assert!(!can_convert_to_odr(&devis));
    }

    #[test]
    fn test_devis_terminal_immuable() {
        assert!(ensure_devis_modifiable(&devis_en(StatutDevis::Brouillon)).is_ok());
        assert!(ensure_devis_modifiable(&devis_en(StatutDevis::Envoye)).is_ok());
        for statut in [StatutDevis::Accepte, StatutDevis::Refuse, StatutDevis::Expire] {
            assert_eq!(
                ensure_devis_modifiable(&devis_en(statut)).unwrap_err(),
                TransitionError::ImmutableDocument
            );
        }
    }

    #[test]
    fn test_odr_termine_recalcule_montant() {
        let mut odr = odr_en(StatutOdr::EnCours);
        // Montant volontairement faux : TERMINE doit le recalculer
        odr.montant_total = Decimal::ZERO;

        let termine = transition_odr(&odr, StatutOdr::Termine, taux()).unwrap();
        assert_eq!(termine.montant_total, Decimal::new(20000, 2));
    }

    #[test]
    fn test_odr_transitions_invalides() {
        for de in [StatutOdr::Termine, StatutOdr::Annule] {
            for vers in [StatutOdr::EnCours, StatutOdr::Termine, StatutOdr::Annule] {
                let odr = odr_en(de);
                assert!(transition_odr(&odr, vers, taux()).is_err());
            }
        }
        assert_eq!(
            ensure_odr_modifiable(&odr_en(StatutOdr::Termine)).unwrap_err(),
            TransitionError::ImmutableDocument
        );
    }

    #[test]
    fn test_facture_toute_paire_hors_table_rejetee() {
        for de in STATUTS_FACTURE {
            for vers in STATUTS_FACTURE {
                let facture = facture_en(de);
                let resultat = transition_facture(&facture, vers, Some(reglement()));
                if de.peut_passer_a(vers) {
                    assert_eq!(resultat.unwrap().statut, vers);
                } else {
                    assert_eq!(resultat.unwrap_err(), invalid(de, vers));
                    assert_eq!(facture.statut, de);
                }
            }
        }
    }

    #[test]
    fn test_paiement_exige_reglement_complet() {
        let facture = facture_en(StatutFacture::EnAttente);

        for vers in [StatutFacture::Payee, StatutFacture::PartiellementPayee] {
            assert_eq!(
                transition_facture(&facture, vers, None).unwrap_err(),
                TransitionError::IncompletePaymentInfo
            );

            let payee = transition_facture(&facture, vers, Some(reglement())).unwrap();
            assert_eq!(payee.mode_paiement, Some(ModePaiement::Virement));
            assert_eq!(
                payee.date_reglement,
                Some(NaiveDate::from_ymd_opt(2024, 11, 15).unwrap())
            );
        }
    }

    #[test]
    fn test_retour_arriere_efface_reglement() {
        let facture = facture_en(StatutFacture::EnAttente);
        let partielle =
            transition_facture(&facture, StatutFacture::PartiellementPayee, Some(reglement()))
                .unwrap();
        assert!(partielle.mode_paiement.is_some());

        for vers in [StatutFacture::Impayee, StatutFacture::EnAttente] {
            let retour = transition_facture(&partielle, vers, None).unwrap();
            assert_eq!(retour.mode_paiement, None);
            assert_eq!(retour.date_reglement, None);
        }
    }

    #[test]
    fn test_annulation_depuis_tout_statut_non_paye() {
        for de in [
            StatutFacture::EnAttente,
            StatutFacture::PartiellementPayee,
            StatutFacture::Impayee,
        ] {
            let facture = facture_en(de);
            let annulee = transition_facture(&facture, StatutFacture::Annulee, None).unwrap();
            assert_eq!(annulee.statut, StatutFacture::Annulee);
        }
    }

    #[test]
    fn test_extourne_facture_payee() {
        // La table normale refuse PAYEE -> ANNULEE
        let payee = transition_facture(
            &facture_en(StatutFacture::EnAttente),
            StatutFacture::Payee,
            Some(reglement()),
        )
        .unwrap();
        assert!(transition_facture(&payee, StatutFacture::Annulee, None).is_err());

        // Seule l'extourne explicite y parvient, en conservant le règlement
        let annulee = annuler_facture_payee(&payee).unwrap();
        assert_eq!(annulee.statut, StatutFacture::Annulee);
        assert_eq!(annulee.mode_paiement, Some(ModePaiement::Virement));

        // L'extourne ne s'applique qu'aux factures payées
        assert!(annuler_facture_payee(&facture_en(StatutFacture::EnAttente)).is_err());
        assert!(annuler_facture_payee(&facture_en(StatutFacture::Impayee)).is_err());
    }

    #[test]
    fn test_facture_modifiable_seulement_en_attente() {
        assert!(ensure_facture_modifiable(&facture_en(StatutFacture::EnAttente)).is_ok());
        for statut in [
            StatutFacture::PartiellementPayee,
            StatutFacture::Payee,
            StatutFacture::Impayee,
            StatutFacture::Annulee,
        ] {
            assert_eq!(
                ensure_facture_modifiable(&facture_en(statut)).unwrap_err(),
                TransitionError::ImmutableDocument
            );
        }
    }

    #[test]
    fn test_lignes_conservees_par_les_transitions() {
        let devis = devis_en(StatutDevis::Brouillon);
        let envoye = transition_devis(&devis, StatutDevis::Envoye).unwrap();
        assert_eq!(envoye.lignes.0, lignes_test());
        assert_eq!(envoye.total_ttc, devis.total_ttc);
    }
}
