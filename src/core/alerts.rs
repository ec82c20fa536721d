//! Alertes d'échéance de factures
//!
//! Classe les factures en deux paniers : échéance proche et retard de
//! paiement. L'évaluation est pure, l'appelant fournit les factures déjà
//! chargées et l'instant de référence, ce qui rend les tests
//! déterministes.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::facture::{Facture, StatutFacture};

/// Une facture signalée, avec son compte de jours
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlerteEcheance {
    pub facture_id: Uuid,
    pub numero: String,
    pub client_id: Uuid,
    pub montant_ttc: Decimal,
    pub date_echeance: NaiveDate,
    /// Positif ou nul avant l'échéance, négatif une fois dépassée
    /// (la valeur absolue donne le nombre de jours de retard)
    pub jours_restants: i64,
}

/// Résultat de l'évaluation, paniers triés par échéance croissante
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertesEcheances {
    /// Factures en attente dont l'échéance tombe dans la fenêtre d'alerte
    pub a_venir: Vec<AlerteEcheance>,
    /// Factures impayées dont l'échéance est dépassée
    pub en_retard: Vec<AlerteEcheance>,
}

fn alerte(facture: &Facture, jours_restants: i64) -> AlerteEcheance {
    AlerteEcheance {
        facture_id: facture.id,
        numero: facture.numero.clone(),
        client_id: facture.client_id,
        montant_ttc: facture.montant_ttc,
        date_echeance: facture.date_echeance,
        jours_restants,
    }
}

/// Évalue les alertes d'échéance sur un lot de factures
///
/// Seules les factures EN_ATTENTE alimentent le panier « à venir »
/// (échéance dans `[aujourd'hui, aujourd'hui + delai_alerte_jours]`
/// inclus) et seules les IMPAYEES alimentent le panier « en retard »
/// (échéance dépassée). Les factures payées ou annulées ne sont jamais
/// signalées, quelle que soit leur date.
pub fn evaluate_alerts(
    factures: &[Facture],
    now: DateTime<Utc>,
    delai_alerte_jours: i64,
) -> AlertesEcheances {
    let aujourdhui = now.date_naive();
    let mut alertes = AlertesEcheances::default();

    for facture in factures {
        let jours_restants = (facture.date_echeance - aujourdhui).num_days();

        match facture.statut {
            StatutFacture::EnAttente
                if (0..=delai_alerte_jours).contains(&jours_restants) =>
            {
                alertes.a_venir.push(alerte(facture, jours_restants));
            }
            StatutFacture::Impayee if jours_restants < 0 => {
                alertes.en_retard.push(alerte(facture, jours_restants));
            }
            _ => {}
        }
    }

    alertes.a_venir.sort_by_key(|a| a.date_echeance);
    alertes.en_retard.sort_by_key(|a| a.date_echeance);
    alertes
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    use crate::domain::ligne::LigneDocument;

    fn facture(statut: StatutFacture, date_echeance: NaiveDate) -> Facture {
        let lignes = vec![LigneDocument {
            designation: "Forfait révision".to_string(),
            prix_unitaire_ttc: Decimal::new(12000, 2),
            quantite: 1,
            prestation_id: None,
        }];
        let mut f = Facture::new(
            "FAC-2024-001".to_string(),
            Uuid::new_v4(),
            None,
            lignes,
            (
                Decimal::new(10000, 2),
                Decimal::new(2000, 2),
                Decimal::new(12000, 2),
            ),
            date_echeance,
        );
        f.statut = statut;
        f
    }

    fn now() -> DateTime<Utc> {
        "2024-11-15T10:30:00Z".parse().unwrap()
    }

    fn dans(jours: i64) -> NaiveDate {
        now().date_naive() + Duration::days(jours)
    }

    #[test]
    fn test_echeance_proche() {
        // Échéance a J+2, fenêtre de 3 jours
        let factures = vec![facture(StatutFacture::EnAttente, dans(2))];
        let alertes = evaluate_alerts(&factures, now(), 3);

        assert_eq!(alertes.a_venir.len(), 1);
        assert_eq!(alertes.a_venir[0].jours_restants, 2);
        assert!(alertes.en_retard.is_empty());
    }

    #[test]
    fn test_retard() {
        // Échéance a J-5, impayée
        let factures = vec![facture(StatutFacture::Impayee, dans(-5))];
        let alertes = evaluate_alerts(&factures, now(), 3);

        assert!(alertes.a_venir.is_empty());
        assert_eq!(alertes.en_retard.len(), 1);
        assert_eq!(alertes.en_retard[0].jours_restants, -5);
    }

    #[test]
    fn test_bornes_de_fenetre() {
        // Jour J et dernier jour de fenêtre inclus, au-delà exclu
        let factures = vec![
            facture(StatutFacture::EnAttente, dans(0)),
            facture(StatutFacture::EnAttente, dans(3)),
            facture(StatutFacture::EnAttente, dans(4)),
        ];
        let alertes = evaluate_alerts(&factures, now(), 3);

        let jours: Vec<i64> = alertes.a_venir.iter().map(|a| a.jours_restants).collect();
        assert_eq!(jours, vec![0, 3]);
    }

    #[test]
    fn test_statuts_exclus() {
        // Payée ou annulée : jamais signalée, même en retard ; une facture
        // en attente déjà échue ne bascule pas dans le panier retard
        let factures = vec![
            facture(StatutFacture::Payee, dans(-10)),
            facture(StatutFacture::Annulee, dans(1)),
            facture(StatutFacture::PartiellementPayee, dans(1)),
            facture(StatutFacture::EnAttente, dans(-2)),
            facture(StatutFacture::Impayee, dans(2)),
        ];
        let alertes = evaluate_alerts(&factures, now(), 3);

        assert!(alertes.a_venir.is_empty());
        assert!(alertes.en_retard.is_empty());
    }

    #[test]
    fn test_partition_exclusive() {
        // Aucune facture ne peut apparaître dans les deux paniers
        let mut factures = Vec::new();
        for delta in -6..=6 {
            factures.push(facture(StatutFacture::EnAttente, dans(delta)));
            factures.push(facture(StatutFacture::Impayee, dans(delta)));
        }
        let alertes = evaluate_alerts(&factures, now(), 3);

        let ids_a_venir: std::collections::HashSet<Uuid> =
            alertes.a_venir.iter().map(|a| a.facture_id).collect();
        for en_retard in &alertes.en_retard {
            assert!(!ids_a_venir.contains(&en_retard.facture_id));
        }
        // 0..=3 en attente d'un côté, -6..=-1 impayées de l'autre
        assert_eq!(alertes.a_venir.len(), 4);
        assert_eq!(alertes.en_retard.len(), 6);
    }

    #[test]
    fn test_tri_par_echeance() {
        let factures = vec![
            facture(StatutFacture::EnAttente, dans(3)),
            facture(StatutFacture::EnAttente, dans(1)),
            facture(StatutFacture::Impayee, dans(-1)),
            facture(StatutFacture::Impayee, dans(-4)),
        ];
        let alertes = evaluate_alerts(&factures, now(), 3);

        assert_eq!(alertes.a_venir[0].jours_restants, 1);
        assert_eq!(alertes.a_venir[1].jours_restants, 3);
        assert_eq!(alertes.en_retard[0].jours_restants, -4);
        assert_eq!(alertes.en_retard[1].jours_restants, -1);
    }
}
