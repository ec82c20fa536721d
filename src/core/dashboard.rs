//! Agrégation des indicateurs du tableau de bord
//!
//! Calcul pur sur des collections déjà chargées, sans cache : l'instantané
//! est recalculé à la demande depuis les données courantes.

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::client::{Client, TypeClient, Vehicule};
use crate::domain::facture::{Facture, StatutFacture};
use crate::domain::ordre_reparation::OrdreReparation;

/// Instantané des indicateurs d'activité de l'atelier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_clients: i64,
    /// Clients de type GRAND_COMPTE
    pub grands_comptes: i64,
    pub total_vehicules: i64,

    /// ODR créés aujourd'hui / ce mois-ci / cette année
    pub odr_jour: i64,
    pub odr_mois: i64,
    pub odr_annee: i64,

    /// Montant total TTC des ODR sur les mêmes fenêtres
    pub montant_jour: Decimal,
    pub montant_mois: Decimal,
    pub montant_annee: Decimal,

    /// Factures en attente de paiement
    pub factures_en_cours: i64,
    /// Factures signalées impayées
    pub factures_impayees: i64,
}

/// Calcule l'instantané des indicateurs relativement à `now`
pub fn aggregate(
    clients: &[Client],
    vehicules: &[Vehicule],
    odrs: &[OrdreReparation],
    factures: &[Facture],
    now: DateTime<Utc>,
) -> MetricsSnapshot {
    let aujourdhui = now.date_naive();

    let grands_comptes = clients
        .iter()
        .filter(|c| c.type_client == TypeClient::GrandCompte)
        .count() as i64;

    let mut odr_jour = 0;
    let mut odr_mois = 0;
    let mut odr_annee = 0;
    let mut montant_jour = Decimal::ZERO;
    let mut montant_mois = Decimal::ZERO;
    let mut montant_annee = Decimal::ZERO;

    for odr in odrs {
        let creation = odr.created_at.date_naive();
        if creation.year() != aujourdhui.year() {
            continue;
        }
        odr_annee += 1;
        montant_annee += odr.montant_total;

        if creation.month() == aujourdhui.month() {
            odr_mois += 1;
            montant_mois += odr.montant_total;

            if creation == aujourdhui {
                odr_jour += 1;
                montant_jour += odr.montant_total;
            }
        }
    }

    let factures_en_cours = factures
        .iter()
        .filter(|f| f.statut == StatutFacture::EnAttente)
        .count() as i64;
    let factures_impayees = factures
        .iter()
        .filter(|f| f.statut == StatutFacture::Impayee)
        .count() as i64;

    MetricsSnapshot {
        total_clients: clients.len() as i64,
        grands_comptes,
        total_vehicules: vehicules.len() as i64,
        odr_jour,
        odr_mois,
        odr_annee,
        montant_jour,
        montant_mois,
        montant_annee,
        factures_en_cours,
        factures_impayees,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use uuid::Uuid;

    use crate::domain::client::{NewClient, NewVehicule};
    use crate::domain::ligne::LigneDocument;
    use crate::domain::ordre_reparation::NewOrdreReparation;

    fn now() -> DateTime<Utc> {
        "2024-11-15T14:00:00Z".parse().unwrap()
    }

    fn client(type_client: TypeClient) -> Client {
        Client::new(
            "CLI-001".to_string(),
            NewClient {
                nom: "Durand".to_string(),
                prenom: None,
                email: "durand@example.com".to_string(),
                telephone: "0600000000".to_string(),
                adresse: None,
                type_client,
            },
        )
    }

    fn vehicule() -> Vehicule {
        Vehicule::new(NewVehicule {
            client_id: Uuid::new_v4(),
            immatriculation: "AB-123-CD".to_string(),
            marque: "Renault".to_string(),
            modele: "Clio".to_string(),
            annee: Some(2019),
            vin: None,
            kilometrage: Some(82000),
        })
    }

    fn odr_cree_le(date: &str, montant_centimes: i64) -> OrdreReparation {
        let mut odr = OrdreReparation::new(
            "ODR-2024-001".to_string(),
            NewOrdreReparation {
                client_id: Uuid::new_v4(),
                vehicule_id: Uuid::new_v4(),
                devis_id: None,
                lignes: Vec::new(),
            },
            Decimal::new(montant_centimes, 2),
        );
        odr.created_at = format!("{}T09:00:00Z", date).parse().unwrap();
        odr
    }

    fn facture_en(statut: StatutFacture) -> Facture {
        let mut f = Facture::new(
            "FAC-2024-001".to_string(),
            Uuid::new_v4(),
            None,
            vec![LigneDocument {
                designation: "Vidange".to_string(),
                prix_unitaire_ttc: Decimal::new(9000, 2),
                quantite: 1,
                prestation_id: None,
            }],
            (
                Decimal::new(7500, 2),
                Decimal::new(1500, 2),
                Decimal::new(9000, 2),
            ),
            NaiveDate::from_ymd_opt(2024, 12, 15).unwrap(),
        );
        f.statut = statut;
        f
    }

    #[test]
    fn test_compteurs_clients_et_vehicules() {
        let clients = vec![
            client(TypeClient::Normal),
            client(TypeClient::GrandCompte),
            client(TypeClient::GrandCompte),
        ];
        let vehicules = vec![vehicule(), vehicule()];

        let snapshot = aggregate(&clients, &vehicules, &[], &[], now());
        assert_eq!(snapshot.total_clients, 3);
        assert_eq!(snapshot.grands_comptes, 2);
        assert_eq!(snapshot.total_vehicules, 2);
    }

    #[test]
    fn test_fenetres_odr() {
        let odrs = vec![
            odr_cree_le("2024-11-15", 10000), // aujourd'hui
            odr_cree_le("2024-11-03", 20000), // ce mois-ci
            odr_cree_le("2024-02-20", 40000), // cette année
            odr_cree_le("2023-11-15", 80000), // année précédente, ignoré
        ];

        let snapshot = aggregate(&[], &[], &odrs, &[], now());
        assert_eq!(snapshot.odr_jour, 1);
        assert_eq!(snapshot.odr_mois, 2);
        assert_eq!(snapshot.odr_annee, 3);
        assert_eq!(snapshot.montant_jour, Decimal::new(10000, 2));
        assert_eq!(snapshot.montant_mois, Decimal::new(30000, 2));
        assert_eq!(snapshot.montant_annee, Decimal::new(70000, 2));
    }

    #[test]
    fn test_meme_mois_autre_annee_non_compte() {
        // Novembre 2023 ne doit alimenter ni le mois ni l'année courante
        let odrs = vec![odr_cree_le("2023-11-15", 10000)];
        let snapshot = aggregate(&[], &[], &odrs, &[], now());
        assert_eq!(snapshot.odr_mois, 0);
        assert_eq!(snapshot.odr_annee, 0);
    }

    #[test]
    fn test_compteurs_factures() {
        let factures = vec![
            facture_en(StatutFacture::EnAttente),
            facture_en(StatutFacture::EnAttente),
            facture_en(StatutFacture::Impayee),
            facture_en(StatutFacture::Payee),
            facture_en(StatutFacture::Annulee),
        ];

        let snapshot = aggregate(&[], &[], &[], &factures, now());
        assert_eq!(snapshot.factures_en_cours, 2);
        assert_eq!(snapshot.factures_impayees, 1);
    }

    #[test]
    fn test_collections_vides() {
        let snapshot = aggregate(&[], &[], &[], &[], now());
        assert_eq!(snapshot.total_clients, 0);
        assert_eq!(snapshot.montant_annee, Decimal::ZERO);
    }
}
