//! Calcul des totaux HT / TVA / TTC d'un document
//!
//! Unique point de calcul pour les devis, ordres de réparation et
//! factures. Les prix du catalogue étant saisis TTC, le total TTC est la
//! somme des lignes arrondies au centime, le HT en est déduit, et la TVA
//! est obtenue par soustraction pour que `HT + TVA == TTC` tienne
//! exactement au centime.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::ligne::{round2, LigneDocument};

/// Totaux d'un document commercial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totaux {
    pub total_ht: Decimal,
    pub montant_tva: Decimal,
    pub total_ttc: Decimal,
}

impl Totaux {
    pub const ZERO: Totaux = Totaux {
        total_ht: Decimal::ZERO,
        montant_tva: Decimal::ZERO,
        total_ttc: Decimal::ZERO,
    };

    /// Tuple (HT, TVA, TTC) pour les constructeurs de documents
    pub fn as_tuple(&self) -> (Decimal, Decimal, Decimal) {
        (self.total_ht, self.montant_tva, self.total_ttc)
    }
}

/// Calcule les totaux d'une liste de lignes pour un taux de TVA donné
///
/// Les lignes sont supposées déjà validées (prix non négatif, quantité
/// strictement positive) ; voir `utils::validation::validate_lignes`.
/// Une liste vide produit des totaux à zéro.
pub fn compute_totals(lignes: &[LigneDocument], taux_tva: Decimal) -> Totaux {
    if lignes.is_empty() {
        return Totaux::ZERO;
    }

    let total_ttc: Decimal = lignes.iter().map(LigneDocument::total_ttc).sum();
    let total_ht = round2(total_ttc / (Decimal::ONE + taux_tva));
    let montant_tva = total_ttc - total_ht;

    Totaux {
        total_ht,
        montant_tva,
        total_ttc,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn taux() -> Decimal {
        Decimal::new(20, 2) // 0.20
    }

    fn ligne(prix_centimes: i64, quantite: i32) -> LigneDocument {
        LigneDocument {
            designation: "Prestation".to_string(),
            prix_unitaire_ttc: Decimal::new(prix_centimes, 2),
            quantite,
            prestation_id: None,
        }
    }

    #[test]
    fn test_liste_vide() {
        let totaux = compute_totals(&[], taux());
        assert_eq!(totaux, Totaux::ZERO);
    }

    #[test]
    fn test_scenario_nominal() {
        // (100.00 x 1) + (50.00 x 2) a 20 % de TVA
        let lignes = vec![ligne(10000, 1), ligne(5000, 2)];
        let totaux = compute_totals(&lignes, taux());

        assert_eq!(totaux.total_ttc, Decimal::new(20000, 2)); // 200.00
        assert_eq!(totaux.total_ht, Decimal::new(16667, 2)); // 166.67
        assert_eq!(totaux.montant_tva, Decimal::new(3333, 2)); // 33.33
    }

    #[test]
    fn test_invariant_ht_plus_tva() {
        // L'invariant doit tenir au centime pres, sans derive d'arrondi,
        // y compris sur des montants qui arrondissent mal
        let cas = vec![
            vec![ligne(10000, 1), ligne(5000, 2)],
            vec![ligne(1, 1)],
            vec![ligne(999, 3), ligne(1234, 7)],
            vec![ligne(3333, 3)],
            vec![ligne(100000000, 12), ligne(1, 99)],
        ];

        for lignes in cas {
            let t = compute_totals(&lignes, taux());
            assert_eq!(
                t.total_ht + t.montant_tva,
                t.total_ttc,
                "invariant viole pour {:?}",
                lignes
            );
        }
    }

    #[test]
    fn test_lignes_arrondies_independamment() {
        // Chaque ligne est arrondie avant la somme : 2 x (10.005) -> 2 x 10.01
        let lignes = vec![
            LigneDocument {
                designation: "A".to_string(),
                prix_unitaire_ttc: Decimal::new(10005, 3),
                quantite: 1,
                prestation_id: None,
            },
            LigneDocument {
                designation: "B".to_string(),
                prix_unitaire_ttc: Decimal::new(10005, 3),
                quantite: 1,
                prestation_id: None,
            },
        ];
        let totaux = compute_totals(&lignes, taux());
        assert_eq!(totaux.total_ttc, Decimal::new(2002, 2)); // 20.02
    }

    #[test]
    fn test_taux_zero() {
        let lignes = vec![ligne(10000, 2)];
        let totaux = compute_totals(&lignes, Decimal::ZERO);
        assert_eq!(totaux.total_ht, totaux.total_ttc);
        assert_eq!(totaux.montant_tva, Decimal::ZERO);
    }
}
