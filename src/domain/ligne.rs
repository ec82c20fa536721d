use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ligne d'un document commercial (devis, ordre de réparation, facture)
///
/// Les lignes sont portées par le document qui les possède, dans l'ordre
/// de saisie. Le prix unitaire est exprimé TTC, comme dans le catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LigneDocument {
    /// Libellé de la ligne
    pub designation: String,
    /// Prix unitaire TTC en euros
    pub prix_unitaire_ttc: Decimal,
    /// Quantité facturée
    pub quantite: i32,
    /// Prestation du catalogue dont la ligne est issue, si applicable
    pub prestation_id: Option<Uuid>,
}

/// Arrondi commercial au centime
pub fn round2(montant: Decimal) -> Decimal {
    montant.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

impl LigneDocument {
    /// Total TTC de la ligne, arrondi au centime
    pub fn total_ttc(&self) -> Decimal {
        round2(self.prix_unitaire_ttc * Decimal::from(self.quantite))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ligne(prix: Decimal, quantite: i32) -> LigneDocument {
        LigneDocument {
            designation: "Main d'œuvre".to_string(),
            prix_unitaire_ttc: prix,
            quantite,
            prestation_id: None,
        }
    }

    #[test]
    fn test_total_ligne() {
        // 50.00 x 2 = 100.00
        let l = ligne(Decimal::new(5000, 2), 2);
        assert_eq!(l.total_ttc(), Decimal::new(10000, 2));
    }

    #[test]
    fn test_total_ligne_arrondi() {
        // 33.333 x 3 = 99.999 -> 100.00
        let l = ligne(Decimal::new(33333, 3), 3);
        assert_eq!(l.total_ttc(), Decimal::new(10000, 2));
    }
}
