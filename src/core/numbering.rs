//! Numérotation des pièces (clients, devis, ODR, factures)
//!
//! Produit des identifiants lisibles : `CLI-001` pour les clients,
//! `DEV-2024-003` / `ODR-2024-012` / `FAC-2024-007` pour les pièces
//! datées, à partir du comptage des enregistrements existants. Un simple
//! compter-puis-formater est exposé à une course entre créations
//! concurrentes ; le générateur sérialise donc l'attribution derrière un
//! verrou async et mémorise le dernier numéro attribué par type, la
//! contrainte d'unicité en base restant le filet entre instances.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::utils::error::{AppError, AppResult};

/// Type de pièce numérotée
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypePiece {
    Client,
    Devis,
    Odr,
    Facture,
}

impl TypePiece {
    pub fn prefixe(&self) -> &'static str {
        match self {
            TypePiece::Client => "CLI",
            TypePiece::Devis => "DEV",
            TypePiece::Odr => "ODR",
            TypePiece::Facture => "FAC",
        }
    }

    /// Les pièces commerciales repartent de 001 chaque année
    pub fn par_annee(&self) -> bool {
        !matches!(self, TypePiece::Client)
    }
}

impl fmt::Display for TypePiece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prefixe())
    }
}

/// Formate un numéro de pièce, séquence complétée à 3 chiffres minimum
pub fn format_numero(piece: TypePiece, annee: i32, sequence: i64) -> String {
    if piece.par_annee() {
        format!("{}-{}-{:03}", piece.prefixe(), annee, sequence)
    } else {
        format!("{}-{:03}", piece.prefixe(), sequence)
    }
}

/// Accès aux enregistrements existants pour asseoir le comptage
///
/// Implémenté par la couche base de données ; les tests utilisent une
/// version en mémoire.
#[async_trait]
pub trait CompteurPieces: Send + Sync {
    /// Nombre de pièces existantes du type donné (année comprise pour
    /// les pièces datées)
    async fn count(&self, piece: TypePiece, annee: i32) -> AppResult<i64>;

    /// Le numéro est-il déjà pris ?
    async fn numero_existe(&self, piece: TypePiece, numero: &str) -> AppResult<bool>;
}

/// Générateur de numéros de pièces
///
/// `derniers` garde le dernier numéro de séquence attribué par type et
/// année depuis le démarrage : deux appels concurrents ne peuvent jamais
/// observer le même comptage, même si la pièce du premier n'est pas
/// encore persistée.
pub struct GenerateurNumeros<C: CompteurPieces> {
    compteur: C,
    derniers: Mutex<HashMap<(TypePiece, i32), i64>>,
    max_tentatives: u32,
}

impl<C: CompteurPieces> GenerateurNumeros<C> {
    pub fn new(compteur: C, max_tentatives: u32) -> Self {
        Self {
            compteur,
            derniers: Mutex::new(HashMap::new()),
            max_tentatives: max_tentatives.max(1),
        }
    }

    /// Attribue le prochain numéro disponible pour un type de pièce
    ///
    /// Réessaie sur collision jusqu'à `max_tentatives`, puis rend
    /// `NumberingConflict`.
    pub async fn next_number(&self, piece: TypePiece, annee: i32) -> AppResult<String> {
        let cle = (piece, if piece.par_annee() { annee } else { 0 });

        // Le verrou couvre comptage, sondes et réservation : l'attribution
        // est sérialisée par type de pièce au sein du processus.
        let mut derniers = self.derniers.lock().await;

        let base = self.compteur.count(piece, annee).await? + 1;
        let mut sequence = match derniers.get(&cle) {
            Some(dernier) => base.max(dernier + 1),
            None => base,
        };

        for _ in 0..self.max_tentatives {
            let numero = format_numero(piece, annee, sequence);
            if !self.compteur.numero_existe(piece, &numero).await? {
                derniers.insert(cle, sequence);
                return Ok(numero);
            }
            sequence += 1;
        }

        Err(AppError::NumberingConflict(format!(
            "{} tentatives épuisées pour {}",
            self.max_tentatives, piece
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    /// Compteur en mémoire dont le comptage reste volontairement figé :
    /// il reproduit la fenêtre où des pièces attribuées ne sont pas
    /// encore persistées.
    struct CompteurFige {
        compte: i64,
        pris: std::sync::Mutex<HashSet<String>>,
    }

    impl CompteurFige {
        fn new(compte: i64) -> Self {
            Self {
                compte,
                pris: std::sync::Mutex::new(HashSet::new()),
            }
        }

        fn avec_pris(compte: i64, numeros: &[&str]) -> Self {
            Self {
                compte,
                pris: std::sync::Mutex::new(numeros.iter().map(|n| n.to_string()).collect()),
            }
        }
    }

    #[async_trait]
    impl CompteurPieces for CompteurFige {
        async fn count(&self, _piece: TypePiece, _annee: i32) -> AppResult<i64> {
            Ok(self.compte)
        }

        async fn numero_existe(&self, _piece: TypePiece, numero: &str) -> AppResult<bool> {
            Ok(self.pris.lock().unwrap().contains(numero))
        }
    }

    #[test]
    fn test_format_numero() {
        assert_eq!(format_numero(TypePiece::Client, 2024, 1), "CLI-001");
        assert_eq!(format_numero(TypePiece::Devis, 2024, 3), "DEV-2024-003");
        assert_eq!(format_numero(TypePiece::Odr, 2024, 12), "ODR-2024-012");
        assert_eq!(format_numero(TypePiece::Facture, 2024, 7), "FAC-2024-007");
        // Au-delà de 999, le numéro s'allonge sans tronquer
        assert_eq!(format_numero(TypePiece::Facture, 2024, 1234), "FAC-2024-1234");
    }

    #[tokio::test]
    async fn test_premier_numero() {
        let generateur = GenerateurNumeros::new(CompteurFige::new(0), 3);
        assert_eq!(
            generateur.next_number(TypePiece::Client, 2024).await.unwrap(),
            "CLI-001"
        );
    }

    #[tokio::test]
    async fn test_sequence_suit_le_comptage() {
        let generateur = GenerateurNumeros::new(CompteurFige::new(6), 3);
        assert_eq!(
            generateur.next_number(TypePiece::Facture, 2024).await.unwrap(),
            "FAC-2024-007"
        );
    }

    #[tokio::test]
    async fn test_collision_puis_reessai() {
        let compteur = CompteurFige::avec_pris(2, &["DEV-2024-003", "DEV-2024-004"]);
        let generateur = GenerateurNumeros::new(compteur, 3);
        assert_eq!(
            generateur.next_number(TypePiece::Devis, 2024).await.unwrap(),
            "DEV-2024-005"
        );
    }

    #[tokio::test]
    async fn test_tentatives_epuisees() {
        let compteur = CompteurFige::avec_pris(0, &["ODR-2024-001", "ODR-2024-002", "ODR-2024-003"]);
        let generateur = GenerateurNumeros::new(compteur, 3);
        let erreur = generateur.next_number(TypePiece::Odr, 2024).await.unwrap_err();
        assert!(matches!(erreur, AppError::NumberingConflict(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_unicite_sous_concurrence() {
        crate::test_utils::init_test_logging();

        // Le comptage figé simule N créations concurrentes lisant le même
        // état : chaque appel doit malgré tout rendre un numéro distinct
        // et contigu.
        let generateur = Arc::new(GenerateurNumeros::new(CompteurFige::new(0), 3));

        let mut handles = Vec::new();
        for _ in 0..20 {
            let generateur = generateur.clone();
            handles.push(tokio::spawn(async move {
                generateur.next_number(TypePiece::Facture, 2024).await
            }));
        }

        let mut numeros = HashSet::new();
        for handle in handles {
            let numero = handle.await.unwrap().unwrap();
            assert!(numeros.insert(numero.clone()), "doublon: {}", numero);
        }

        for sequence in 1..=20 {
            assert!(numeros.contains(&format_numero(TypePiece::Facture, 2024, sequence)));
        }
    }

    #[tokio::test]
    async fn test_annees_independantes() {
        let generateur = GenerateurNumeros::new(CompteurFige::new(0), 3);
        assert_eq!(
            generateur.next_number(TypePiece::Facture, 2024).await.unwrap(),
            "FAC-2024-001"
        );
        assert_eq!(
            generateur.next_number(TypePiece::Facture, 2025).await.unwrap(),
            "FAC-2025-001"
        );
    }
}
