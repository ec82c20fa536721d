// utils/validation.rs
use rust_decimal::Decimal;

use crate::domain::ligne::LigneDocument;
use crate::utils::error::{AppError, AppResult};

/// Valide les lignes d'un document avant tout calcul de totaux
///
/// Le calculateur de totaux suppose des entrées déjà validées : prix non
/// négatif, quantité strictement positive, libellé renseigné.
pub fn validate_lignes(lignes: &[LigneDocument]) -> AppResult<()> {
    for (index, ligne) in lignes.iter().enumerate() {
        if ligne.designation.trim().is_empty() {
            return Err(AppError::Validation(format!(
                "ligne {}: désignation requise",
                index + 1
            )));
        }
        if ligne.prix_unitaire_ttc < Decimal::ZERO {
            return Err(AppError::Validation(format!(
                "ligne {}: prix unitaire négatif",
                index + 1
            )));
        }
        if ligne.quantite <= 0 {
            return Err(AppError::Validation(format!(
                "ligne {}: quantité invalide",
                index + 1
            )));
        }
    }
    Ok(())
}

/// Refuse une suppression tant que des enregistrements dépendants existent
///
/// `references` associe un libellé de dépendance à son comptage ; le
/// message liste les dépendances non nulles pour guider l'utilisateur.
pub fn ensure_no_references(entite: &str, references: &[(&str, i64)]) -> AppResult<()> {
    let bloquants: Vec<String> = references
        .iter()
        .filter(|(_, count)| *count > 0)
        .map(|(libelle, count)| format!("{} {}", count, libelle))
        .collect();

    if bloquants.is_empty() {
        Ok(())
    } else {
        Err(AppError::ReferentialIntegrity(format!(
            "{} référencé par {}",
            entite,
            bloquants.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ligne(prix_centimes: i64, quantite: i32) -> LigneDocument {
        LigneDocument {
            designation: "Parallélisme".to_string(),
            prix_unitaire_ttc: Decimal::new(prix_centimes, 2),
            quantite,
            prestation_id: None,
        }
    }

    #[test]
    fn test_lignes_valides() {
        assert!(validate_lignes(&[ligne(5000, 1), ligne(0, 3)]).is_ok());
        assert!(validate_lignes(&[]).is_ok());
    }

    #[test]
    fn test_prix_negatif_rejete() {
        let result = validate_lignes(&[ligne(-100, 1)]);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_quantite_non_positive_rejetee() {
        assert!(validate_lignes(&[ligne(5000, 0)]).is_err());
        assert!(validate_lignes(&[ligne(5000, -2)]).is_err());
    }

    #[test]
    fn test_designation_vide_rejetee() {
        let mut l = ligne(5000, 1);
        l.designation = "  ".to_string();
        assert!(validate_lignes(&[l]).is_err());
    }

    #[test]
    fn test_suppression_bloquee_puis_autorisee() {
        // Un client avec un véhicule ne peut pas être supprimé
        let result = ensure_no_references("Client", &[("véhicule(s)", 1), ("devis", 0)]);
        assert!(matches!(result, Err(AppError::ReferentialIntegrity(_))));

        // Une fois le véhicule retiré, la suppression passe
        assert!(ensure_no_references("Client", &[("véhicule(s)", 0), ("devis", 0)]).is_ok());
    }
}
