use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::core::numbering::{CompteurPieces, TypePiece};
use crate::utils::error::AppResult;

/// Comptage des pièces existantes, assis sur les tables de chaque entité
///
/// Les colonnes `numero` portent une contrainte d'unicité : c'est le
/// filet du générateur entre plusieurs instances du service.
#[derive(Clone)]
pub struct SqlCompteurPieces {
    pool: Pool<Postgres>,
}

impl SqlCompteurPieces {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn table(piece: TypePiece) -> &'static str {
        match piece {
            TypePiece::Client => "clients",
            TypePiece::Devis => "devis",
            TypePiece::Odr => "ordres_reparation",
            TypePiece::Facture => "factures",
        }
    }

    fn colonne_numero(piece: TypePiece) -> &'static str {
        match piece {
            TypePiece::Client => "numero_client",
            _ => "numero",
        }
    }
}

#[async_trait]
impl CompteurPieces for SqlCompteurPieces {
    async fn count(&self, piece: TypePiece, annee: i32) -> AppResult<i64> {
        let table = Self::table(piece);
        let colonne = Self::colonne_numero(piece);

        let count = if piece.par_annee() {
            let motif = format!("{}-{}-%", piece.prefixe(), annee);
            sqlx::query_scalar::<_, i64>(&format!(
                "SELECT COUNT(*) FROM {} WHERE {} LIKE $1",
                table, colonne
            ))
            .bind(motif)
            .fetch_one(&self.pool)
            .await?
        } else {
            sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
                .fetch_one(&self.pool)
                .await?
        };

        Ok(count)
    }

    async fn numero_existe(&self, piece: TypePiece, numero: &str) -> AppResult<bool> {
        let existe = sqlx::query_scalar::<_, bool>(&format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE {} = $1)",
            Self::table(piece),
            Self::colonne_numero(piece)
        ))
        .bind(numero)
        .fetch_one(&self.pool)
        .await?;

        Ok(existe)
    }
}
