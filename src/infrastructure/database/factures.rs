use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::domain::facture::{Facture, StatutFacture};
use crate::utils::error::{AppError, AppResult};

/// Repository des factures
#[derive(Clone)]
pub struct FacturesRepository {
    pool: Pool<Postgres>,
}

impl FacturesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn create(&self, facture: &Facture) -> AppResult<Facture> {
        let created = sqlx::query_as::<_, Facture>(
            r#"
            INSERT INTO factures (
                id, numero, client_id, odr_id, lignes, statut,
                montant_ht, montant_tva, montant_ttc,
                mode_paiement, date_reglement, date_echeance,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING *
            "#,
        )
        .bind(facture.id)
        .bind(&facture.numero)
        .bind(facture.client_id)
        .bind(facture.odr_id)
        .bind(facture.lignes.clone())
        .bind(facture.statut)
        .bind(facture.montant_ht)
        .bind(facture.montant_tva)
        .bind(facture.montant_ttc)
        .bind(facture.mode_paiement)
        .bind(facture.date_reglement)
        .bind(facture.date_echeance)
        .bind(facture.created_at)
        .bind(facture.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Facture> {
        sqlx::query_as::<_, Facture>("SELECT * FROM factures WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Facture".to_string()))
    }

    pub async fn list(
        &self,
        client_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<Facture>> {
        let factures = match client_id {
            Some(client_id) => {
                sqlx::query_as::<_, Facture>(
                    "SELECT * FROM factures WHERE client_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
                )
                .bind(client_id)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Facture>(
                    "SELECT * FROM factures ORDER BY created_at DESC LIMIT $1 OFFSET $2",
                )
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(factures)
    }

    /// Chargement complet pour le tableau de bord
    pub async fn list_all(&self) -> AppResult<Vec<Facture>> {
        let factures = sqlx::query_as::<_, Facture>("SELECT * FROM factures ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;

        Ok(factures)
    }

    /// Factures candidates aux alertes d'échéance
    pub async fn list_by_statut(&self, statut: StatutFacture) -> AppResult<Vec<Facture>> {
        let factures = sqlx::query_as::<_, Facture>(
            "SELECT * FROM factures WHERE statut = $1 ORDER BY date_echeance",
        )
        .bind(statut)
        .fetch_all(&self.pool)
        .await?;

        Ok(factures)
    }

    /// Persiste lignes, montants, statut et règlement d'une facture
    pub async fn update(&self, facture: &Facture) -> AppResult<Facture> {
        let updated = sqlx::query_as::<_, Facture>(
            r#"
            UPDATE factures
            SET lignes = $1, statut = $2, montant_ht = $3, montant_tva = $4,
                montant_ttc = $5, mode_paiement = $6, date_reglement = $7,
                date_echeance = $8, updated_at = $9
            WHERE id = $10
            RETURNING *
            "#,
        )
        .bind(facture.lignes.clone())
        .bind(facture.statut)
        .bind(facture.montant_ht)
        .bind(facture.montant_tva)
        .bind(facture.montant_ttc)
        .bind(facture.mode_paiement)
        .bind(facture.date_reglement)
        .bind(facture.date_echeance)
        .bind(facture.updated_at)
        .bind(facture.id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Facture".to_string()))?;

        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM factures WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Facture".to_string()));
        }
        Ok(())
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM factures")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    pub async fn count_by_client(&self, client_id: Uuid) -> AppResult<i64> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM factures WHERE client_id = $1")
                .bind(client_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    pub async fn count_by_odr(&self, odr_id: Uuid) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM factures WHERE odr_id = $1")
            .bind(odr_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Nombre de factures dont une ligne référence la prestation
    pub async fn count_lignes_prestation(&self, prestation_id: Uuid) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM factures
            WHERE EXISTS (
                SELECT 1 FROM jsonb_array_elements(lignes) AS ligne
                WHERE ligne->>'prestation_id' = $1
            )
            "#,
        )
        .bind(prestation_id.to_string())
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
