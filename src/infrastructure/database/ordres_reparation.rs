use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::domain::ordre_reparation::OrdreReparation;
use crate::utils::error::{AppError, AppResult};

/// Repository des ordres de réparation
#[derive(Clone)]
pub struct OdrRepository {
    pool: Pool<Postgres>,
}

impl OdrRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn create(&self, odr: &OrdreReparation) -> AppResult<OrdreReparation> {
        let created = sqlx::query_as::<_, OrdreReparation>(
            r#"
            INSERT INTO ordres_reparation (
                id, numero, client_id, vehicule_id, devis_id, lignes,
                statut, montant_total, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(odr.id)
        .bind(&odr.numero)
        .bind(odr.client_id)
        .bind(odr.vehicule_id)
        .bind(odr.devis_id)
        .bind(odr.lignes.clone())
        .bind(odr.statut)
        .bind(odr.montant_total)
        .bind(odr.created_at)
        .bind(odr.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<OrdreReparation> {
        sqlx::query_as::<_, OrdreReparation>("SELECT * FROM ordres_reparation WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Ordre de réparation".to_string()))
    }

    pub async fn list(
        &self,
        client_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<OrdreReparation>> {
        let odrs = match client_id {
            Some(client_id) => {
                sqlx::query_as::<_, OrdreReparation>(
                    "SELECT * FROM ordres_reparation WHERE client_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
                )
                .bind(client_id)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, OrdreReparation>(
                    "SELECT * FROM ordres_reparation ORDER BY created_at DESC LIMIT $1 OFFSET $2",
                )
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(odrs)
    }

    /// Chargement complet pour le tableau de bord
    pub async fn list_all(&self) -> AppResult<Vec<OrdreReparation>> {
        let odrs = sqlx::query_as::<_, OrdreReparation>(
            "SELECT * FROM ordres_reparation ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(odrs)
    }

    /// Persiste lignes, montant et statut d'un ordre existant
    pub async fn update(&self, odr: &OrdreReparation) -> AppResult<OrdreReparation> {
        let updated = sqlx::query_as::<_, OrdreReparation>(
            r#"
            UPDATE ordres_reparation
            SET lignes = $1, statut = $2, montant_total = $3, updated_at = $4
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(odr.lignes.clone())
        .bind(odr.statut)
        .bind(odr.montant_total)
        .bind(odr.updated_at)
        .bind(odr.id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Ordre de réparation".to_string()))?;

        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM ordres_reparation WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Ordre de réparation".to_string()));
        }
        Ok(())
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM ordres_reparation")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    pub async fn count_by_client(&self, client_id: Uuid) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM ordres_reparation WHERE client_id = $1",
        )
        .bind(client_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    pub async fn count_by_vehicule(&self, vehicule_id: Uuid) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM ordres_reparation WHERE vehicule_id = $1",
        )
        .bind(vehicule_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    pub async fn count_by_devis(&self, devis_id: Uuid) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM ordres_reparation WHERE devis_id = $1",
        )
        .bind(devis_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Nombre d'ordres dont une ligne référence la prestation
    pub async fn count_lignes_prestation(&self, prestation_id: Uuid) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM ordres_reparation
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
