use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::domain::devis::Devis;
use crate::utils::error::{AppError, AppResult};

/// Repository des devis
#[derive(Clone)]
pub struct DevisRepository {
    pool: Pool<Postgres>,
}

impl DevisRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn create(&self, devis: &Devis) -> AppResult<Devis> {
        let created = sqlx::query_as::<_, Devis>(
            r#"
            INSERT INTO devis (
                id, numero, client_id, vehicule_id, lignes, statut,
                total_ht, montant_tva, total_ttc, date_validite,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(devis.id)
        .bind(&devis.numero)
        .bind(devis.client_id)
        .bind(devis.vehicule_id)
        .bind(devis.lignes.clone())
        .bind(devis.statut)
        .bind(devis.total_ht)
        .bind(devis.montant_tva)
        .bind(devis.total_ttc)
        .bind(devis.date_validite)
        .bind(devis.created_at)
        .bind(devis.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Devis> {
        sqlx::query_as::<_, Devis>("SELECT * FROM devis WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Devis".to_string()))
    }

    pub async fn list(
        &self,
        client_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<Devis>> {
        let devis = match client_id {
            Some(client_id) => {
                sqlx::query_as::<_, Devis>(
                    "SELECT * FROM devis WHERE client_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
                )
                .bind(client_id)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Devis>(
                    "SELECT * FROM devis ORDER BY created_at DESC LIMIT $1 OFFSET $2",
                )
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(devis)
    }

    /// Persiste lignes, totaux, statut et dates d'un devis existant
    pub async fn update(&self, devis: &Devis) -> AppResult<Devis> {
        let updated = sqlx::query_as::<_, Devis>(
            r#"
            UPDATE devis
            SET lignes = $1, statut = $2, total_ht = $3, montant_tva = $4,
                total_ttc = $5, date_validite = $6, updated_at = $7
            WHERE id = $8
            RETURNING *
            "#,
        )
        .bind(devis.lignes.clone())
        .bind(devis.statut)
        .bind(devis.total_ht)
        .bind(devis.montant_tva)
        .bind(devis.total_ttc)
        .bind(devis.date_validite)
        .bind(devis.updated_at)
        .bind(devis.id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Devis".to_string()))?;

        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM devis WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Devis".to_string()));
        }
        Ok(())
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM devis")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    pub async fn count_by_client(&self, client_id: Uuid) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM devis WHERE client_id = $1")
            .bind(client_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    pub async fn count_by_vehicule(&self, vehicule_id: Uuid) -> AppResult<i64> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM devis WHERE vehicule_id = $1")
                .bind(vehicule_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    /// Nombre de devis dont une ligne référence la prestation
    pub async fn count_lignes_prestation(&self, prestation_id: Uuid) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM devis
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
