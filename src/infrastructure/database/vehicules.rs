use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::domain::client::Vehicule;
use crate::utils::error::{AppError, AppResult};

/// Repository des véhicules
#[derive(Clone)]
pub struct VehiculesRepository {
    pool: Pool<Postgres>,
}

impl VehiculesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn create(&self, vehicule: &Vehicule) -> AppResult<Vehicule> {
        let created = sqlx::query_as::<_, Vehicule>(
            r#"
            INSERT INTO vehicules (
                id, client_id, immatriculation, marque, modele, annee, vin,
                kilometrage, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(vehicule.id)
        .bind(vehicule.client_id)
        .bind(&vehicule.immatriculation)
        .bind(&vehicule.marque)
        .bind(&vehicule.modele)
        .bind(vehicule.annee)
        .bind(&vehicule.vin)
        .bind(vehicule.kilometrage)
        .bind(vehicule.created_at)
        .bind(vehicule.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Vehicule> {
        sqlx::query_as::<_, Vehicule>("SELECT * FROM vehicules WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Véhicule".to_string()))
    }

    pub async fn list(&self, limit: i64, offset: i64) -> AppResult<Vec<Vehicule>> {
        let vehicules = sqlx::query_as::<_, Vehicule>(
            "SELECT * FROM vehicules ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(vehicules)
    }

    pub async fn list_by_client(&self, client_id: Uuid) -> AppResult<Vec<Vehicule>> {
        let vehicules = sqlx::query_as::<_, Vehicule>(
            "SELECT * FROM vehicules WHERE client_id = $1 ORDER BY created_at",
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(vehicules)
    }

    pub async fn list_all(&self) -> AppResult<Vec<Vehicule>> {
        let vehicules = sqlx::query_as::<_, Vehicule>("SELECT * FROM vehicules ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;

        Ok(vehicules)
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM vehicules WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Véhicule".to_string()));
        }
        Ok(())
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM vehicules")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    pub async fn count_by_client(&self, client_id: Uuid) -> AppResult<i64> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM vehicules WHERE client_id = $1")
                .bind(client_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}
