use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::domain::prestation::{Prestation, TypeService};
use crate::utils::error::{AppError, AppResult};

/// Repository du catalogue de prestations
#[derive(Clone)]
pub struct PrestationsRepository {
    pool: Pool<Postgres>,
}

impl PrestationsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn create(&self, prestation: &Prestation) -> AppResult<Prestation> {
        let created = sqlx::query_as::<_, Prestation>(
            r#"
            INSERT INTO prestations (
                id, nom, description, type_service, prix_base_ttc,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(prestation.id)
        .bind(&prestation.nom)
        .bind(&prestation.description)
        .bind(prestation.type_service)
        .bind(prestation.prix_base_ttc)
        .bind(prestation.created_at)
        .bind(prestation.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Prestation> {
        sqlx::query_as::<_, Prestation>("SELECT * FROM prestations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Prestation".to_string()))
    }

    pub async fn list(
        &self,
        type_service: Option<TypeService>,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<Prestation>> {
        let prestations = match type_service {
            Some(type_service) => {
                sqlx::query_as::<_, Prestation>(
                    "SELECT * FROM prestations WHERE type_service = $1 ORDER BY nom LIMIT $2 OFFSET $3",
                )
                .bind(type_service)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Prestation>(
                    "SELECT * FROM prestations ORDER BY nom LIMIT $1 OFFSET $2",
                )
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(prestations)
    }

    pub async fn update(&self, prestation: &Prestation) -> AppResult<Prestation> {
        let updated = sqlx::query_as::<_, Prestation>(
            r#"
            UPDATE prestations
            SET nom = $1, description = $2, type_service = $3,
                prix_base_ttc = $4, updated_at = $5
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(&prestation.nom)
        .bind(&prestation.description)
        .bind(prestation.type_service)
        .bind(prestation.prix_base_ttc)
        .bind(prestation.updated_at)
        .bind(prestation.id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Prestation".to_string()))?;

        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM prestations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Prestation".to_string()));
        }
        Ok(())
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM prestations")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
