use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::domain::client::Client;
use crate::utils::error::{AppError, AppResult};

/// Repository des clients
#[derive(Clone)]
pub struct ClientsRepository {
    pool: Pool<Postgres>,
}

impl ClientsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn create(&self, client: &Client) -> AppResult<Client> {
        let created = sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (
                id, numero_client, nom, prenom, email, telephone, adresse,
                type_client, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(client.id)
        .bind(&client.numero_client)
        .bind(&client.nom)
        .bind(&client.prenom)
        .bind(&client.email)
        .bind(&client.telephone)
        .bind(&client.adresse)
        .bind(client.type_client)
        .bind(client.created_at)
        .bind(client.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Client> {
        sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Client".to_string()))
    }

    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<Client>> {
        let client = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(client)
    }

    pub async fn list(&self, limit: i64, offset: i64) -> AppResult<Vec<Client>> {
        let clients = sqlx::query_as::<_, Client>(
            "SELECT * FROM clients ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(clients)
    }

    /// Chargement complet pour le tableau de bord
    pub async fn list_all(&self) -> AppResult<Vec<Client>> {
        let clients = sqlx::query_as::<_, Client>("SELECT * FROM clients ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;

        Ok(clients)
    }

    pub async fn update(&self, client: &Client) -> AppResult<Client> {
        let updated = sqlx::query_as::<_, Client>(
            r#"
            UPDATE clients
            SET nom = $1, prenom = $2, email = $3, telephone = $4,
                adresse = $5, type_client = $6, updated_at = $7
            WHERE id = $8
            RETURNING *
            "#,
        )
        .bind(&client.nom)
        .bind(&client.prenom)
        .bind(&client.email)
        .bind(&client.telephone)
        .bind(&client.adresse)
        .bind(client.type_client)
        .bind(client.updated_at)
        .bind(client.id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Client".to_string()))?;

        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Client".to_string()));
        }
        Ok(())
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM clients")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
