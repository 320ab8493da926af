//! Pet repository implementation

use chrono::{DateTime, Utc};
use pawspa_core::{
    models::{Pet, PetSize},
    AppError, AppResult,
};
use sqlx::PgPool;
use tracing::{debug, error, instrument};
use uuid::Uuid;

/// PostgreSQL implementation of the pet repository
pub struct PgPetRepository {
    pool: PgPool,
}

impl PgPetRepository {
    /// Create a new pet repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Pet>> {
        debug!("Finding pet by id: {}", id);

        let result = sqlx::query_as::<sqlx::Postgres, PetRow>(
            r#"
            SELECT id, owner_id, name, size, breed, created_at
            FROM pets
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding pet {}: {}", id, e);
            AppError::Database(format!("Failed to find pet: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    /// List a customer's pets
    #[instrument(skip(self))]
    pub async fn list_for_owner(&self, owner_id: i32) -> AppResult<Vec<Pet>> {
        let rows = sqlx::query_as::<sqlx::Postgres, PetRow>(
            r#"
            SELECT id, owner_id, name, size, breed, created_at
            FROM pets
            WHERE owner_id = $1
            ORDER BY name ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing pets for owner {}: {}", owner_id, e);
            AppError::Database(format!("Failed to list pets: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

/// Row struct for mapping pet rows
#[derive(Debug, sqlx::FromRow)]
struct PetRow {
    id: Uuid,
    owner_id: i32,
    name: String,
    size: String,
    breed: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<PetRow> for Pet {
    fn from(row: PetRow) -> Self {
        Self {
            id: row.id,
            owner_id: row.owner_id,
            name: row.name,
            size: PetSize::from_str(&row.size).unwrap_or_default(),
            breed: row.breed,
            created_at: row.created_at,
        }
    }
}
