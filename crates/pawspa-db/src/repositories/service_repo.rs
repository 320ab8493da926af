//! Grooming service catalog repository implementation

use chrono::{DateTime, Utc};
use pawspa_core::{models::GroomService, AppError, AppResult};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, error, instrument};
use uuid::Uuid;

/// PostgreSQL implementation of the service catalog repository
pub struct PgServiceRepository {
    pool: PgPool,
}

impl PgServiceRepository {
    /// Create a new service repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<GroomService>> {
        debug!("Finding service by id: {}", id);

        let result = sqlx::query_as::<sqlx::Postgres, ServiceRow>(
            r#"
            SELECT id, name, description,
                   price_xs, price_small, price_medium,
                   price_large, price_xl, price_xxl,
                   active, created_at
            FROM groom_services
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding service {}: {}", id, e);
            AppError::Database(format!("Failed to find service: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    /// List the active catalog
    #[instrument(skip(self))]
    pub async fn list_active(&self) -> AppResult<Vec<GroomService>> {
        let rows = sqlx::query_as::<sqlx::Postgres, ServiceRow>(
            r#"
            SELECT id, name, description,
                   price_xs, price_small, price_medium,
                   price_large, price_xl, price_xxl,
                   active, created_at
            FROM groom_services
            WHERE active
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing services: {}", e);
            AppError::Database(format!("Failed to list services: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

/// Row struct for mapping service rows
#[derive(Debug, sqlx::FromRow)]
struct ServiceRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    price_xs: Option<Decimal>,
    price_small: Option<Decimal>,
    price_medium: Option<Decimal>,
    price_large: Option<Decimal>,
    price_xl: Option<Decimal>,
    price_xxl: Option<Decimal>,
    active: bool,
    created_at: DateTime<Utc>,
}

impl From<ServiceRow> for GroomService {
    fn from(row: ServiceRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price_xs: row.price_xs,
            price_small: row.price_small,
            price_medium: row.price_medium,
            price_large: row.price_large,
            price_xl: row.price_xl,
            price_xxl: row.price_xxl,
            active: row.active,
            created_at: row.created_at,
        }
    }
}
