//! Service catalog read handlers
//!
//! Read-only lookups the booking flows depend on: the front desk picks
//! services and quotes prices from this catalog.

use actix_web::{web, HttpResponse};
use pawspa_core::AppError;
use pawspa_db::PgServiceRepository;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::dto::ApiResponse;

/// List the active service catalog with per-size prices
///
/// GET /api/v1/services
#[instrument(skip(pool))]
pub async fn list_services(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let services = PgServiceRepository::new(pool.get_ref().clone())
        .list_active()
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(services)))
}

/// Get one catalog service
///
/// GET /api/v1/services/{id}
#[instrument(skip(pool))]
pub async fn get_service(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let service_id = path.into_inner();

    let service = PgServiceRepository::new(pool.get_ref().clone())
        .find_by_id(service_id)
        .await?
        .ok_or_else(|| AppError::ServiceNotFound(service_id.to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(service)))
}

/// Configure catalog routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/services")
            .route("", web::get().to(list_services))
            .route("/{id}", web::get().to(get_service)),
    );
}
