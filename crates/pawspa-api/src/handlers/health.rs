//! Health check handler

use actix_web::{web, HttpResponse};
use pawspa_core::AppError;
use serde_json::json;
use sqlx::PgPool;
use tracing::instrument;

/// Liveness and database connectivity check
///
/// GET /health
#[instrument(skip(pool))]
pub async fn health(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let db_ok = sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool.get_ref())
        .await
        .is_ok();

    let status = if db_ok { "ok" } else { "degraded" };

    Ok(HttpResponse::Ok().json(json!({
        "status": status,
        "database": db_ok,
        "version": env!("CARGO_PKG_VERSION"),
    })))
}

/// Configure the health route
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health));
}
