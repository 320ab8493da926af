//! PawSpa Grooming Backend Server
//!
//! Backend for the walk-in grooming booking lifecycle: same-day queue
//! numbering, atomic multi-service booking, session timing, and status
//! transitions.

use actix_cors::Cors;
use actix_web::{http::header, middleware, web, App, HttpResponse, HttpServer};
use pawspa_api::handlers::{
    configure_bookings, configure_catalog, configure_customer, configure_health,
    configure_sessions,
};
use pawspa_core::AppConfig;
use pawspa_db::{create_pool, PgActivityLogRepository};
use pawspa_services::{
    ActivityLogHook, BookingManager, NotificationHook, PostCommitHooks, ReceiptService,
    SessionTracker, StatusEngine, TracingNotifier,
};
use std::env;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Configure API routes
fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            // Health check
            .configure(configure_health)
            // Staff booking operations
            .configure(configure_bookings)
            // Grooming session operations
            .configure(configure_sessions)
            // Service catalog reads
            .configure(configure_catalog)
            // Customer self-service
            .configure(configure_customer),
    );
}

/// Initialize tracing/logging
fn init_tracing() {
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "pawspa_backend={},pawspa_api={},pawspa_services={},pawspa_db={},actix_web=info,sqlx=warn",
            log_level, log_level, log_level, log_level
        ))
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    init_tracing();

    info!(
        "Starting PawSpa Grooming Backend v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Load configuration from files and environment
    let config = AppConfig::load().expect("Failed to load configuration");
    let workers = config.server.workers;
    let cors_origins = config.server.cors_origins.clone();

    info!("Connecting to database...");
    let pool = create_pool(&config.database.url, Some(config.database.max_connections))
        .await
        .expect("Failed to create database pool");

    info!(
        "Database connection established with {} max connections",
        config.database.max_connections
    );

    // Post-commit hooks: activity log first, then notifications
    let hooks = Arc::new(
        PostCommitHooks::new()
            .register(Arc::new(ActivityLogHook::new(PgActivityLogRepository::new(
                pool.clone(),
            ))))
            .register(Arc::new(NotificationHook::new(Arc::new(TracingNotifier)))),
    );

    let booking_manager = web::Data::new(
        BookingManager::new(pool.clone(), hooks.clone())
            .with_default_fee(config.grooming.matted_coat_fee())
            .with_queue_retries(config.grooming.queue_retry_attempts),
    );
    let status_engine = web::Data::new(StatusEngine::new(pool.clone(), hooks.clone()));
    let session_tracker = web::Data::new(SessionTracker::new(pool.clone(), hooks.clone()));
    let receipt_service = web::Data::new(ReceiptService::new(pool.clone()));

    let bind_addr = config.server_addr();
    info!(
        "Starting HTTP server on {} with {} workers",
        bind_addr, workers
    );

    // Create and run server
    HttpServer::new(move || {
        // Configure CORS - clone cors_origins for each worker
        let cors_origins_inner = cors_origins.clone();
        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _req_head| {
                let origins: Vec<&str> = cors_origins_inner.split(',').collect();
                if let Ok(origin_str) = origin.to_str() {
                    origins.iter().any(|o| o.trim() == origin_str)
                } else {
                    false
                }
            })
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                header::AUTHORIZATION,
                header::ACCEPT,
                header::CONTENT_TYPE,
            ])
            .supports_credentials()
            .max_age(3600);

        App::new()
            // Add database pool to app data
            .app_data(web::Data::new(pool.clone()))
            // Add services
            .app_data(booking_manager.clone())
            .app_data(status_engine.clone())
            .app_data(session_tracker.clone())
            .app_data(receipt_service.clone())
            .app_data(web::QueryConfig::default().error_handler(|err, _req| {
                let error_message = err.to_string();
                actix_web::error::InternalError::from_response(
                    err,
                    HttpResponse::BadRequest().json(serde_json::json!({
                        "error": "invalid_query",
                        "message": error_message
                    })),
                )
                .into()
            }))
            // Middleware
            .wrap(cors)
            .wrap(middleware::Logger::new("%a \"%r\" %s %b %Dms"))
            .wrap(middleware::Compress::default())
            .wrap(middleware::NormalizePath::trim())
            // Configure routes
            .configure(configure_routes)
            // Root redirect to health
            .route(
                "/",
                web::get().to(|| async {
                    HttpResponse::Found()
                        .append_header(("Location", "/api/v1/health"))
                        .finish()
                }),
            )
    })
    .workers(workers)
    .bind(&bind_addr)?
    .run()
    .await
}
