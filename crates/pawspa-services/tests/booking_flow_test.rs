//! Integration tests for the booking workflows
//!
//! These run against a real PostgreSQL database. Set DATABASE_URL and
//! apply the migrations, then run with `cargo test -- --ignored`.

use pawspa_core::models::{lines_subtotal, BookingStatus, CancelledBy, PaymentMethod};
use pawspa_core::AppError;
use pawspa_db::PgBookingRepository;
use pawspa_services::{
    Actor, AddServicesInput, BookingManager, CancelRequest, CreateBookingInput, PostCommitHooks,
    ReceiptService, SessionTracker, StatusEngine,
};
use rust_decimal_macros::dec;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

async fn test_pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("Failed to connect to test database")
}

struct Fixture {
    owner_id: i32,
    groomer_id: i32,
    pet_id: Uuid,
    full_groom: Uuid,
    nail_trim: Uuid,
}

async fn seed(pool: &PgPool) -> Fixture {
    let owner_id: i32 = sqlx::query_scalar(
        "INSERT INTO users (full_name, role) VALUES ('Test Owner', 'customer') RETURNING id",
    )
    .fetch_one(pool)
    .await
    .unwrap();

    let groomer_id: i32 = sqlx::query_scalar(
        "INSERT INTO users (full_name, role) VALUES ('Test Groomer', 'groomer') RETURNING id",
    )
    .fetch_one(pool)
    .await
    .unwrap();

    let pet_id: Uuid = sqlx::query_scalar(
        "INSERT INTO pets (owner_id, name, size) VALUES ($1, 'Biscuit', 'large') RETURNING id",
    )
    .bind(owner_id)
    .fetch_one(pool)
    .await
    .unwrap();

    let full_groom: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO groom_services (name, price_small, price_medium, price_large)
        VALUES ('Full Groom', 400.00, 500.00, 700.00)
        RETURNING id
        "#,
    )
    .fetch_one(pool)
    .await
    .unwrap();

    // Nail trim has no large price; the resolver falls back to medium
    let nail_trim: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO groom_services (name, price_small, price_medium)
        VALUES ('Nail Trim', 100.00, 150.00)
        RETURNING id
        "#,
    )
    .fetch_one(pool)
    .await
    .unwrap();

    Fixture {
        owner_id,
        groomer_id,
        pet_id,
        full_groom,
        nail_trim,
    }
}

fn services(pool: &PgPool) -> (BookingManager, StatusEngine, SessionTracker) {
    let hooks = Arc::new(PostCommitHooks::new());
    (
        BookingManager::new(pool.clone(), hooks.clone()),
        StatusEngine::new(pool.clone(), hooks.clone()),
        SessionTracker::new(pool.clone(), hooks),
    )
}

fn create_input(fixture: &Fixture) -> CreateBookingInput {
    CreateBookingInput {
        pet_id: fixture.pet_id,
        owner_id: fixture.owner_id,
        groomer_id: fixture.groomer_id,
        service_ids: vec![fixture.full_groom, fixture.nail_trim],
        base_price: dec!(850.00),
        matted_coat_fee: None,
        special_notes: Some("First visit".to_string()),
        time_slot: "10:00 AM - 11:00 AM".to_string(),
        payment_method: PaymentMethod::Cash,
    }
}

#[tokio::test]
#[ignore] // Requires database
async fn test_create_booking_prices_lines_and_records_payment() {
    let pool = test_pool().await;
    let fixture = seed(&pool).await;
    let (manager, _, _) = services(&pool);

    let created = manager
        .create(Actor::system(), create_input(&fixture))
        .await
        .unwrap();

    assert!(created.queue_number >= 1);
    assert_eq!(created.total_amount, dec!(850.00));

    // Large pet: full groom resolves at 700, nail trim falls back to medium 150
    let lines: Vec<(Uuid, rust_decimal::Decimal, bool)> = sqlx::query_as(
        "SELECT service_id, price, is_addon FROM booking_services WHERE booking_id = $1 ORDER BY price DESC",
    )
    .bind(created.booking_id)
    .fetch_all(&pool)
    .await
    .unwrap();

    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], (fixture.full_groom, dec!(700.00), false));
    assert_eq!(lines[1], (fixture.nail_trim, dec!(150.00), false));

    let payment_count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM booking_payments WHERE booking_id = $1 AND payment_type = 'initial'",
    )
    .bind(created.booking_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(payment_count, 1);
}

#[tokio::test]
#[ignore] // Requires database
async fn test_create_rejects_mismatched_base_price() {
    let pool = test_pool().await;
    let fixture = seed(&pool).await;
    let (manager, _, _) = services(&pool);

    // Full groom prices at 700 for a large pet, not 999
    let err = manager
        .create(
            Actor::system(),
            CreateBookingInput {
                service_ids: vec![fixture.full_groom],
                base_price: dec!(999.00),
                ..create_input(&fixture)
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));

    // Nothing committed
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM walk_in_bookings WHERE pet_id = $1")
        .bind(fixture.pet_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
#[ignore] // Requires database
async fn test_second_booking_for_same_pet_conflicts() {
    let pool = test_pool().await;
    let fixture = seed(&pool).await;
    let (manager, _, _) = services(&pool);

    let first = manager
        .create(Actor::system(), create_input(&fixture))
        .await
        .unwrap();

    let err = manager
        .create(Actor::system(), create_input(&fixture))
        .await
        .unwrap_err();

    match err {
        AppError::BookingConflict(conflict) => {
            assert_eq!(conflict.booking_id, first.booking_id);
            assert_eq!(conflict.status, "pending");
        }
        other => panic!("expected BookingConflict, got {other}"),
    }
}

#[tokio::test]
#[ignore] // Requires database
async fn test_addon_reconciles_total_and_rejects_second_fee() {
    let pool = test_pool().await;
    let fixture = seed(&pool).await;
    let (manager, _, _) = services(&pool);

    let input = CreateBookingInput {
        service_ids: vec![fixture.full_groom],
        base_price: dec!(700.00),
        ..create_input(&fixture)
    };
    let created = manager.create(Actor::system(), input).await.unwrap();

    let outcome = manager
        .add_services(
            Actor::system(),
            created.booking_id,
            AddServicesInput {
                service_ids: vec![fixture.nail_trim],
                payment_method: Some(PaymentMethod::Gcash),
                apply_matted_coat_fee: true,
                matted_coat_fee: Some(dec!(100.00)),
            },
        )
        .await
        .unwrap();

    assert_eq!(outcome.added_services, 1);
    assert_eq!(outcome.fee_added, dec!(100.00));
    // 700 base + 150 nail trim (medium fallback) + 100 fee
    assert_eq!(outcome.new_total, dec!(950.00));

    // Total stays equal to line total plus fee after the add-on
    let repo = PgBookingRepository::new(pool.clone());
    let booking = repo
        .find_by_id(created.booking_id)
        .await
        .unwrap()
        .unwrap();
    let lines = repo.lines_for_booking(created.booking_id).await.unwrap();
    assert_eq!(booking.matted_coat_fee, dec!(100.00));
    assert_eq!(
        booking.total_amount,
        lines_subtotal(&lines) + booking.matted_coat_fee
    );

    // Fee is one-shot
    let err = manager
        .add_services(
            Actor::system(),
            created.booking_id,
            AddServicesInput {
                apply_matted_coat_fee: true,
                payment_method: Some(PaymentMethod::Cash),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::FeeAlreadyApplied(_)));

    // Re-sending already attached services with no fee adds nothing
    let err = manager
        .add_services(
            Actor::system(),
            created.booking_id,
            AddServicesInput {
                service_ids: vec![fixture.nail_trim, fixture.full_groom],
                payment_method: Some(PaymentMethod::Cash),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NothingToAdd));
}

#[tokio::test]
#[ignore] // Requires database
async fn test_session_lifecycle_drives_booking_status() {
    let pool = test_pool().await;
    let fixture = seed(&pool).await;
    let (manager, _, tracker) = services(&pool);

    let created = manager
        .create(Actor::system(), create_input(&fixture))
        .await
        .unwrap();

    // Ending before starting is a conflict
    let err = tracker
        .end(Actor::system(), created.booking_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NoActiveSession(_)));

    let session = tracker
        .start(Actor::system(), created.booking_id, fixture.groomer_id)
        .await
        .unwrap();
    assert!(session.end_time.is_none());

    let status: String =
        sqlx::query_scalar("SELECT status FROM walk_in_bookings WHERE id = $1")
            .bind(created.booking_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(status, "in_progress");

    // A second active session is rejected
    let err = tracker
        .start(Actor::system(), created.booking_id, fixture.groomer_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let ended = tracker.end(Actor::system(), created.booking_id).await.unwrap();
    assert_eq!(ended.booking.status, BookingStatus::Completed);
    assert!(ended.session.duration_minutes.is_some());
    assert!(ended.session.end_time.is_some());
}

#[tokio::test]
#[ignore] // Requires database
async fn test_cancel_records_metadata_and_blocks_terminal_states() {
    let pool = test_pool().await;
    let fixture = seed(&pool).await;
    let (manager, engine, _) = services(&pool);

    let created = manager
        .create(Actor::system(), create_input(&fixture))
        .await
        .unwrap();

    let cancelled = engine
        .cancel(
            Actor::system(),
            created.booking_id,
            CancelRequest {
                reason: "Owner had to leave".to_string(),
                cancelled_by: CancelledBy::Customer,
                refund_eligible: true,
            },
        )
        .await
        .unwrap();

    assert_eq!(cancelled.status, BookingStatus::Cancelled);
    assert_eq!(
        cancelled.cancellation_reason.as_deref(),
        Some("Owner had to leave")
    );
    assert_eq!(cancelled.cancelled_by, Some(CancelledBy::Customer));
    assert_eq!(cancelled.refund_eligible, Some(true));
    assert!(cancelled.cancelled_at.is_some());

    // Cancelled is terminal
    let err = engine
        .cancel(
            Actor::system(),
            created.booking_id,
            CancelRequest {
                reason: "again".to_string(),
                cancelled_by: CancelledBy::Staff,
                refund_eligible: false,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition { .. }));

    let err = engine
        .update_status(Actor::system(), created.booking_id, BookingStatus::InProgress)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition { .. }));
}

#[tokio::test]
#[ignore] // Requires database
async fn test_explicit_cancel_status_update_rejected() {
    let pool = test_pool().await;
    let fixture = seed(&pool).await;
    let (manager, engine, _) = services(&pool);

    let created = manager
        .create(Actor::system(), create_input(&fixture))
        .await
        .unwrap();

    let err = engine
        .update_status(Actor::system(), created.booking_id, BookingStatus::Cancelled)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));
}

#[tokio::test]
#[ignore] // Requires database
async fn test_reschedule_validates_slot_and_reason() {
    let pool = test_pool().await;
    let fixture = seed(&pool).await;
    let (manager, engine, _) = services(&pool);

    let created = manager
        .create(Actor::system(), create_input(&fixture))
        .await
        .unwrap();

    // Slot labels carry a nonce so reruns against the same database do
    // not collide with earlier rows
    let target_slot = format!("2:00 PM - 3:00 PM ({})", Uuid::new_v4());

    // Reason too short
    let err = engine
        .reschedule(Actor::system(), created.booking_id, &target_slot, "short")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));

    let updated = engine
        .reschedule(
            Actor::system(),
            created.booking_id,
            &target_slot,
            "groomer called in sick today",
        )
        .await
        .unwrap();
    assert_eq!(updated.time_slot, target_slot);

    // Rescheduling to the slot the booking already holds is a no-op
    let updated = engine
        .reschedule(
            Actor::system(),
            created.booking_id,
            &target_slot,
            "keeping the same slot after all",
        )
        .await
        .unwrap();
    assert_eq!(updated.time_slot, target_slot);
}

#[tokio::test]
#[ignore] // Requires database
async fn test_reschedule_into_occupied_slot_rejected() {
    let pool = test_pool().await;
    let fixture = seed(&pool).await;
    let (manager, engine, _) = services(&pool);

    let first = manager
        .create(Actor::system(), create_input(&fixture))
        .await
        .unwrap();

    // A second pet holds the afternoon slot
    let second_pet: Uuid = sqlx::query_scalar(
        "INSERT INTO pets (owner_id, name, size) VALUES ($1, 'Mochi', 'small') RETURNING id",
    )
    .bind(fixture.owner_id)
    .fetch_one(&pool)
    .await
    .unwrap();

    let taken_slot = format!("2:00 PM - 3:00 PM ({})", Uuid::new_v4());
    manager
        .create(
            Actor::system(),
            CreateBookingInput {
                pet_id: second_pet,
                service_ids: vec![fixture.full_groom],
                base_price: dec!(400.00),
                time_slot: taken_slot.clone(),
                ..create_input(&fixture)
            },
        )
        .await
        .unwrap();

    let err = engine
        .reschedule(
            Actor::system(),
            first.booking_id,
            &taken_slot,
            "customer asked for the afternoon",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::SlotTaken(_)));
}

#[tokio::test]
#[ignore] // Requires database
async fn test_session_start_rejected_after_cancel() {
    let pool = test_pool().await;
    let fixture = seed(&pool).await;
    let (manager, engine, tracker) = services(&pool);

    let created = manager
        .create(Actor::system(), create_input(&fixture))
        .await
        .unwrap();

    engine
        .cancel(
            Actor::system(),
            created.booking_id,
            CancelRequest {
                reason: "Owner had to leave".to_string(),
                cancelled_by: CancelledBy::Staff,
                refund_eligible: true,
            },
        )
        .await
        .unwrap();

    let err = tracker
        .start(Actor::system(), created.booking_id, fixture.groomer_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition { .. }));
}

#[tokio::test]
#[ignore] // Requires database
async fn test_receipt_reconciles_lines_and_payments() {
    let pool = test_pool().await;
    let fixture = seed(&pool).await;
    let (manager, _, _) = services(&pool);

    let input = CreateBookingInput {
        service_ids: vec![fixture.full_groom],
        base_price: dec!(700.00),
        ..create_input(&fixture)
    };
    let created = manager.create(Actor::system(), input).await.unwrap();

    manager
        .add_services(
            Actor::system(),
            created.booking_id,
            AddServicesInput {
                service_ids: vec![fixture.nail_trim],
                payment_method: Some(PaymentMethod::Gcash),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let receipt = ReceiptService::new(pool.clone())
        .for_booking(created.booking_id)
        .await
        .unwrap();

    assert_eq!(receipt.items.len(), 2);
    assert!(receipt.items.iter().any(|i| i.is_addon));
    assert_eq!(receipt.payments.len(), 2);
    assert_eq!(receipt.total_amount, dec!(850.00));
    assert_eq!(receipt.total_paid, dec!(850.00));
}
