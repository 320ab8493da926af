//! Booking manager service
//!
//! Orchestrates the two multi-statement booking workflows:
//! - Creation: conflict check, pricing, queue allocation, booking +
//!   payment + service line inserts, all in one transaction. The quoted
//!   base price must equal the resolved line total or nothing commits.
//! - Add-on: dedup against existing lines, addon line inserts, optional
//!   matted-coat fee, one incremental payment, total reconciliation
//!
//! Both workflows recheck `total_amount = SUM(line prices) + fee` on the
//! stored row before committing.
//!
//! Queue numbers are read-max-plus-one inside the transaction; the
//! unique (day, queue_number) index turns the race into a unique
//! violation, which is retried a bounded number of times.

use pawspa_core::{
    models::{PaymentMethod, PetSize, WalkInBooking},
    AppError, AppResult,
};
use pawspa_db::{BookingRow, PgPetRepository};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::conflict::ConflictChecker;
use crate::constants::{DEFAULT_MATTED_COAT_FEE, QUEUE_RETRY_ATTEMPTS};
use crate::hooks::{Actor, BookingEvent, PostCommitHooks};
use crate::pricing::PricingResolver;

/// Marker used to recognize a queue-number collision inside the retry loop
const QUEUE_COLLISION: &str = "queue_number_collision";

/// Input for the booking creation workflow
#[derive(Debug, Clone)]
pub struct CreateBookingInput {
    pub pet_id: Uuid,
    pub owner_id: i32,
    pub groomer_id: i32,
    pub service_ids: Vec<Uuid>,
    pub base_price: Decimal,
    pub matted_coat_fee: Option<Decimal>,
    pub special_notes: Option<String>,
    pub time_slot: String,
    pub payment_method: PaymentMethod,
}

/// Result of a successful creation
#[derive(Debug, Clone)]
pub struct CreatedBooking {
    pub booking_id: Uuid,
    pub queue_number: i32,
    pub total_amount: Decimal,
}

/// Input for the add-on workflow
#[derive(Debug, Clone, Default)]
pub struct AddServicesInput {
    pub service_ids: Vec<Uuid>,
    pub payment_method: Option<PaymentMethod>,
    pub apply_matted_coat_fee: bool,
    pub matted_coat_fee: Option<Decimal>,
}

/// Result of a successful add-on call
#[derive(Debug, Clone)]
pub struct AddOnOutcome {
    pub added_services: usize,
    pub fee_added: Decimal,
    pub new_total: Decimal,
}

/// Booking creation and add-on workflows
pub struct BookingManager {
    pool: PgPool,
    conflict: ConflictChecker,
    pets: PgPetRepository,
    hooks: Arc<PostCommitHooks>,
    default_fee: Decimal,
    queue_retries: u32,
}

impl BookingManager {
    /// Create a new booking manager
    pub fn new(pool: PgPool, hooks: Arc<PostCommitHooks>) -> Self {
        Self {
            conflict: ConflictChecker::new(pool.clone()),
            pets: PgPetRepository::new(pool.clone()),
            pool,
            hooks,
            default_fee: DEFAULT_MATTED_COAT_FEE,
            queue_retries: QUEUE_RETRY_ATTEMPTS,
        }
    }

    /// Override the default matted-coat fee (from configuration)
    pub fn with_default_fee(mut self, fee: Decimal) -> Self {
        self.default_fee = fee;
        self
    }

    /// Override the queue allocation retry budget (from configuration)
    pub fn with_queue_retries(mut self, retries: u32) -> Self {
        self.queue_retries = retries;
        self
    }

    // ==================== Creation workflow ====================

    /// Create a walk-in booking atomically.
    ///
    /// Validation and the conflict check run before any write. The
    /// booking row, initial payment, and all service lines are inserted
    /// in one transaction; any failure rolls everything back.
    #[instrument(skip(self, input), fields(pet_id = %input.pet_id))]
    pub async fn create(&self, actor: Actor, input: CreateBookingInput) -> AppResult<CreatedBooking> {
        let service_ids = Self::validate_create(&input)?;

        // Check-then-act: two concurrent creations for the same pet can
        // both pass this before either commits.
        if let Some(conflict) = self.conflict.active_conflict(input.pet_id).await? {
            warn!(
                "Pet {} already has an active booking {}",
                input.pet_id, conflict.booking_id
            );
            return Err(AppError::BookingConflict(conflict));
        }

        let pet_size = self.pet_size(input.pet_id).await?;

        let fee = input.matted_coat_fee.unwrap_or(Decimal::ZERO);

        let mut attempt = 0;
        let created = loop {
            match self.try_create_tx(&input, &service_ids, pet_size, fee).await {
                Ok(created) => break created,
                Err(AppError::Conflict(msg)) if msg == QUEUE_COLLISION => {
                    attempt += 1;
                    if attempt > self.queue_retries {
                        error!("Queue number allocation kept colliding; giving up");
                        return Err(AppError::Transaction(
                            "Could not allocate a queue number".to_string(),
                        ));
                    }
                    debug!("Queue number collision, retry {}", attempt);
                }
                Err(e) => return Err(e),
            }
        };

        info!(
            "Created booking {} with queue number {} (total {})",
            created.booking_id, created.queue_number, created.total_amount
        );

        self.hooks
            .dispatch(BookingEvent::Created {
                actor,
                booking_id: created.booking_id,
                owner_id: input.owner_id,
                queue_number: created.queue_number,
                total_amount: created.total_amount,
            })
            .await;

        Ok(created)
    }

    /// Validate creation input before any store access; returns the
    /// deduplicated service list.
    fn validate_create(input: &CreateBookingInput) -> AppResult<Vec<Uuid>> {
        if input.service_ids.is_empty() {
            return Err(AppError::MissingField("services".to_string()));
        }
        if input.time_slot.trim().is_empty() {
            return Err(AppError::MissingField("time_slot".to_string()));
        }
        if input.base_price < Decimal::ZERO {
            return Err(AppError::InvalidInput(
                "base_price must not be negative".to_string(),
            ));
        }
        if input.matted_coat_fee.is_some_and(|f| f < Decimal::ZERO) {
            return Err(AppError::InvalidInput(
                "matted_coat_fee must not be negative".to_string(),
            ));
        }

        Ok(dedup_preserving_order(&input.service_ids))
    }

    async fn try_create_tx(
        &self,
        input: &CreateBookingInput,
        service_ids: &[Uuid],
        pet_size: PetSize,
        fee: Decimal,
    ) -> AppResult<CreatedBooking> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            error!("Failed to start transaction: {}", e);
            AppError::Transaction(format!("Failed to start transaction: {}", e))
        })?;

        // Resolve every service at the pet's size before writing anything;
        // the front desk quote has to match what the catalog prices.
        let mut lines = Vec::with_capacity(service_ids.len());
        let mut line_total = Decimal::ZERO;
        for service_id in service_ids {
            let service = fetch_service(&mut tx, *service_id).await?;
            let price = PricingResolver::resolve(&service, pet_size);
            line_total += price;
            lines.push((*service_id, price));
        }

        if line_total != input.base_price {
            warn!(
                "Quoted base price {} does not match priced services total {}",
                input.base_price, line_total
            );
            return Err(AppError::InvalidInput(format!(
                "base_price {} does not match the priced services total {}",
                input.base_price, line_total
            )));
        }

        let total_amount = line_total + fee;

        // Next queue number for today; the unique index arbitrates races
        let queue_number: i32 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(MAX(queue_number), 0) + 1
            FROM walk_in_bookings
            WHERE created_at::date = CURRENT_DATE
            "#,
        )
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            error!("Failed to allocate queue number: {}", e);
            AppError::Database(format!("Failed to allocate queue number: {}", e))
        })?;

        let booking_id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO walk_in_bookings (
                id, pet_id, owner_id, groomer_id, status, queue_number,
                time_slot, base_price, matted_coat_fee, total_amount,
                payment_method, payment_status, special_notes
            )
            VALUES ($1, $2, $3, $4, 'pending', $5, $6, $7, $8, $9, $10, 'paid', $11)
            "#,
        )
        .bind(booking_id)
        .bind(input.pet_id)
        .bind(input.owner_id)
        .bind(input.groomer_id)
        .bind(queue_number)
        .bind(&input.time_slot)
        .bind(input.base_price)
        .bind(fee)
        .bind(total_amount)
        .bind(input.payment_method.to_string())
        .bind(&input.special_notes)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::Conflict(QUEUE_COLLISION.to_string());
                }
            }
            error!("Failed to insert booking: {}", e);
            AppError::Database(format!("Failed to create booking: {}", e))
        })?;

        // One initial payment covering every requested service
        sqlx::query(
            r#"
            INSERT INTO booking_payments (
                booking_id, payment_method, amount, payment_type, covered_service_ids
            )
            VALUES ($1, $2, $3, 'initial', $4)
            "#,
        )
        .bind(booking_id)
        .bind(input.payment_method.to_string())
        .bind(total_amount)
        .bind(service_ids)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!("Failed to insert initial payment: {}", e);
            AppError::Database(format!("Failed to record payment: {}", e))
        })?;

        // Freeze each resolved price on its line
        for (service_id, price) in &lines {
            sqlx::query(
                r#"
                INSERT INTO booking_services (booking_id, service_id, price, is_addon)
                VALUES ($1, $2, $3, FALSE)
                "#,
            )
            .bind(booking_id)
            .bind(service_id)
            .bind(price)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!("Failed to insert service line: {}", e);
                AppError::Database(format!("Failed to attach service: {}", e))
            })?;
        }

        verify_booking_totals(&mut tx, booking_id).await?;

        tx.commit().await.map_err(|e| {
            error!("Failed to commit booking creation: {}", e);
            AppError::Transaction(format!("Failed to commit transaction: {}", e))
        })?;

        Ok(CreatedBooking {
            booking_id,
            queue_number,
            total_amount,
        })
    }

    // ==================== Add-on workflow ====================

    /// Extend a booking with more services and/or the matted-coat fee.
    ///
    /// All preconditions are checked before any write; line inserts, the
    /// fee update, the addon payment, and the total increment commit or
    /// roll back together.
    #[instrument(skip(self, input), fields(booking_id = %booking_id))]
    pub async fn add_services(
        &self,
        actor: Actor,
        booking_id: Uuid,
        input: AddServicesInput,
    ) -> AppResult<AddOnOutcome> {
        if input.matted_coat_fee.is_some_and(|f| f < Decimal::ZERO) {
            return Err(AppError::InvalidInput(
                "matted_coat_fee must not be negative".to_string(),
            ));
        }

        let requested = dedup_preserving_order(&input.service_ids);

        let mut tx = self.pool.begin().await.map_err(|e| {
            error!("Failed to start transaction: {}", e);
            AppError::Transaction(format!("Failed to start transaction: {}", e))
        })?;

        // Lock the booking row for the duration of the reconciliation
        let booking: WalkInBooking = sqlx::query_as::<sqlx::Postgres, BookingRow>(&format!(
            "SELECT {} FROM walk_in_bookings WHERE id = $1 FOR UPDATE",
            pawspa_db::BOOKING_COLUMNS
        ))
        .bind(booking_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            error!("Failed to lock booking {}: {}", booking_id, e);
            AppError::Database(format!("Failed to load booking: {}", e))
        })?
        .ok_or_else(|| AppError::BookingNotFound(booking_id.to_string()))?
        .into();

        if booking.status.is_terminal() {
            return Err(AppError::Conflict(format!(
                "Cannot add services to a {} booking",
                booking.status
            )));
        }

        if input.apply_matted_coat_fee && booking.matted_coat_fee != Decimal::ZERO {
            return Err(AppError::FeeAlreadyApplied(booking_id.to_string()));
        }

        // Dedup against every existing line, addon or not
        let existing: Vec<Uuid> =
            sqlx::query_scalar("SELECT service_id FROM booking_services WHERE booking_id = $1")
                .bind(booking_id)
                .fetch_all(&mut *tx)
                .await
                .map_err(|e| {
                    error!("Failed to list existing lines: {}", e);
                    AppError::Database(format!("Failed to load booking services: {}", e))
                })?;

        let new_ids: Vec<Uuid> = requested
            .into_iter()
            .filter(|id| !existing.contains(id))
            .collect();

        if new_ids.is_empty() && !input.apply_matted_coat_fee {
            return Err(AppError::NothingToAdd);
        }

        let payment_method = match input.payment_method {
            Some(m) => m,
            None => return Err(AppError::MissingField("payment_method".to_string())),
        };

        let pet_size = self.pet_size(booking.pet_id).await?;

        let mut addon_subtotal = Decimal::ZERO;
        for service_id in &new_ids {
            let service = fetch_service(&mut tx, *service_id).await?;
            let price = PricingResolver::resolve(&service, pet_size);

            sqlx::query(
                r#"
                INSERT INTO booking_services (booking_id, service_id, price, is_addon)
                VALUES ($1, $2, $3, TRUE)
                "#,
            )
            .bind(booking_id)
            .bind(service_id)
            .bind(price)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!("Failed to insert addon line: {}", e);
                AppError::Database(format!("Failed to attach service: {}", e))
            })?;

            addon_subtotal += price;
        }

        let fee_added = if input.apply_matted_coat_fee {
            let amount = input.matted_coat_fee.unwrap_or(self.default_fee);
            addon_subtotal += amount;
            amount
        } else {
            Decimal::ZERO
        };

        if addon_subtotal > Decimal::ZERO {
            sqlx::query(
                r#"
                INSERT INTO booking_payments (
                    booking_id, payment_method, amount, payment_type, covered_service_ids
                )
                VALUES ($1, $2, $3, 'addon', $4)
                "#,
            )
            .bind(booking_id)
            .bind(payment_method.to_string())
            .bind(addon_subtotal)
            .bind(&new_ids)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!("Failed to insert addon payment: {}", e);
                AppError::Database(format!("Failed to record payment: {}", e))
            })?;
        }

        sqlx::query(
            r#"
            UPDATE walk_in_bookings
            SET matted_coat_fee = matted_coat_fee + $2,
                total_amount = total_amount + $3,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(booking_id)
        .bind(fee_added)
        .bind(addon_subtotal)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!("Failed to update booking totals: {}", e);
            AppError::Database(format!("Failed to update booking: {}", e))
        })?;

        verify_booking_totals(&mut tx, booking_id).await?;

        tx.commit().await.map_err(|e| {
            error!("Failed to commit add-on: {}", e);
            AppError::Transaction(format!("Failed to commit transaction: {}", e))
        })?;

        let new_total = booking.total_amount + addon_subtotal;

        info!(
            "Added {} service(s) and fee {} to booking {} (new total {})",
            new_ids.len(),
            fee_added,
            booking_id,
            new_total
        );

        self.hooks
            .dispatch(BookingEvent::ServicesAdded {
                actor,
                booking_id,
                owner_id: booking.owner_id,
                added_services: new_ids.len(),
                fee_added,
                new_total,
            })
            .await;

        Ok(AddOnOutcome {
            added_services: new_ids.len(),
            fee_added,
            new_total,
        })
    }

    // ==================== Helpers ====================

    async fn pet_size(&self, pet_id: Uuid) -> AppResult<PetSize> {
        let pet = self
            .pets
            .find_by_id(pet_id)
            .await?
            .ok_or_else(|| AppError::PetNotFound(pet_id.to_string()))?;

        Ok(pet.size)
    }
}

/// Recheck `total_amount = SUM(line prices) + matted_coat_fee` on the
/// stored row; a divergence aborts the transaction before commit.
async fn verify_booking_totals(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    booking_id: Uuid,
) -> AppResult<()> {
    let (total, fee, line_sum): (Decimal, Decimal, Decimal) = sqlx::query_as(
        r#"
        SELECT b.total_amount, b.matted_coat_fee,
               COALESCE((SELECT SUM(price) FROM booking_services WHERE booking_id = b.id), 0)
        FROM walk_in_bookings b
        WHERE b.id = $1
        "#,
    )
    .bind(booking_id)
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| {
        error!("Failed to recheck booking totals: {}", e);
        AppError::Database(format!("Failed to verify booking totals: {}", e))
    })?;

    if total != line_sum + fee {
        error!(
            "Booking {} totals out of sync: total {} != lines {} + fee {}",
            booking_id, total, line_sum, fee
        );
        return Err(AppError::Internal(format!(
            "Booking {} total {} does not equal its line total {} plus fee {}",
            booking_id, total, line_sum, fee
        )));
    }

    Ok(())
}

/// Load a catalog service inside a transaction; missing ids abort the
/// workflow and roll everything back.
async fn fetch_service(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    service_id: Uuid,
) -> AppResult<pawspa_core::models::GroomService> {
    let row = sqlx::query_as::<sqlx::Postgres, ServiceRow>(
        r#"
        SELECT id, name, description,
               price_xs, price_small, price_medium,
               price_large, price_xl, price_xxl,
               active, created_at
        FROM groom_services
        WHERE id = $1
        "#,
    )
    .bind(service_id)
    .fetch_optional(&mut **tx)
    .await
    .map_err(|e| {
        error!("Failed to load service {}: {}", service_id, e);
        AppError::Database(format!("Failed to load service: {}", e))
    })?
    .ok_or_else(|| AppError::ServiceNotFound(service_id.to_string()))?;

    Ok(row.into())
}

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
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<ServiceRow> for pawspa_core::models::GroomService {
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

/// Deduplicate ids keeping first-seen order
fn dedup_preserving_order(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = Vec::with_capacity(ids.len());
    for id in ids {
        if !seen.contains(id) {
            seen.push(*id);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_dedup_preserving_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let deduped = dedup_preserving_order(&[a, b, a, b, a]);
        assert_eq!(deduped, vec![a, b]);
    }

    #[test]
    fn test_validate_create_rejects_empty_services() {
        let input = CreateBookingInput {
            pet_id: Uuid::new_v4(),
            owner_id: 1,
            groomer_id: 2,
            service_ids: vec![],
            base_price: dec!(500.00),
            matted_coat_fee: None,
            special_notes: None,
            time_slot: "10:00 AM - 11:00 AM".to_string(),
            payment_method: PaymentMethod::Cash,
        };

        let err = BookingManager::validate_create(&input).unwrap_err();
        assert!(matches!(err, AppError::MissingField(f) if f == "services"));
    }

    #[test]
    fn test_validate_create_rejects_blank_slot() {
        let input = CreateBookingInput {
            pet_id: Uuid::new_v4(),
            owner_id: 1,
            groomer_id: 2,
            service_ids: vec![Uuid::new_v4()],
            base_price: dec!(500.00),
            matted_coat_fee: None,
            special_notes: None,
            time_slot: "   ".to_string(),
            payment_method: PaymentMethod::Gcash,
        };

        let err = BookingManager::validate_create(&input).unwrap_err();
        assert!(matches!(err, AppError::MissingField(f) if f == "time_slot"));
    }

    #[test]
    fn test_validate_create_rejects_negative_amounts() {
        let mut input = CreateBookingInput {
            pet_id: Uuid::new_v4(),
            owner_id: 1,
            groomer_id: 2,
            service_ids: vec![Uuid::new_v4()],
            base_price: dec!(-1.00),
            matted_coat_fee: None,
            special_notes: None,
            time_slot: "10:00 AM - 11:00 AM".to_string(),
            payment_method: PaymentMethod::Cash,
        };
        assert!(BookingManager::validate_create(&input).is_err());

        input.base_price = dec!(500.00);
        input.matted_coat_fee = Some(dec!(-80.00));
        assert!(BookingManager::validate_create(&input).is_err());
    }

    #[test]
    fn test_validate_create_dedups_services() {
        let a = Uuid::new_v4();
        let input = CreateBookingInput {
            pet_id: Uuid::new_v4(),
            owner_id: 1,
            groomer_id: 2,
            service_ids: vec![a, a],
            base_price: dec!(500.00),
            matted_coat_fee: Some(dec!(80.00)),
            special_notes: None,
            time_slot: "10:00 AM - 11:00 AM".to_string(),
            payment_method: PaymentMethod::Cash,
        };

        assert_eq!(BookingManager::validate_create(&input).unwrap(), vec![a]);
    }
}
