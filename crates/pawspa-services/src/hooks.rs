//! Post-commit side-effect hooks
//!
//! Notifications and activity logging run strictly after the primary
//! transaction commits. The registry swallows hook failures after
//! logging them, so a broken sink can never fail or roll back a booking
//! workflow. That contract is structural: workflows only ever hand a
//! finished event to `PostCommitHooks::dispatch`.

use async_trait::async_trait;
use pawspa_db::PgActivityLogRepository;
use pawspa_core::{
    models::{ActivityLogData, BookingStatus, CancelledBy},
    traits::NotificationSink,
    AppError, AppResult,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Who performed an operation, as reported by the identity middleware
#[derive(Debug, Clone)]
pub struct Actor {
    pub user_id: Option<i32>,
    pub name: String,
    pub role: String,
}

impl Actor {
    /// Actor for internal/system-initiated events
    pub fn system() -> Self {
        Self {
            user_id: None,
            name: "system".to_string(),
            role: "system".to_string(),
        }
    }
}

/// Completed workflow outcomes handed to the hooks
#[derive(Debug, Clone)]
pub enum BookingEvent {
    Created {
        actor: Actor,
        booking_id: Uuid,
        owner_id: i32,
        queue_number: i32,
        total_amount: Decimal,
    },
    ServicesAdded {
        actor: Actor,
        booking_id: Uuid,
        owner_id: i32,
        added_services: usize,
        fee_added: Decimal,
        new_total: Decimal,
    },
    StatusChanged {
        actor: Actor,
        booking_id: Uuid,
        owner_id: i32,
        from: BookingStatus,
        to: BookingStatus,
    },
    Cancelled {
        actor: Actor,
        booking_id: Uuid,
        owner_id: i32,
        reason: String,
        cancelled_by: CancelledBy,
        refund_eligible: bool,
    },
    Rescheduled {
        actor: Actor,
        booking_id: Uuid,
        owner_id: i32,
        old_slot: String,
        new_slot: String,
        reason: String,
    },
    SessionStarted {
        actor: Actor,
        booking_id: Uuid,
        owner_id: i32,
        groomer_id: i32,
    },
    SessionCompleted {
        actor: Actor,
        booking_id: Uuid,
        owner_id: i32,
        duration_minutes: i32,
    },
}

impl BookingEvent {
    pub fn actor(&self) -> &Actor {
        match self {
            BookingEvent::Created { actor, .. }
            | BookingEvent::ServicesAdded { actor, .. }
            | BookingEvent::StatusChanged { actor, .. }
            | BookingEvent::Cancelled { actor, .. }
            | BookingEvent::Rescheduled { actor, .. }
            | BookingEvent::SessionStarted { actor, .. }
            | BookingEvent::SessionCompleted { actor, .. } => actor,
        }
    }

    pub fn booking_id(&self) -> Uuid {
        match self {
            BookingEvent::Created { booking_id, .. }
            | BookingEvent::ServicesAdded { booking_id, .. }
            | BookingEvent::StatusChanged { booking_id, .. }
            | BookingEvent::Cancelled { booking_id, .. }
            | BookingEvent::Rescheduled { booking_id, .. }
            | BookingEvent::SessionStarted { booking_id, .. }
            | BookingEvent::SessionCompleted { booking_id, .. } => *booking_id,
        }
    }

    pub fn owner_id(&self) -> i32 {
        match self {
            BookingEvent::Created { owner_id, .. }
            | BookingEvent::ServicesAdded { owner_id, .. }
            | BookingEvent::StatusChanged { owner_id, .. }
            | BookingEvent::Cancelled { owner_id, .. }
            | BookingEvent::Rescheduled { owner_id, .. }
            | BookingEvent::SessionStarted { owner_id, .. }
            | BookingEvent::SessionCompleted { owner_id, .. } => *owner_id,
        }
    }

    /// Short action tag for the activity log
    pub fn action(&self) -> &'static str {
        match self {
            BookingEvent::Created { .. } => "booking_created",
            BookingEvent::ServicesAdded { .. } => "services_added",
            BookingEvent::StatusChanged { .. } => "status_changed",
            BookingEvent::Cancelled { .. } => "booking_cancelled",
            BookingEvent::Rescheduled { .. } => "booking_rescheduled",
            BookingEvent::SessionStarted { .. } => "session_started",
            BookingEvent::SessionCompleted { .. } => "session_completed",
        }
    }

    /// Human-readable title and message for notifications
    pub fn notification(&self) -> (String, String) {
        match self {
            BookingEvent::Created {
                queue_number,
                total_amount,
                ..
            } => (
                "Booking confirmed".to_string(),
                format!(
                    "Your walk-in booking is queued at number {}. Total: {}",
                    queue_number, total_amount
                ),
            ),
            BookingEvent::ServicesAdded {
                added_services,
                new_total,
                ..
            } => (
                "Services added".to_string(),
                format!(
                    "{} service(s) added to your booking. New total: {}",
                    added_services, new_total
                ),
            ),
            BookingEvent::StatusChanged { to, .. } => (
                "Booking updated".to_string(),
                format!("Your booking is now {}", to),
            ),
            BookingEvent::Cancelled { reason, .. } => (
                "Booking cancelled".to_string(),
                format!("Your booking was cancelled: {}", reason),
            ),
            BookingEvent::Rescheduled { new_slot, .. } => (
                "Booking rescheduled".to_string(),
                format!("Your booking was moved to {}", new_slot),
            ),
            BookingEvent::SessionStarted { .. } => (
                "Grooming started".to_string(),
                "Your pet's grooming session has started".to_string(),
            ),
            BookingEvent::SessionCompleted {
                duration_minutes, ..
            } => (
                "Grooming finished".to_string(),
                format!(
                    "Your pet's grooming session finished after {} minutes",
                    duration_minutes
                ),
            ),
        }
    }
}

/// A single post-commit side effect
#[async_trait]
pub trait PostCommitHook: Send + Sync {
    /// Hook name for failure logging
    fn name(&self) -> &'static str;

    /// Handle one event; errors are logged and swallowed by the registry
    async fn handle(&self, event: &BookingEvent) -> AppResult<()>;
}

/// Ordered list of hooks dispatched after each committed workflow
#[derive(Default)]
pub struct PostCommitHooks {
    hooks: Vec<Arc<dyn PostCommitHook>>,
}

impl PostCommitHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hook; dispatch order follows registration order
    pub fn register(mut self, hook: Arc<dyn PostCommitHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Run every hook for the event. Failures are logged at warn and
    /// swallowed; the primary workflow already committed.
    pub async fn dispatch(&self, event: BookingEvent) {
        for hook in &self.hooks {
            if let Err(e) = hook.handle(&event).await {
                warn!(
                    "Post-commit hook '{}' failed for {} on booking {}: {}",
                    hook.name(),
                    event.action(),
                    event.booking_id(),
                    e
                );
            }
        }
    }
}

/// Appends one activity log row per event
pub struct ActivityLogHook {
    repo: PgActivityLogRepository,
}

impl ActivityLogHook {
    pub fn new(repo: PgActivityLogRepository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl PostCommitHook for ActivityLogHook {
    fn name(&self) -> &'static str {
        "activity_log"
    }

    async fn handle(&self, event: &BookingEvent) -> AppResult<()> {
        let actor = event.actor();
        let (_, details) = event.notification();

        self.repo
            .create(ActivityLogData {
                user_id: actor.user_id,
                username: actor.name.clone(),
                role: actor.role.clone(),
                action: event.action().to_string(),
                entity_type: "walk_in_booking".to_string(),
                entity_id: Some(event.booking_id().to_string()),
                details: Some(details),
            })
            .await?;

        Ok(())
    }
}

/// Builds a title+message per event and hands it to the notification sink
pub struct NotificationHook {
    sink: Arc<dyn NotificationSink>,
}

impl NotificationHook {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }
}

#[async_trait]
impl PostCommitHook for NotificationHook {
    fn name(&self) -> &'static str {
        "notification"
    }

    async fn handle(&self, event: &BookingEvent) -> AppResult<()> {
        let (title, message) = event.notification();
        self.sink.notify(event.owner_id(), &title, &message).await
    }
}

/// Default notification sink: logs the notification and succeeds.
///
/// Deployments wire a real delivery service here; the core only needs
/// the seam.
pub struct TracingNotifier;

#[async_trait]
impl NotificationSink for TracingNotifier {
    async fn notify(&self, recipient_id: i32, title: &str, message: &str) -> Result<(), AppError> {
        info!(
            "Notification for user {}: {} - {}",
            recipient_id, title, message
        );
        Ok(())
    }
}
