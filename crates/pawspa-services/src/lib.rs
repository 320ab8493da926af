//! Business logic workflows for the PawSpa grooming backend
//!
//! This crate contains the services that orchestrate the walk-in booking
//! lifecycle: atomic creation, add-on reconciliation, grooming session
//! timing, and status transitions.
//!
//! # Architecture
//!
//! Services are designed to be composable and testable:
//! - Multi-statement workflows run inside a single transaction and roll
//!   back entirely on any failure
//! - Booking status is only ever written by the `StatusEngine`
//! - Side effects (activity log, notifications) are post-commit hooks
//!   that can never fail the primary operation
//! - All operations are instrumented with tracing
//!
//! # Services
//!
//! - `BookingManager` - atomic booking creation and add-on workflows
//! - `StatusEngine` - status transitions, cancellation, rescheduling
//! - `SessionTracker` - timed grooming session start/end
//! - `ConflictChecker` - cross-booking-type active-booking detection
//! - `PricingResolver` - size-keyed price resolution with fallback
//! - `ReceiptService` - receipt data assembly from booking records
//! - `PostCommitHooks` - best-effort side-effect dispatch

pub mod booking_manager;
pub mod conflict;
pub mod hooks;
pub mod pricing;
pub mod receipt;
pub mod session_tracker;
pub mod status;

pub use booking_manager::{
    AddOnOutcome, AddServicesInput, BookingManager, CreateBookingInput, CreatedBooking,
};
pub use conflict::ConflictChecker;
pub use hooks::{
    ActivityLogHook, Actor, BookingEvent, NotificationHook, PostCommitHook, PostCommitHooks,
    TracingNotifier,
};
pub use pricing::PricingResolver;
pub use receipt::{Receipt, ReceiptItem, ReceiptPayment, ReceiptService};
pub use session_tracker::{EndedSession, SessionTracker};
pub use status::{CancelRequest, StatusEngine};

/// Business logic constants
pub mod constants {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    /// Matted coat fee applied when no explicit amount is provided
    pub const DEFAULT_MATTED_COAT_FEE: Decimal = dec!(100.00);

    /// Retries for queue-number unique-index collisions
    pub const QUEUE_RETRY_ATTEMPTS: u32 = 3;

    /// Minimum characters required in a reschedule reason
    pub const MIN_RESCHEDULE_REASON_LEN: usize = 10;
}
