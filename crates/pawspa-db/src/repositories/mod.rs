//! Repository implementations
//!
//! Concrete sqlx-backed repositories for all domain entities. Reads and
//! single-statement writes live here; multi-statement workflows own
//! their transactions in the services crate.

pub mod activity_repo;
pub mod booking_repo;
pub mod payment_repo;
pub mod pet_repo;
pub mod rating_repo;
pub mod service_repo;

pub use activity_repo::PgActivityLogRepository;
pub use booking_repo::{BookingRow, PgBookingRepository, ServiceLineRow, BOOKING_COLUMNS};
pub use payment_repo::PgPaymentRepository;
pub use pet_repo::PgPetRepository;
pub use rating_repo::PgRatingRepository;
pub use service_repo::PgServiceRepository;
