//! HTTP handlers

pub mod booking;
pub mod catalog;
pub mod customer;
pub mod health;
pub mod session;

pub use booking::configure as configure_bookings;
pub use catalog::configure as configure_catalog;
pub use customer::configure as configure_customer;
pub use health::configure as configure_health;
pub use session::configure as configure_sessions;
