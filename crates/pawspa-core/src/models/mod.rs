//! Domain models for the PawSpa grooming backend

pub mod activity;
pub mod booking;
pub mod payment;
pub mod pet;
pub mod rating;
pub mod service;
pub mod session;

pub use activity::{ActivityLog, ActivityLogData};
pub use booking::{
    BookingConflict, BookingStatus, BookingType, CancelledBy, PaymentMethod, WalkInBooking,
};
pub use payment::{PaymentRecord, PaymentType};
pub use pet::{Pet, PetSize};
pub use rating::BookingRating;
pub use service::{lines_subtotal, BookingServiceLine, GroomService};
pub use session::{GroomingSession, SessionStatus};
