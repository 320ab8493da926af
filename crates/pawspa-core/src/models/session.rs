//! Grooming session model
//!
//! A session is the timed interval a groomer spends on one booking. A
//! booking may accumulate several completed sessions over its life but
//! at most one active session at a time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Grooming session status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Groomer is working; end_time is unset
    #[default]
    Active,
    /// Session ended; duration derived
    Completed,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Active => write!(f, "active"),
            SessionStatus::Completed => write!(f, "completed"),
        }
    }
}

impl SessionStatus {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(SessionStatus::Active),
            "completed" => Some(SessionStatus::Completed),
            _ => None,
        }
    }
}

/// Grooming session entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroomingSession {
    /// Unique identifier (UUID)
    pub id: Uuid,

    /// Owning booking
    pub booking_id: Uuid,

    /// Groomer running the session
    pub groomer_id: i32,

    /// When the groomer started
    pub start_time: DateTime<Utc>,

    /// When the groomer finished; None while active
    pub end_time: Option<DateTime<Utc>>,

    /// Derived minutes, rounded to nearest
    pub duration_minutes: Option<i32>,

    /// Current status
    pub status: SessionStatus,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl GroomingSession {
    /// Derive the rounded duration in minutes between two instants
    pub fn minutes_between(start: DateTime<Utc>, end: DateTime<Utc>) -> i32 {
        let seconds = (end - start).num_seconds().max(0);
        ((seconds as f64) / 60.0).round() as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_duration_rounding() {
        let start = Utc::now();

        assert_eq!(
            GroomingSession::minutes_between(start, start + Duration::minutes(45)),
            45
        );
        // 29 seconds rounds down, 31 rounds up
        assert_eq!(
            GroomingSession::minutes_between(start, start + Duration::seconds(29)),
            0
        );
        assert_eq!(
            GroomingSession::minutes_between(start, start + Duration::seconds(31)),
            1
        );
        assert_eq!(
            GroomingSession::minutes_between(
                start,
                start + Duration::minutes(44) + Duration::seconds(40)
            ),
            45
        );
    }

    #[test]
    fn test_negative_interval_clamps_to_zero() {
        let start = Utc::now();
        let earlier = start - Duration::minutes(5);
        assert_eq!(GroomingSession::minutes_between(start, earlier), 0);
    }
}
