//! Grooming session DTOs

use chrono::{DateTime, Utc};
use pawspa_core::models::{GroomingSession, SessionStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request body for starting a session
#[derive(Debug, Clone, Deserialize)]
pub struct StartSessionRequest {
    pub groomer_id: i32,
}

/// Session representation returned by the API
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub groomer_id: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i32>,
    pub status: SessionStatus,
}

impl From<GroomingSession> for SessionResponse {
    fn from(s: GroomingSession) -> Self {
        Self {
            id: s.id,
            booking_id: s.booking_id,
            groomer_id: s.groomer_id,
            start_time: s.start_time,
            end_time: s.end_time,
            duration_minutes: s.duration_minutes,
            status: s.status,
        }
    }
}
