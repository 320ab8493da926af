//! Activity log model
//!
//! Append-only audit trail written by the post-commit hooks. Aggregation
//! and reporting over these rows live outside this backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored activity log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityLog {
    pub id: i64,
    pub user_id: Option<i32>,
    pub username: String,
    pub role: String,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Data for creating an activity log entry
#[derive(Debug, Clone)]
pub struct ActivityLogData {
    pub user_id: Option<i32>,
    pub username: String,
    pub role: String,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub details: Option<String>,
}
