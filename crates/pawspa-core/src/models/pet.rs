//! Pet model and the enumerated size scale
//!
//! Pet size is the key into every service's price table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Enumerated pet sizes, smallest to largest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PetSize {
    Xs,
    Small,
    #[default]
    Medium,
    Large,
    Xl,
    Xxl,
}

impl fmt::Display for PetSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PetSize::Xs => write!(f, "xs"),
            PetSize::Small => write!(f, "small"),
            PetSize::Medium => write!(f, "medium"),
            PetSize::Large => write!(f, "large"),
            PetSize::Xl => write!(f, "xl"),
            PetSize::Xxl => write!(f, "xxl"),
        }
    }
}

impl PetSize {
    /// Parse from string, accepting common aliases from intake forms
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "xs" | "extra_small" | "extra-small" => Some(PetSize::Xs),
            "small" | "s" => Some(PetSize::Small),
            "medium" | "m" => Some(PetSize::Medium),
            "large" | "l" => Some(PetSize::Large),
            "xl" | "extra_large" | "extra-large" => Some(PetSize::Xl),
            "xxl" => Some(PetSize::Xxl),
            _ => None,
        }
    }

    /// All sizes in ascending order
    pub fn all() -> [PetSize; 6] {
        [
            PetSize::Xs,
            PetSize::Small,
            PetSize::Medium,
            PetSize::Large,
            PetSize::Xl,
            PetSize::Xxl,
        ]
    }
}

/// Pet entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pet {
    /// Unique identifier (UUID)
    pub id: Uuid,

    /// Owning customer
    pub owner_id: i32,

    /// Pet name
    pub name: String,

    /// Size bracket used for pricing
    pub size: PetSize,

    /// Breed, if recorded
    pub breed: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_parsing() {
        assert_eq!(PetSize::from_str("Medium"), Some(PetSize::Medium));
        assert_eq!(PetSize::from_str("XL"), Some(PetSize::Xl));
        assert_eq!(PetSize::from_str("extra_small"), Some(PetSize::Xs));
        assert_eq!(PetSize::from_str("giant"), None);
    }

    #[test]
    fn test_size_display_roundtrip() {
        for size in PetSize::all() {
            assert_eq!(PetSize::from_str(&size.to_string()), Some(size));
        }
    }
}
