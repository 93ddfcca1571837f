//! Car domain entity

use chrono::{DateTime, Utc};

/// A registered car, identified by its license plate.
#[derive(Debug, Clone, PartialEq)]
pub struct Car {
    /// License plate (unique key)
    pub plate: String,
    /// Email of the owning user
    pub owner_email: String,
    /// Manufacturer, e.g. "Dacia"
    pub brand: Option<String>,
    /// Model name, e.g. "Logan"
    pub model: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Car {
    pub fn new(plate: impl Into<String>, owner_email: impl Into<String>) -> Self {
        Self {
            plate: plate.into(),
            owner_email: owner_email.into(),
            brand: None,
            model: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_owned_by(&self, email: &str) -> bool {
        self.owner_email == email
    }
}

// ── Tests ──────────────────────────────────────────────────────
