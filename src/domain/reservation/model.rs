//! Reservation domain entity

use chrono::{DateTime, Utc};

/// Reservation status
///
/// `Active` is the only state a live reservation holds; cancellation is a
/// physical delete, not a status transition. `Inactive` exists so that rows
/// with an unknown status read back from storage have a terminal bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReservationStatus {
    Active,
    Inactive,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "active" => Self::Active,
            _ => Self::Inactive,
        }
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A reservation of one parking spot for one car over a time window
#[derive(Debug, Clone)]
pub struct Reservation {
    /// Unique reservation ID
    pub id: i64,
    /// License plate of the reserving car
    pub car_plate: String,
    /// Reserved parking spot
    pub spot_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Cost in minor currency units
    pub cost: i64,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
}

impl Reservation {
    pub fn new(
        id: i64,
        car_plate: impl Into<String>,
        spot_id: i64,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        cost: i64,
    ) -> Self {
        Self {
            id,
            car_plate: car_plate.into(),
            spot_id,
            start_time,
            end_time,
            cost,
            status: ReservationStatus::Active,
            created_at: Utc::now(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == ReservationStatus::Active
    }
}

// ── Tests ──────────────────────────────────────────────────────
