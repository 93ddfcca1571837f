//! Parking spot domain entity

use chrono::{DateTime, Utc};

/// Availability status of a parking spot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpotStatus {
    /// Free, can be reserved
    Available,
    /// Currently held by an active reservation
    Occupied,
    /// Taken out of service (maintenance, closed level)
    OutOfService,
}

impl SpotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Occupied => "occupied",
            Self::OutOfService => "out_of_service",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "available" => Self::Available,
            "occupied" => Self::Occupied,
            _ => Self::OutOfService,
        }
    }
}

impl std::fmt::Display for SpotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single parking spot
#[derive(Debug, Clone)]
pub struct ParkingSpot {
    /// Numeric spot ID
    pub id: i64,
    /// Human label, e.g. "A-14"
    pub label: String,
    pub status: SpotStatus,
    pub created_at: DateTime<Utc>,
}

impl ParkingSpot {
    pub fn new(id: i64, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            status: SpotStatus::Available,
            created_at: Utc::now(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.status == SpotStatus::Available
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_spot_is_available() {
        let spot = ParkingSpot::new(1, "A-1");
        assert!(spot.is_available());
        assert_eq!(spot.status, SpotStatus::Available);
    }

    #[test]
    fn status_string_roundtrip() {
        for status in &[
            SpotStatus::Available,
            SpotStatus::Occupied,
            SpotStatus::OutOfService,
        ] {
            assert_eq!(&SpotStatus::from_str(status.as_str()), status);
        }
    }

    #[test]
    fn unknown_status_is_out_of_service() {
        assert_eq!(SpotStatus::from_str("???"), SpotStatus::OutOfService);
    }
}
