//! Parking spot DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::{ParkingSpot, SpotStatus};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateSpotRequest {
    #[validate(length(min = 1, max = 20, message = "label must be 1-20 characters"))]
    pub label: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateSpotStatusRequest {
    /// One of: available, occupied, out_of_service
    #[validate(length(min = 1, message = "status is required"))]
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SpotDto {
    pub id: i64,
    pub label: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<ParkingSpot> for SpotDto {
    fn from(spot: ParkingSpot) -> Self {
        Self {
            id: spot.id,
            label: spot.label,
            status: spot.status.as_str().to_string(),
            created_at: spot.created_at,
        }
    }
}

/// Parse a client-supplied status string, rejecting unknown values.
pub fn parse_status(s: &str) -> Option<SpotStatus> {
    match s {
        "available" => Some(SpotStatus::Available),
        "occupied" => Some(SpotStatus::Occupied),
        "out_of_service" => Some(SpotStatus::OutOfService),
        _ => None,
    }
}
