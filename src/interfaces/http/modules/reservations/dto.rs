//! Reservation DTOs
//!
//! Costs cross the API in major currency units; the domain stores minor
//! units (bani).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::Reservation;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReservationRequest {
    pub spot_id: i64,
    #[validate(length(min = 1, max = 16, message = "car plate is required"))]
    pub car_plate: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Cost in major currency units
    #[validate(range(min = 0.0, message = "cost must not be negative"))]
    pub cost: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReservationDto {
    pub id: i64,
    pub car_plate: String,
    pub spot_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Cost in major currency units
    pub cost: f64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<Reservation> for ReservationDto {
    fn from(r: Reservation) -> Self {
        Self {
            id: r.id,
            car_plate: r.car_plate,
            spot_id: r.spot_id,
            start_time: r.start_time,
            end_time: r.end_time,
            cost: r.cost as f64 / 100.0,
            status: r.status.as_str().to_string(),
            created_at: r.created_at,
        }
    }
}

pub fn cost_to_minor(major: f64) -> i64 {
    (major * 100.0).round() as i64
}
