//! Car DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::Car;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterCarRequest {
    #[validate(length(min = 1, max = 16, message = "plate must be 1-16 characters"))]
    pub plate: String,
    #[validate(length(max = 50))]
    pub brand: Option<String>,
    #[validate(length(max = 50))]
    pub model: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CarDto {
    pub plate: String,
    pub owner_email: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Car> for CarDto {
    fn from(car: Car) -> Self {
        Self {
            plate: car.plate,
            owner_email: car.owner_email,
            brand: car.brand,
            model: car.model,
            created_at: car.created_at,
        }
    }
}
