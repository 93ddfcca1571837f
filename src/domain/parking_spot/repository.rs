//! Parking spot repository interface

use async_trait::async_trait;

use super::model::{ParkingSpot, SpotStatus};
use crate::domain::DomainResult;

#[async_trait]
pub trait ParkingSpotRepository: Send + Sync {
    /// Save a new parking spot
    async fn save(&self, spot: ParkingSpot) -> DomainResult<()>;

    /// Find a spot by ID
    async fn find_by_id(&self, id: i64) -> DomainResult<Option<ParkingSpot>>;

    /// All spots
    async fn find_all(&self) -> DomainResult<Vec<ParkingSpot>>;

    /// Update the availability status of a spot
    async fn update_status(&self, id: i64, status: SpotStatus) -> DomainResult<()>;

    /// Generate the next spot ID
    async fn next_id(&self) -> DomainResult<i64>;
}
