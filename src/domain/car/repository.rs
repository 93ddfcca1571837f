//! Car repository interface

use async_trait::async_trait;

use super::model::Car;
use crate::domain::DomainResult;

#[async_trait]
pub trait CarRepository: Send + Sync {
    /// Save a new car. Fails with `Conflict` if the plate is already registered.
    async fn save(&self, car: Car) -> DomainResult<()>;

    /// Find a car by its license plate
    async fn find_by_plate(&self, plate: &str) -> DomainResult<Option<Car>>;

    /// All cars owned by a user
    async fn find_by_owner(&self, owner_email: &str) -> DomainResult<Vec<Car>>;

    /// All registered cars
    async fn find_all(&self) -> DomainResult<Vec<Car>>;

    /// Delete a car by plate
    async fn delete(&self, plate: &str) -> DomainResult<()>;
}
