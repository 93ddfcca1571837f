//! Reservation repository interface

use async_trait::async_trait;

use super::model::Reservation;
use crate::domain::DomainResult;

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Save a new reservation
    async fn save(&self, reservation: Reservation) -> DomainResult<()>;

    /// Find reservation by ID
    async fn find_by_id(&self, id: i64) -> DomainResult<Option<Reservation>>;

    /// All reservations (any status)
    async fn find_all(&self) -> DomainResult<Vec<Reservation>>;

    /// Active reservation currently holding a spot, if any
    async fn find_active_for_spot(&self, spot_id: i64) -> DomainResult<Option<Reservation>>;

    /// Active reservations for all cars owned by a user
    async fn find_active_for_owner(&self, owner_email: &str) -> DomainResult<Vec<Reservation>>;

    /// Full reservation history for all cars owned by a user
    async fn find_for_owner(&self, owner_email: &str) -> DomainResult<Vec<Reservation>>;

    /// Physically delete a reservation
    async fn delete(&self, id: i64) -> DomainResult<()>;

    /// Generate the next reservation ID
    async fn next_id(&self) -> DomainResult<i64>;
}
