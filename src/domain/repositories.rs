//! Repository access for the domain layer

use super::car::CarRepository;
use super::parking_spot::ParkingSpotRepository;
use super::reservation::ReservationRepository;

/// Provides access to all domain repositories.
///
/// Consumers request only the repository they need:
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let spot = repos.parking_spots().find_by_id(12).await?;
///     let active = repos.reservations().find_active_for_spot(12).await?;
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn cars(&self) -> &dyn CarRepository;
    fn parking_spots(&self) -> &dyn ParkingSpotRepository;
    fn reservations(&self) -> &dyn ReservationRepository;
}
