//! Domain layer: entities, repository traits and errors

pub mod car;
pub mod error;
pub mod parking_spot;
pub mod repositories;
pub mod reservation;
pub mod user;

pub use car::{Car, CarRepository};
pub use error::{DomainError, DomainResult};
pub use parking_spot::{ParkingSpot, ParkingSpotRepository, SpotStatus};
pub use repositories::RepositoryProvider;
pub use reservation::{Reservation, ReservationRepository, ReservationStatus};
pub use user::{User, UserRepository, UserRole};
