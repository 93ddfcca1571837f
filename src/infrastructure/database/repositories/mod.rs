//! SeaORM repository implementations

pub mod car_repository;
pub mod parking_spot_repository;
pub mod repository_provider;
pub mod reservation_repository;
pub mod user_repository;

pub use car_repository::SeaOrmCarRepository;
pub use parking_spot_repository::SeaOrmParkingSpotRepository;
pub use repository_provider::SeaOrmRepositoryProvider;
pub use reservation_repository::SeaOrmReservationRepository;
pub use user_repository::SeaOrmUserRepository;

use crate::domain::DomainError;

pub(crate) fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Validation(format!("Database error: {}", e))
}
