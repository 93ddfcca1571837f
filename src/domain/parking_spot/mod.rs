pub mod model;
pub mod repository;

pub use model::{ParkingSpot, SpotStatus};
pub use repository::ParkingSpotRepository;
