//! SeaORM entities

pub mod car;
pub mod parking_spot;
pub mod reservation;
pub mod user;
