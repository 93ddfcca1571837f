//! Per-resource API modules

pub mod auth;
pub mod cars;
pub mod health;
pub mod metrics;
pub mod parking_spots;
pub mod payments;
pub mod reservations;
