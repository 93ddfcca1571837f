//! Business services

pub mod auth;
pub mod fleet;
pub mod payment;
pub mod reservation;

pub use auth::{AuthService, AuthenticatedSession};
pub use fleet::FleetService;
pub use payment::{PaymentIntentHandle, PaymentService, TransactionRecord};
pub use reservation::ReservationService;
