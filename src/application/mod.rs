//! Application layer: business services and outbound ports

pub mod ports;
pub mod services;

pub use ports::{Mailer, PaymentProvider, ProviderError};
pub use services::{AuthService, FleetService, PaymentService, ReservationService};
