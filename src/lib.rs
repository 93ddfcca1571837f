//! # Smart Parking Backend
//!
//! Backend for a parking-lot management application: cars, parking spots,
//! reservations and customer payments.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: Core business entities, repository traits and errors
//! - **application**: Business services (reservations, payments) and outbound ports
//! - **infrastructure**: External concerns (database, payment provider client, mail relay, crypto)
//! - **interfaces**: REST API with Swagger documentation and JWT authentication

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;

pub use config::{default_config_path, AppConfig};

// Re-export database types for easy access
pub use infrastructure::database::repositories::SeaOrmRepositoryProvider;
pub use infrastructure::database::{init_database, DatabaseConfig};

// Re-export API router
pub use interfaces::http::create_api_router;
