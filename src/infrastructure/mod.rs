//! Infrastructure layer: database, payment provider client, mail relay, crypto

pub mod crypto;
pub mod database;
pub mod notify;
pub mod payment;
