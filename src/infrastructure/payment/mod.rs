//! Payment provider client

pub mod client;

pub use client::StripeGatewayClient;
