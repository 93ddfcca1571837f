//! Cryptography helpers: JWT issuance/verification and password hashing

pub mod jwt;
pub mod password;

pub use jwt::{JwtConfig, TokenClaims};
pub use password::{hash_password, verify_password};
