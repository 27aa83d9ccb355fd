//! Authentication module
//!
//! Password hashing and JWT issuing/verification.

pub mod password;
pub mod token;

pub use password::PasswordError;
pub use token::{AuthError, TokenIssuer, TokenPair};
