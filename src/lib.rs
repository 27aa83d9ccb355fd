//! billtrack library
//!
//! Re-exports modules for integration testing and external use.

pub mod api;
pub mod auth;
pub mod domain;
pub mod extract;
pub mod jobs;
pub mod state;
pub mod store;

pub mod config;
pub mod db;
mod error;

pub use config::{Config, ConfigError};
pub use error::{AppError, AppResult};
pub use state::AppState;
