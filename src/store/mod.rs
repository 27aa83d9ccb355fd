//! Persistence layer
//!
//! Plain SQL stores over the connection pool. Every bill query is scoped by
//! owner, so cross-user access fails as "no such row" rather than leaking
//! the bill's existence.

pub mod bills;
pub mod users;

pub use bills::BillStore;
pub use users::UserStore;
