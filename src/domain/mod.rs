//! Domain module
//!
//! Core domain types and business logic.

pub mod bill;
pub mod money;
pub mod user;
pub mod validate;

pub use bill::{Bill, BillChanges, BillSummary, Frequency, NewBill};
pub use money::{AmountError, BillAmount};
pub use user::{NewUser, User};
