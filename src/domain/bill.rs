//! Bill domain types
//!
//! A bill belongs to exactly one user and carries a validated amount, a due
//! date, and a recurrence frequency. Overdue status is never stored; it is
//! derived from the due date, the paid flag, and the current date.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::money::BillAmount;

/// How often a bill recurs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Frequency {
    #[default]
    OneTime,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    /// Parse from the wire/database representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "one-time" => Some(Frequency::OneTime),
            "weekly" => Some(Frequency::Weekly),
            "monthly" => Some(Frequency::Monthly),
            "quarterly" => Some(Frequency::Quarterly),
            "yearly" => Some(Frequency::Yearly),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::OneTime => "one-time",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
            Frequency::Yearly => "yearly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted bill
#[derive(Debug, Clone)]
pub struct Bill {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub frequency: Frequency,
    pub category: Option<String>,
    pub notes: Option<String>,
    pub is_paid: bool,
    pub paid_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Bill {
    /// A bill is overdue when it is unpaid and its due date is strictly
    /// before the given date.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.is_paid && self.due_date < today
    }
}

/// Validated input for creating a bill
#[derive(Debug, Clone)]
pub struct NewBill {
    pub name: String,
    pub amount: BillAmount,
    pub due_date: NaiveDate,
    pub frequency: Frequency,
    pub category: Option<String>,
    pub notes: Option<String>,
}

/// Validated partial update. `None` fields are left untouched; there is no
/// way to null out a stored value through this type.
#[derive(Debug, Clone, Default)]
pub struct BillChanges {
    pub name: Option<String>,
    pub amount: Option<BillAmount>,
    pub due_date: Option<NaiveDate>,
    pub frequency: Option<Frequency>,
    pub category: Option<String>,
    pub notes: Option<String>,
}

/// Aggregated view over one user's bills
#[derive(Debug, Clone, Serialize)]
pub struct BillSummary {
    pub total_bills: i64,
    pub unpaid_count: i64,
    pub overdue_count: i64,
    pub total_due: Decimal,
    pub total_overdue: Decimal,
}
