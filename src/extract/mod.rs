//! Bill extraction
//!
//! Turns a free-text bill description into a validated `NewBill` draft by
//! prompting a text generation model for a single JSON object and parsing
//! the reply defensively. Model output is untrusted input: every field is
//! checked here before it reaches the creation path, and raw model text is
//! never echoed back to the caller.

pub mod provider;

use std::sync::Arc;

use chrono::{Datelike, Months, NaiveDate};
use serde_json::Value;

use crate::domain::bill::{Frequency, NewBill};
use crate::domain::money::BillAmount;
use crate::domain::validate::coerce_decimal;

pub use provider::{ClaudeClient, GenerateError, TextGenerator};

/// Extraction failures, each with a stable code and a user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    #[error("Could not parse bill details. Please try again with more detail.")]
    UnparsableResponse,

    #[error("Missing required field: {0}")]
    IncompleteResponse(&'static str),

    #[error("Amount must be a positive number")]
    InvalidAmount,

    #[error("Due date must be in YYYY-MM-DD format")]
    InvalidDate,

    #[error("An error occurred while parsing. Please try again.")]
    Provider,
}

impl ExtractError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ExtractError::UnparsableResponse => "unparsable_response",
            ExtractError::IncompleteResponse(_) => "incomplete_response",
            ExtractError::InvalidAmount => "invalid_amount",
            ExtractError::InvalidDate => "invalid_date",
            ExtractError::Provider => "provider_error",
        }
    }
}

/// Parses free-text bill descriptions through a text generation provider.
#[derive(Clone)]
pub struct BillExtractor {
    provider: Arc<dyn TextGenerator>,
}

impl BillExtractor {
    pub fn new(provider: Arc<dyn TextGenerator>) -> Self {
        Self { provider }
    }

    /// Extract a bill draft from `text`.
    ///
    /// `reference_date` anchors every date decision (prompt wording and the
    /// fallback due date), so behavior is deterministic for a given input.
    pub async fn extract(
        &self,
        text: &str,
        reference_date: NaiveDate,
    ) -> Result<NewBill, ExtractError> {
        let prompt = build_prompt(text, reference_date);

        let raw = match self.provider.generate(&prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(error = %e, "text generation request failed");
                return Err(ExtractError::Provider);
            }
        };

        let draft = parse_draft(&raw, reference_date)?;
        tracing::debug!(name = %draft.name, amount = %draft.amount.value(), "extracted bill draft");
        Ok(draft)
    }
}

fn build_prompt(text: &str, reference_date: NaiveDate) -> String {
    let today = reference_date.format("%Y-%m-%d");
    let year = reference_date.year();

    format!(
        r#"Parse this bill description into structured data. Today's date is {today}.

Bill description: "{text}"

Extract the following fields:
- name: The bill name (e.g., "Electric bill", "Netflix subscription")
- amount: The dollar amount as a number (e.g., 150.00)
- due_date: The due date in YYYY-MM-DD format. If only month/day given, assume year {year} or {next_year} if the date has passed. If no date is mentioned and it's a recurring bill, use the 1st of next month.
- frequency: One of "one-time", "weekly", "monthly", "quarterly", "yearly". Default to "monthly" for subscriptions, "one-time" otherwise.
- category: One of "utilities", "subscription", "insurance", "rent", "loan", "medical", "other"

IMPORTANT: Always provide a due_date, never null. If unclear, default to the 1st of next month.

Respond ONLY with valid JSON, no other text. Example:
{{"name": "Electric bill", "amount": 150.00, "due_date": "{year}-01-15", "frequency": "one-time", "category": "utilities"}}"#,
        next_year = year + 1,
    )
}

/// Parse and validate the model reply into a bill draft.
fn parse_draft(raw: &str, reference_date: NaiveDate) -> Result<NewBill, ExtractError> {
    let value: Value =
        serde_json::from_str(raw.trim()).map_err(|_| ExtractError::UnparsableResponse)?;
    let obj = value.as_object().ok_or(ExtractError::UnparsableResponse)?;

    let name = obj
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(ExtractError::IncompleteResponse("name"))?;
    // Bill names are capped at 100 characters; models occasionally ramble
    let name: String = name.chars().take(100).collect();

    let amount = obj
        .get("amount")
        .filter(|v| !v.is_null())
        .ok_or(ExtractError::IncompleteResponse("amount"))?;
    let amount = coerce_decimal(amount).ok_or(ExtractError::InvalidAmount)?;
    let amount = BillAmount::new(amount).map_err(|_| ExtractError::InvalidAmount)?;

    let due_date = match obj.get("due_date") {
        None | Some(Value::Null) => first_of_next_month(reference_date),
        Some(Value::String(s)) if s.trim().is_empty() => first_of_next_month(reference_date),
        Some(Value::String(s)) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map_err(|_| ExtractError::InvalidDate)?,
        Some(_) => return Err(ExtractError::InvalidDate),
    };

    let frequency = obj
        .get("frequency")
        .and_then(Value::as_str)
        .and_then(|s| Frequency::parse(&s.trim().to_lowercase()))
        .unwrap_or_default();

    let category = obj
        .get("category")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("other")
        .to_string();

    Ok(NewBill {
        name,
        amount,
        due_date,
        frequency,
        category: Some(category),
        notes: None,
    })
}

fn first_of_next_month(reference: NaiveDate) -> NaiveDate {
    reference
        .with_day(1)
        .and_then(|d| d.checked_add_months(Months::new(1)))
        .expect("month arithmetic on day 1 cannot fail")
}
