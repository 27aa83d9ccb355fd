//! Request payload validation
//!
//! Payload structs deserialize the raw JSON bodies and validate them into
//! domain types. Every field is optional at the serde layer so that a bad
//! or missing field never aborts deserialization; instead each problem is
//! collected as a (field, message) pair and the full list is reported in a
//! single 400 response.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::bill::{BillChanges, Frequency, NewBill};
use super::money::BillAmount;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid"));

/// Characters rejected in user and bill names
const FORBIDDEN_NAME_CHARS: &[char] = &['<', '>', '"', '\'', ';'];

const REQUIRED: &str = "This field is required";

/// One failed check, attributed to the field that failed it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

// ============================================================================
// Registration
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterPayload {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Validated registration input. The email is trimmed and lowercased.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

impl RegisterPayload {
    pub fn validate(self) -> Result<Registration, Vec<FieldError>> {
        let mut errors = Vec::new();

        let email = check_email(self.email.as_deref(), &mut errors);

        let password = match self.password.as_deref() {
            None => {
                errors.push(FieldError::new("password", REQUIRED));
                None
            }
            Some(raw) => match password_strength_error(raw) {
                None => Some(raw.to_string()),
                Some(message) => {
                    errors.push(FieldError::new("password", message));
                    None
                }
            },
        };

        let name = check_person_name(self.name.as_deref(), &mut errors);

        match (email, password) {
            (Some(email), Some(password)) if errors.is_empty() => Ok(Registration {
                email,
                password,
                name,
            }),
            _ => Err(errors),
        }
    }
}

// ============================================================================
// Login
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Login {
    pub email: String,
    pub password: String,
}

impl LoginPayload {
    /// Login only checks shape. A wrong password is an authentication
    /// failure (401), not a validation failure, so no strength rules here.
    pub fn validate(self) -> Result<Login, Vec<FieldError>> {
        let mut errors = Vec::new();

        let email = check_email(self.email.as_deref(), &mut errors);

        let password = match self.password {
            None => {
                errors.push(FieldError::new("password", REQUIRED));
                None
            }
            Some(raw) => Some(raw),
        };

        match (email, password) {
            (Some(email), Some(password)) if errors.is_empty() => Ok(Login { email, password }),
            _ => Err(errors),
        }
    }
}

// ============================================================================
// Bill create / update
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct BillPayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub amount: Option<Value>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl BillPayload {
    pub fn validate(self) -> Result<NewBill, Vec<FieldError>> {
        let mut errors = Vec::new();

        let name = match self.name.as_deref() {
            None => {
                errors.push(FieldError::new("name", REQUIRED));
                None
            }
            Some(raw) => check_bill_name(raw, &mut errors),
        };

        let amount = match self.amount.as_ref().filter(|v| !v.is_null()) {
            None => {
                errors.push(FieldError::new("amount", REQUIRED));
                None
            }
            Some(value) => check_amount(value, &mut errors),
        };

        let due_date = match self.due_date.as_deref() {
            None => {
                errors.push(FieldError::new("due_date", REQUIRED));
                None
            }
            Some(raw) => check_due_date(raw, &mut errors),
        };

        let frequency = match self.frequency.as_deref() {
            None => Some(Frequency::default()),
            Some(raw) => check_frequency(raw, &mut errors),
        };

        match (name, amount, due_date, frequency) {
            (Some(name), Some(amount), Some(due_date), Some(frequency))
                if errors.is_empty() =>
            {
                Ok(NewBill {
                    name,
                    amount,
                    due_date,
                    frequency,
                    category: self.category,
                    notes: self.notes,
                })
            }
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BillUpdatePayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub amount: Option<Value>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl BillUpdatePayload {
    /// Absent (or null) fields are not modified. Fields that are present
    /// must pass the same rules as on creation; any failure rejects the
    /// whole update so it never half-applies.
    pub fn validate(self) -> Result<BillChanges, Vec<FieldError>> {
        let mut errors = Vec::new();
        let mut changes = BillChanges::default();

        if let Some(raw) = self.name.as_deref() {
            changes.name = check_bill_name(raw, &mut errors);
        }

        if let Some(value) = self.amount.as_ref().filter(|v| !v.is_null()) {
            changes.amount = check_amount(value, &mut errors);
        }

        if let Some(raw) = self.due_date.as_deref() {
            changes.due_date = check_due_date(raw, &mut errors);
        }

        if let Some(raw) = self.frequency.as_deref() {
            changes.frequency = check_frequency(raw, &mut errors);
        }

        changes.category = self.category;
        changes.notes = self.notes;

        if errors.is_empty() {
            Ok(changes)
        } else {
            Err(errors)
        }
    }
}

// ============================================================================
// Free text for extraction
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct FreeTextPayload {
    #[serde(default)]
    pub text: Option<String>,
}

impl FreeTextPayload {
    /// Returns the trimmed text, which must be 5 to 500 characters.
    pub fn validate(self) -> Result<String, Vec<FieldError>> {
        let mut errors = Vec::new();

        let text = match self.text.as_deref() {
            None => {
                errors.push(FieldError::new("text", REQUIRED));
                None
            }
            Some(raw) => {
                let trimmed = raw.trim();
                let len = trimmed.chars().count();
                if len < 5 {
                    errors.push(FieldError::new("text", "Please provide more detail about the bill"));
                    None
                } else if len > 500 {
                    errors.push(FieldError::new("text", "Input is too long (max 500 characters)"));
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
        };

        match text {
            Some(text) if errors.is_empty() => Ok(text),
            _ => Err(errors),
        }
    }
}

// ============================================================================
// Field checks
// ============================================================================

fn check_email(raw: Option<&str>, errors: &mut Vec<FieldError>) -> Option<String> {
    match raw {
        None => {
            errors.push(FieldError::new("email", REQUIRED));
            None
        }
        Some(raw) => {
            let lowered = raw.trim().to_lowercase();
            if EMAIL_RE.is_match(&lowered) {
                Some(lowered)
            } else {
                errors.push(FieldError::new("email", "Invalid email address"));
                None
            }
        }
    }
}

fn password_strength_error(raw: &str) -> Option<&'static str> {
    if raw.chars().count() < 8 {
        return Some("Password must be at least 8 characters");
    }
    if !raw.chars().any(|c| c.is_ascii_uppercase()) {
        return Some("Password must contain an uppercase letter");
    }
    if !raw.chars().any(|c| c.is_ascii_lowercase()) {
        return Some("Password must contain a lowercase letter");
    }
    if !raw.chars().any(|c| c.is_ascii_digit()) {
        return Some("Password must contain a number");
    }
    None
}

fn check_person_name(raw: Option<&str>, errors: &mut Vec<FieldError>) -> Option<String> {
    let trimmed = raw.map(str::trim).filter(|s| !s.is_empty())?;

    if trimmed.chars().count() > 100 {
        errors.push(FieldError::new("name", "Name must be less than 100 characters"));
        return None;
    }
    if trimmed.contains(FORBIDDEN_NAME_CHARS) {
        errors.push(FieldError::new("name", "Name contains invalid characters"));
        return None;
    }
    Some(trimmed.to_string())
}

fn check_bill_name(raw: &str, errors: &mut Vec<FieldError>) -> Option<String> {
    let trimmed = raw.trim();
    let len = trimmed.chars().count();

    if len == 0 || len > 100 {
        errors.push(FieldError::new("name", "Bill name must be 1-100 characters"));
        return None;
    }
    if trimmed.contains(FORBIDDEN_NAME_CHARS) {
        errors.push(FieldError::new("name", "Bill name contains invalid characters"));
        return None;
    }
    Some(trimmed.to_string())
}

fn check_amount(value: &Value, errors: &mut Vec<FieldError>) -> Option<BillAmount> {
    let decimal = match coerce_decimal(value) {
        Some(d) => d,
        None => {
            errors.push(FieldError::new("amount", "Amount must be a number"));
            return None;
        }
    };

    match BillAmount::new(decimal) {
        Ok(amount) => Some(amount),
        Err(e) => {
            errors.push(FieldError::new("amount", e.to_string()));
            None
        }
    }
}

/// Accept both JSON numbers and numeric strings for amounts.
pub fn coerce_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => n.to_string().parse().ok(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn check_due_date(raw: &str, errors: &mut Vec<FieldError>) -> Option<chrono::NaiveDate> {
    match chrono::NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            errors.push(FieldError::new("due_date", "Due date must be in YYYY-MM-DD format"));
            None
        }
    }
}

fn check_frequency(raw: &str, errors: &mut Vec<FieldError>) -> Option<Frequency> {
    match Frequency::parse(raw) {
        Some(f) => Some(f),
        None => {
            errors.push(FieldError::new(
                "frequency",
                "Frequency must be one of: one-time, weekly, monthly, quarterly, yearly",
            ));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn field_names(errors: &[FieldError]) -> Vec<&'static str> {
        errors.iter().map(|e| e.field).collect()
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    #[test]
    fn test_registration_valid() {
        let payload = RegisterPayload {
            email: Some("  Alice@Example.COM ".to_string()),
            password: Some("Str0ngPass".to_string()),
            name: Some("  Alice  ".to_string()),
        };
        let reg = payload.validate().unwrap();
        assert_eq!(reg.email, "alice@example.com");
        assert_eq!(reg.name.as_deref(), Some("Alice"));
    }

    #[test]
    fn test_registration_requires_email_and_password() {
        let payload = RegisterPayload {
            email: None,
            password: None,
            name: None,
        };
        let errors = payload.validate().unwrap_err();
        assert_eq!(field_names(&errors), vec!["email", "password"]);
    }

    #[test]
    fn test_registration_rejects_bad_email() {
        for bad in ["not-an-email", "a@b", "a b@c.com", ""] {
            let payload = RegisterPayload {
                email: Some(bad.to_string()),
                password: Some("Str0ngPass".to_string()),
                name: None,
            };
            let errors = payload.validate().unwrap_err();
            assert_eq!(field_names(&errors), vec!["email"], "email: {:?}", bad);
        }
    }

    #[test]
    fn test_registration_password_rules() {
        let cases = [
            ("Sh0rt", "at least 8"),
            ("lowercase1only", "uppercase"),
            ("UPPERCASE1ONLY", "lowercase"),
            ("NoDigitsHere", "number"),
        ];
        for (password, expected) in cases {
            let payload = RegisterPayload {
                email: Some("a@b.com".to_string()),
                password: Some(password.to_string()),
                name: None,
            };
            let errors = payload.validate().unwrap_err();
            assert_eq!(errors.len(), 1);
            assert!(
                errors[0].message.contains(expected),
                "{} -> {}",
                password,
                errors[0].message
            );
        }
    }

    #[test]
    fn test_registration_name_too_long() {
        let payload = RegisterPayload {
            email: Some("a@b.com".to_string()),
            password: Some("Str0ngPass".to_string()),
            name: Some("x".repeat(101)),
        };
        let errors = payload.validate().unwrap_err();
        assert_eq!(field_names(&errors), vec!["name"]);
    }

    #[test]
    fn test_registration_name_forbidden_chars() {
        for bad in ["<script>", "Rob'); DROP", "a;b", "say \"hi\""] {
            let payload = RegisterPayload {
                email: Some("a@b.com".to_string()),
                password: Some("Str0ngPass".to_string()),
                name: Some(bad.to_string()),
            };
            let errors = payload.validate().unwrap_err();
            assert_eq!(field_names(&errors), vec!["name"], "name: {:?}", bad);
        }
    }

    #[test]
    fn test_registration_collects_all_failures() {
        let payload = RegisterPayload {
            email: Some("nope".to_string()),
            password: Some("weak".to_string()),
            name: Some("<bad>".to_string()),
        };
        let errors = payload.validate().unwrap_err();
        assert_eq!(field_names(&errors), vec!["email", "password", "name"]);
    }

    // ------------------------------------------------------------------
    // Login
    // ------------------------------------------------------------------

    #[test]
    fn test_login_allows_empty_password() {
        // Shape-valid; the wrong password becomes a 401 downstream
        let payload = LoginPayload {
            email: Some("a@b.com".to_string()),
            password: Some(String::new()),
        };
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn test_login_requires_both_fields() {
        let payload = LoginPayload {
            email: None,
            password: None,
        };
        let errors = payload.validate().unwrap_err();
        assert_eq!(field_names(&errors), vec!["email", "password"]);
    }

    // ------------------------------------------------------------------
    // Bill create
    // ------------------------------------------------------------------

    fn bill_payload() -> BillPayload {
        BillPayload {
            name: Some("Electric bill".to_string()),
            amount: Some(json!(150.0)),
            due_date: Some("2026-09-01".to_string()),
            frequency: Some("monthly".to_string()),
            category: Some("utilities".to_string()),
            notes: None,
        }
    }

    #[test]
    fn test_bill_create_valid() {
        let bill = bill_payload().validate().unwrap();
        assert_eq!(bill.name, "Electric bill");
        assert_eq!(bill.amount.value(), dec!(150.00));
        assert_eq!(bill.frequency, Frequency::Monthly);
    }

    #[test]
    fn test_bill_amount_accepts_numeric_string() {
        let mut payload = bill_payload();
        payload.amount = Some(json!("89.50"));
        let bill = payload.validate().unwrap();
        assert_eq!(bill.amount.value(), dec!(89.50));
    }

    #[test]
    fn test_bill_amount_rejects_non_numeric() {
        for bad in [json!("abc"), json!(true), json!([1, 2])] {
            let mut payload = bill_payload();
            payload.amount = Some(bad.clone());
            let errors = payload.validate().unwrap_err();
            assert_eq!(field_names(&errors), vec!["amount"], "amount: {}", bad);
        }
    }

    #[test]
    fn test_bill_amount_bounds() {
        let mut payload = bill_payload();
        payload.amount = Some(json!(0));
        let errors = payload.validate().unwrap_err();
        assert_eq!(errors[0].message, "Amount must be greater than 0");

        let mut payload = bill_payload();
        payload.amount = Some(json!(1000000.00));
        let errors = payload.validate().unwrap_err();
        assert_eq!(errors[0].message, "Amount is too large");
    }

    #[test]
    fn test_bill_name_rules() {
        let mut payload = bill_payload();
        payload.name = Some("   ".to_string());
        let errors = payload.validate().unwrap_err();
        assert_eq!(errors[0].message, "Bill name must be 1-100 characters");

        let mut payload = bill_payload();
        payload.name = Some("x".repeat(101));
        assert!(payload.validate().is_err());

        let mut payload = bill_payload();
        payload.name = Some("Rent <q1>".to_string());
        let errors = payload.validate().unwrap_err();
        assert_eq!(errors[0].message, "Bill name contains invalid characters");
    }

    #[test]
    fn test_bill_due_date_format() {
        for bad in ["01/09/2026", "2026-13-01", "soon", "2026-02-30"] {
            let mut payload = bill_payload();
            payload.due_date = Some(bad.to_string());
            let errors = payload.validate().unwrap_err();
            assert_eq!(field_names(&errors), vec!["due_date"], "date: {:?}", bad);
        }
    }

    #[test]
    fn test_bill_frequency_defaults_to_one_time() {
        let mut payload = bill_payload();
        payload.frequency = None;
        let bill = payload.validate().unwrap();
        assert_eq!(bill.frequency, Frequency::OneTime);
    }

    #[test]
    fn test_bill_frequency_rejects_unknown() {
        let mut payload = bill_payload();
        payload.frequency = Some("fortnightly".to_string());
        let errors = payload.validate().unwrap_err();
        assert_eq!(field_names(&errors), vec!["frequency"]);
    }

    #[test]
    fn test_bill_create_requires_core_fields() {
        let payload = BillPayload {
            name: None,
            amount: None,
            due_date: None,
            frequency: None,
            category: None,
            notes: None,
        };
        let errors = payload.validate().unwrap_err();
        assert_eq!(field_names(&errors), vec!["name", "amount", "due_date"]);
    }

    #[test]
    fn test_bill_payload_deserializes_mixed_amount() {
        let payload: BillPayload =
            serde_json::from_value(json!({"name": "Rent", "amount": "1200", "due_date": "2026-09-01"}))
                .unwrap();
        assert!(payload.validate().is_ok());
    }

    // ------------------------------------------------------------------
    // Bill update
    // ------------------------------------------------------------------

    #[test]
    fn test_update_empty_payload_changes_nothing() {
        let payload: BillUpdatePayload = serde_json::from_value(json!({})).unwrap();
        let changes = payload.validate().unwrap();
        assert!(changes.name.is_none());
        assert!(changes.amount.is_none());
        assert!(changes.due_date.is_none());
        assert!(changes.frequency.is_none());
    }

    #[test]
    fn test_update_null_amount_is_ignored() {
        let payload: BillUpdatePayload = serde_json::from_value(json!({"amount": null})).unwrap();
        let changes = payload.validate().unwrap();
        assert!(changes.amount.is_none());
    }

    #[test]
    fn test_update_validates_present_fields() {
        let payload: BillUpdatePayload =
            serde_json::from_value(json!({"amount": -5, "frequency": "never"})).unwrap();
        let errors = payload.validate().unwrap_err();
        assert_eq!(field_names(&errors), vec!["amount", "frequency"]);
    }

    // ------------------------------------------------------------------
    // Free text
    // ------------------------------------------------------------------

    #[test]
    fn test_free_text_bounds() {
        let short = FreeTextPayload {
            text: Some("abcd".to_string()),
        };
        let errors = short.validate().unwrap_err();
        assert_eq!(errors[0].message, "Please provide more detail about the bill");

        let exact = FreeTextPayload {
            text: Some("abcde".to_string()),
        };
        assert!(exact.validate().is_ok());

        let max = FreeTextPayload {
            text: Some("x".repeat(500)),
        };
        assert!(max.validate().is_ok());

        let long = FreeTextPayload {
            text: Some("x".repeat(501)),
        };
        let errors = long.validate().unwrap_err();
        assert_eq!(errors[0].message, "Input is too long (max 500 characters)");
    }

    #[test]
    fn test_free_text_is_trimmed_before_length_check() {
        let payload = FreeTextPayload {
            text: Some("   ab   ".to_string()),
        };
        assert!(payload.validate().is_err());

        let payload = FreeTextPayload {
            text: Some("  electric bill 150 due sept 1  ".to_string()),
        };
        assert_eq!(payload.validate().unwrap(), "electric bill 150 due sept 1");
    }
}
