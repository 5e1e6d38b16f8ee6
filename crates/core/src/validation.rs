//! Field-level input checks shared by the record forms.
//!
//! Every form collects all failures into a `FieldErrors` before anything is
//! written, so helpers here record a message and return `None` instead of
//! short-circuiting.

use chrono::NaiveDate;
use medfin_shared::FieldErrors;
use medfin_shared::types::{AmountError, parse_amount};
use rust_decimal::Decimal;
use serde_json::Value;

/// A blank string counts as absent.
#[must_use]
pub fn filled(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Required text of at most `max_chars` characters.
pub fn required_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&str>,
    required_msg: &str,
    max_chars: usize,
    too_long_msg: &str,
) -> Option<String> {
    let Some(text) = filled(value) else {
        errors.add(field, required_msg);
        return None;
    };
    if text.chars().count() > max_chars {
        errors.add(field, too_long_msg);
        return None;
    }
    Some(text.to_string())
}

/// Optional text of at most `max_chars` characters; blank becomes `None`.
pub fn optional_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&str>,
    max_chars: usize,
    too_long_msg: &str,
) -> Option<String> {
    let text = filled(value)?;
    if text.chars().count() > max_chars {
        errors.add(field, too_long_msg);
        return None;
    }
    Some(text.to_string())
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&str>,
    required_msg: Option<&str>,
    invalid_msg: &str,
) -> Option<NaiveDate> {
    let Some(raw) = filled(value) else {
        if let Some(msg) = required_msg {
            errors.add(field, msg);
        }
        return None;
    };
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Some(date)
    } else {
        errors.add(field, invalid_msg);
        None
    }
}

/// Messages reported for each amount failure.
pub struct AmountMessages<'a> {
    /// Blank or missing.
    pub required: &'a str,
    /// Not a number.
    pub invalid: &'a str,
    /// Below zero.
    pub negative: &'a str,
    /// Outside `decimal(15,2)`.
    pub too_large: &'a str,
}

/// Parses a JSON number or numeric string into a non-negative 2-dp amount.
pub fn parse_amount_value(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&Value>,
    messages: &AmountMessages<'_>,
) -> Option<Decimal> {
    let raw = match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(_) => {
            errors.add(field, messages.invalid);
            return None;
        }
    };
    match parse_amount(&raw) {
        Ok(amount) => Some(amount),
        Err(err) => {
            errors.add(
                field,
                match err {
                    AmountError::Missing => messages.required,
                    AmountError::NotANumber => messages.invalid,
                    AmountError::Negative => messages.negative,
                    AmountError::TooLarge => messages.too_large,
                },
            );
            None
        }
    }
}

/// A required positive id.
pub fn required_id(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<i64>,
    required_msg: &str,
    invalid_msg: &str,
) -> Option<i64> {
    match value {
        None => {
            errors.add(field, required_msg);
            None
        }
        Some(id) if id <= 0 => {
            errors.add(field, invalid_msg);
            None
        }
        Some(id) => Some(id),
    }
}
