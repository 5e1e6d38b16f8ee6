//! Write-boundary validation for transactions.

use chrono::NaiveDate;
use medfin_shared::FieldErrors;
use medfin_shared::types::{AccountId, UnitId};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use super::types::TransactionType;
use crate::validation::{
    AmountMessages, filled, parse_amount_value, parse_date, required_id, required_text,
};

/// Maximum description length in characters.
pub const DESCRIPTION_MAX_CHARS: usize = 1000;

const AMOUNT_MESSAGES: AmountMessages<'static> = AmountMessages {
    required: "Amount is required.",
    invalid: "Amount must be a valid number.",
    negative: "Amount must be greater than or equal to 0.",
    too_large: "Amount is too large.",
};

/// Raw create/update payload as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionForm {
    /// `YYYY-MM-DD`.
    pub transaction_date: Option<String>,
    /// `YYYY-MM-DD`.
    pub journal_date: Option<String>,
    /// `YYYY-MM-DD`, optional.
    pub payment_date: Option<String>,
    /// Ledger account id.
    pub account_id: Option<i64>,
    /// Organizational unit id.
    pub unit_id: Option<i64>,
    /// One of income, expense, return, correction.
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    /// Number or numeric string.
    pub amount: Option<Value>,
    /// Free text.
    pub description: Option<String>,
}

/// A transaction payload that passed field validation.
///
/// Account and unit existence is checked by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionInput {
    /// Transaction date.
    pub transaction_date: NaiveDate,
    /// Journal date.
    pub journal_date: NaiveDate,
    /// Payment date.
    pub payment_date: Option<NaiveDate>,
    /// Ledger account.
    pub account_id: AccountId,
    /// Organizational unit.
    pub unit_id: UnitId,
    /// Transaction type.
    pub transaction_type: TransactionType,
    /// Non-negative amount, two decimals.
    pub amount: Decimal,
    /// Description.
    pub description: String,
}

impl TransactionForm {
    /// Validates every field, reporting all failures at once.
    pub fn validate(&self) -> Result<TransactionInput, FieldErrors> {
        let mut errors = FieldErrors::new();

        let transaction_date = parse_date(
            &mut errors,
            "transaction_date",
            self.transaction_date.as_deref(),
            Some("Transaction date is required."),
            "Transaction date must be a valid date.",
        );
        let journal_date = parse_date(
            &mut errors,
            "journal_date",
            self.journal_date.as_deref(),
            Some("Journal date is required."),
            "Journal date must be a valid date.",
        );
        let payment_date = parse_date(
            &mut errors,
            "payment_date",
            self.payment_date.as_deref(),
            None,
            "Payment date must be a valid date.",
        );
        let account_id = required_id(
            &mut errors,
            "account_id",
            self.account_id,
            "BAS Account is required.",
            "Selected BAS Account is invalid.",
        );
        let unit_id = required_id(
            &mut errors,
            "unit_id",
            self.unit_id,
            "Hospital Unit is required.",
            "Selected Hospital Unit is invalid.",
        );

        let transaction_type = match filled(self.transaction_type.as_deref()) {
            None => {
                errors.add("type", "Transaction type is required.");
                None
            }
            Some(raw) => {
                let parsed = TransactionType::parse(raw);
                if parsed.is_none() {
                    errors.add(
                        "type",
                        "Transaction type must be income, expense, return, or correction.",
                    );
                }
                parsed
            }
        };

        let amount = parse_amount_value(&mut errors, "amount", self.amount.as_ref(), &AMOUNT_MESSAGES);
        let description = required_text(
            &mut errors,
            "description",
            self.description.as_deref(),
            "Description is required.",
            DESCRIPTION_MAX_CHARS,
            "Description must not exceed 1000 characters.",
        );

        match (
            transaction_date,
            journal_date,
            account_id,
            unit_id,
            transaction_type,
            amount,
            description,
        ) {
            (
                Some(transaction_date),
                Some(journal_date),
                Some(account_id),
                Some(unit_id),
                Some(transaction_type),
                Some(amount),
                Some(description),
            ) if errors.is_empty() => Ok(TransactionInput {
                transaction_date,
                journal_date,
                payment_date,
                account_id: AccountId::new(account_id),
                unit_id: UnitId::new(unit_id),
                transaction_type,
                amount,
                description,
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn valid_form() -> TransactionForm {
        TransactionForm {
            transaction_date: Some("2024-03-15".into()),
            journal_date: Some("2024-03-15".into()),
            payment_date: None,
            account_id: Some(1),
            unit_id: Some(2),
            transaction_type: Some("expense".into()),
            amount: Some(json!("500000.456")),
            description: Some("Pembelian obat".into()),
        }
    }

    #[test]
    fn test_valid_form() {
        let input = valid_form().validate().unwrap();
        assert_eq!(input.transaction_date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(input.account_id, AccountId::new(1));
        assert_eq!(input.unit_id, UnitId::new(2));
        assert_eq!(input.transaction_type, TransactionType::Expense);
        assert_eq!(input.amount, dec!(500000.46));
        assert_eq!(input.payment_date, None);
    }

    #[test]
    fn test_empty_form_reports_every_required_field() {
        let errors = TransactionForm::default().validate().unwrap_err();
        assert_eq!(errors.get("transaction_date"), ["Transaction date is required.".to_string()]);
        assert_eq!(errors.get("journal_date"), ["Journal date is required.".to_string()]);
        assert_eq!(errors.get("account_id"), ["BAS Account is required.".to_string()]);
        assert_eq!(errors.get("unit_id"), ["Hospital Unit is required.".to_string()]);
        assert_eq!(errors.get("type"), ["Transaction type is required.".to_string()]);
        assert_eq!(errors.get("amount"), ["Amount is required.".to_string()]);
        assert_eq!(errors.get("description"), ["Description is required.".to_string()]);
        assert!(!errors.has("payment_date"));
    }

    #[test]
    fn test_bad_type_and_negative_amount() {
        let form = TransactionForm {
            transaction_type: Some("transfer".into()),
            amount: Some(json!(-1)),
            ..valid_form()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(
            errors.get("type"),
            ["Transaction type must be income, expense, return, or correction.".to_string()]
        );
        assert_eq!(
            errors.get("amount"),
            ["Amount must be greater than or equal to 0.".to_string()]
        );
    }

    #[test]
    fn test_non_numeric_amount() {
        let form = TransactionForm {
            amount: Some(json!("lima ratus")),
            ..valid_form()
        };
        assert_eq!(
            form.validate().unwrap_err().get("amount"),
            ["Amount must be a valid number.".to_string()]
        );
    }

    #[test]
    fn test_description_limit() {
        let ok = TransactionForm {
            description: Some("x".repeat(1000)),
            ..valid_form()
        };
        assert!(ok.validate().is_ok());
        let too_long = TransactionForm {
            description: Some("x".repeat(1001)),
            ..valid_form()
        };
        assert!(too_long.validate().unwrap_err().has("description"));
    }

    #[test]
    fn test_invalid_optional_payment_date() {
        let form = TransactionForm {
            payment_date: Some("2024-02-30".into()),
            ..valid_form()
        };
        assert_eq!(
            form.validate().unwrap_err().get("payment_date"),
            ["Payment date must be a valid date.".to_string()]
        );
    }

    #[test]
    fn test_zero_amount_allowed() {
        let form = TransactionForm {
            amount: Some(json!(0)),
            ..valid_form()
        };
        assert_eq!(form.validate().unwrap().amount, Decimal::ZERO);
    }

    #[test]
    fn test_deserializes_type_key() {
        let form: TransactionForm = serde_json::from_value(json!({
            "transaction_date": "2024-01-02",
            "journal_date": "2024-01-02",
            "account_id": 4,
            "unit_id": 1,
            "type": "income",
            "amount": 125000,
            "description": "Pendapatan"
        }))
        .unwrap();
        assert_eq!(form.validate().unwrap().transaction_type, TransactionType::Income);
    }
}
