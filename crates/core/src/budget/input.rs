//! Write-boundary validation for budgets.

use std::ops::RangeInclusive;

use medfin_shared::FieldErrors;
use medfin_shared::types::{AccountId, UnitId};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use super::types::BudgetType;
use crate::validation::{AmountMessages, filled, optional_text, parse_amount_value, required_id};

/// Accepted fiscal years.
pub const FISCAL_YEAR_RANGE: RangeInclusive<i32> = 1901..=2155;

const AMOUNT_MESSAGES: AmountMessages<'static> = AmountMessages {
    required: "Amount is required.",
    invalid: "Amount must be a valid number.",
    negative: "Amount must be greater than or equal to 0.",
    too_large: "Amount is too large.",
};

/// Raw budget payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BudgetForm {
    /// Fiscal year.
    pub fiscal_year: Option<i32>,
    /// Ledger account id.
    pub account_id: Option<i64>,
    /// Organizational unit id.
    pub unit_id: Option<i64>,
    /// One of initial, shifting, revised.
    #[serde(rename = "type")]
    pub budget_type: Option<String>,
    /// Number or numeric string.
    pub amount: Option<Value>,
    /// Optional notes.
    pub description: Option<String>,
}

/// A budget payload that passed field validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetInput {
    /// Fiscal year.
    pub fiscal_year: i32,
    /// Ledger account.
    pub account_id: AccountId,
    /// Organizational unit.
    pub unit_id: UnitId,
    /// Budget type.
    pub budget_type: BudgetType,
    /// Non-negative amount, two decimals.
    pub amount: Decimal,
    /// Notes.
    pub description: Option<String>,
}

impl BudgetForm {
    /// Validates every field, reporting all failures at once.
    pub fn validate(&self) -> Result<BudgetInput, FieldErrors> {
        let mut errors = FieldErrors::new();

        let fiscal_year = match self.fiscal_year {
            None => {
                errors.add("fiscal_year", "Fiscal year is required.");
                None
            }
            Some(year) if !FISCAL_YEAR_RANGE.contains(&year) => {
                errors.add("fiscal_year", "Fiscal year must be between 1901 and 2155.");
                None
            }
            Some(year) => Some(year),
        };
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
        let budget_type = match filled(self.budget_type.as_deref()) {
            None => {
                errors.add("type", "Budget type is required.");
                None
            }
            Some(raw) => {
                let parsed = BudgetType::parse(raw);
                if parsed.is_none() {
                    errors.add("type", "Budget type must be initial, shifting, or revised.");
                }
                parsed
            }
        };
        let amount = parse_amount_value(&mut errors, "amount", self.amount.as_ref(), &AMOUNT_MESSAGES);
        let description = optional_text(
            &mut errors,
            "description",
            self.description.as_deref(),
            1000,
            "Description must not exceed 1000 characters.",
        );

        match (fiscal_year, account_id, unit_id, budget_type, amount) {
            (Some(fiscal_year), Some(account_id), Some(unit_id), Some(budget_type), Some(amount))
                if errors.is_empty() =>
            {
                Ok(BudgetInput {
                    fiscal_year,
                    account_id: AccountId::new(account_id),
                    unit_id: UnitId::new(unit_id),
                    budget_type,
                    amount,
                    description,
                })
            }
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn valid_form() -> BudgetForm {
        BudgetForm {
            fiscal_year: Some(2024),
            account_id: Some(1),
            unit_id: Some(1),
            budget_type: Some("initial".into()),
            amount: Some(json!(1_000_000)),
            description: Some("  ".into()),
        }
    }

    #[test]
    fn test_valid_budget() {
        let input = valid_form().validate().unwrap();
        assert_eq!(input.fiscal_year, 2024);
        assert_eq!(input.budget_type, BudgetType::Initial);
        assert_eq!(input.amount, dec!(1000000));
        assert_eq!(input.description, None);
    }

    #[test]
    fn test_missing_fields() {
        let errors = BudgetForm::default().validate().unwrap_err();
        for field in ["fiscal_year", "account_id", "unit_id", "type", "amount"] {
            assert!(errors.has(field), "{field}");
        }
        assert!(!errors.has("description"));
    }

    #[test]
    fn test_year_bounds() {
        for (year, ok) in [(1900, false), (1901, true), (2155, true), (2156, false)] {
            let form = BudgetForm {
                fiscal_year: Some(year),
                ..valid_form()
            };
            assert_eq!(form.validate().is_ok(), ok, "{year}");
        }
    }

    #[test]
    fn test_unknown_type() {
        let form = BudgetForm {
            budget_type: Some("annual".into()),
            ..valid_form()
        };
        assert_eq!(
            form.validate().unwrap_err().get("type"),
            ["Budget type must be initial, shifting, or revised.".to_string()]
        );
    }
}
