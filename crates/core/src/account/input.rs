//! Write-boundary validation for ledger accounts.

use medfin_shared::FieldErrors;
use medfin_shared::types::AccountId;
use serde::Deserialize;

use super::types::{AccountType, validate_code};
use crate::validation::{filled, optional_text, required_text};

/// Raw account payload, used for both create and update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountForm {
    /// Dotted code.
    pub code: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Notes.
    pub description: Option<String>,
    /// Parent account id; absent for a root.
    pub parent_id: Option<i64>,
    /// One of asset, liability, equity, revenue, expense.
    #[serde(rename = "type")]
    pub account_type: Option<String>,
    /// Defaults to active.
    pub is_active: Option<bool>,
}

/// An account payload that passed field validation.
///
/// Level is derived from the parent by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInput {
    /// Dotted code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Notes.
    pub description: Option<String>,
    /// Parent account.
    pub parent_id: Option<AccountId>,
    /// Classification.
    pub account_type: AccountType,
    /// Active flag.
    pub is_active: bool,
}

impl AccountForm {
    /// Validates every field, reporting all failures at once.
    pub fn validate(&self) -> Result<AccountInput, FieldErrors> {
        let mut errors = FieldErrors::new();

        let code = match filled(self.code.as_deref()) {
            None => {
                errors.add("code", "Account code is required.");
                None
            }
            Some(code) if validate_code(code).is_err() => {
                errors.add(
                    "code",
                    "Account code must be dot-separated digits of at most 20 characters.",
                );
                None
            }
            Some(code) => Some(code.to_string()),
        };
        let name = required_text(
            &mut errors,
            "name",
            self.name.as_deref(),
            "Account name is required.",
            255,
            "Account name must not exceed 255 characters.",
        );
        let description = optional_text(
            &mut errors,
            "description",
            self.description.as_deref(),
            1000,
            "Description must not exceed 1000 characters.",
        );
        if matches!(self.parent_id, Some(id) if id <= 0) {
            errors.add("parent_id", "Selected parent account is invalid.");
        }
        let account_type = match filled(self.account_type.as_deref()) {
            None => {
                errors.add("type", "Account type is required.");
                None
            }
            Some(raw) => {
                let parsed = AccountType::parse(raw);
                if parsed.is_none() {
                    errors.add(
                        "type",
                        "Account type must be asset, liability, equity, revenue, or expense.",
                    );
                }
                parsed
            }
        };

        match (code, name, account_type) {
            (Some(code), Some(name), Some(account_type)) if errors.is_empty() => Ok(AccountInput {
                code,
                name,
                description,
                parent_id: self.parent_id.map(AccountId::new),
                account_type,
                is_active: self.is_active.unwrap_or(true),
            }),
            _ => Err(errors),
        }
    }
}
