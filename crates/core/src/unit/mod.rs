//! Organizational (hospital) units.

use medfin_shared::FieldErrors;
use serde::Deserialize;

use crate::validation::{optional_text, required_text};

/// Maximum length of a unit code.
pub const MAX_UNIT_CODE_LEN: usize = 10;

/// Raw unit payload, used for both create and update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnitForm {
    /// Short code, e.g. `IGD`.
    pub code: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Notes.
    pub description: Option<String>,
    /// Defaults to active.
    pub is_active: Option<bool>,
}

/// A unit payload that passed field validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitInput {
    /// Short code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Notes.
    pub description: Option<String>,
    /// Active flag.
    pub is_active: bool,
}

impl UnitForm {
    /// Validates every field, reporting all failures at once.
    pub fn validate(&self) -> Result<UnitInput, FieldErrors> {
        let mut errors = FieldErrors::new();
        let code = required_text(
            &mut errors,
            "code",
            self.code.as_deref(),
            "Unit code is required.",
            MAX_UNIT_CODE_LEN,
            "Unit code must not exceed 10 characters.",
        );
        let name = required_text(
            &mut errors,
            "name",
            self.name.as_deref(),
            "Unit name is required.",
            255,
            "Unit name must not exceed 255 characters.",
        );
        let description = optional_text(
            &mut errors,
            "description",
            self.description.as_deref(),
            1000,
            "Description must not exceed 1000 characters.",
        );

        match (code, name) {
            (Some(code), Some(name)) if errors.is_empty() => Ok(UnitInput {
                code,
                name,
                description,
                is_active: self.is_active.unwrap_or(true),
            }),
            _ => Err(errors),
        }
    }
}
