//! Transaction listing filter.
//!
//! The raw query string is parsed once into a `TransactionFilter`; the store
//! translates that value into its own query form in one place.

use chrono::NaiveDate;
use medfin_shared::FieldErrors;
use serde::{Deserialize, Serialize};

use super::types::TransactionType;
use crate::lifecycle::RecordStatus;
use crate::validation::{filled, parse_date};

/// Query parameters accepted by the transaction listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionQuery {
    /// Free-text search over reference number and description.
    pub search: Option<String>,
    /// Exact transaction type.
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    /// Exact status.
    pub status: Option<String>,
    /// Inclusive lower bound on transaction date.
    pub date_from: Option<String>,
    /// Inclusive upper bound on transaction date.
    pub date_to: Option<String>,
    /// 1-indexed page.
    pub page: Option<u32>,
}

/// Parsed listing predicate. Every field is optional; empty matches all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransactionFilter {
    /// Trimmed search needle, case as entered.
    pub search: Option<String>,
    /// Type must equal.
    pub transaction_type: Option<TransactionType>,
    /// Status must equal.
    pub status: Option<RecordStatus>,
    /// Transaction date on or after.
    pub date_from: Option<NaiveDate>,
    /// Transaction date on or before.
    pub date_to: Option<NaiveDate>,
}

impl TransactionFilter {
    /// Creates a new empty filter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses query parameters; blank values are ignored, unknown enum values rejected.
    pub fn from_query(query: &TransactionQuery) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();

        let transaction_type = filled(query.transaction_type.as_deref()).and_then(|raw| {
            let parsed = TransactionType::parse(raw);
            if parsed.is_none() {
                errors.add(
                    "type",
                    "Transaction type must be income, expense, return, or correction.",
                );
            }
            parsed
        });
        let status = filled(query.status.as_deref()).and_then(|raw| {
            let parsed = RecordStatus::parse(raw);
            if parsed.is_none() {
                errors.add("status", "Status must be draft, approved, or locked.");
            }
            parsed
        });
        let date_from = parse_date(
            &mut errors,
            "date_from",
            query.date_from.as_deref(),
            None,
            "Start date must be a valid date.",
        );
        let date_to = parse_date(
            &mut errors,
            "date_to",
            query.date_to.as_deref(),
            None,
            "End date must be a valid date.",
        );

        errors.into_result(Self {
            search: filled(query.search.as_deref()).map(str::to_owned),
            transaction_type,
            status,
            date_from,
            date_to,
        })
    }

    /// Adds a search needle.
    #[must_use]
    pub fn with_search(mut self, needle: &str) -> Self {
        self.search = filled(Some(needle)).map(str::to_owned);
        self
    }

    /// Restricts to one type.
    #[must_use]
    pub const fn with_type(mut self, ty: TransactionType) -> Self {
        self.transaction_type = Some(ty);
        self
    }

    /// Restricts to one status.
    #[must_use]
    pub const fn with_status(mut self, status: RecordStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Restricts to an inclusive date range; either end may be open.
    #[must_use]
    pub const fn with_dates(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.date_from = from;
        self.date_to = to;
        self
    }

    /// Returns true if the filter is empty (matches everything).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.search.is_none()
            && self.transaction_type.is_none()
            && self.status.is_none()
            && self.date_from.is_none()
            && self.date_to.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_is_empty_filter() {
        let filter = TransactionFilter::from_query(&TransactionQuery::default()).unwrap();
        assert!(filter.is_empty());
        assert_eq!(filter, TransactionFilter::new());
    }

    #[test]
    fn test_blank_values_ignored() {
        let query = TransactionQuery {
            search: Some("  ".into()),
            transaction_type: Some(String::new()),
            status: Some(String::new()),
            date_from: Some(String::new()),
            ..TransactionQuery::default()
        };
        assert!(TransactionFilter::from_query(&query).unwrap().is_empty());
    }

    #[test]
    fn test_full_query() {
        let query = TransactionQuery {
            search: Some(" EXP-2024 ".into()),
            transaction_type: Some("expense".into()),
            status: Some("approved".into()),
            date_from: Some("2024-01-01".into()),
            date_to: Some("2024-01-31".into()),
            page: Some(2),
        };
        let filter = TransactionFilter::from_query(&query).unwrap();
        assert_eq!(
            filter,
            TransactionFilter::new()
                .with_search("EXP-2024")
                .with_type(TransactionType::Expense)
                .with_status(RecordStatus::Approved)
                .with_dates(
                    NaiveDate::from_ymd_opt(2024, 1, 1),
                    NaiveDate::from_ymd_opt(2024, 1, 31)
                )
        );
        assert_eq!(filter.search.as_deref(), Some("EXP-2024"));
    }

    #[test]
    fn test_unknown_values_rejected() {
        let query = TransactionQuery {
            transaction_type: Some("transfer".into()),
            status: Some("posted".into()),
            date_to: Some("yesterday".into()),
            ..TransactionQuery::default()
        };
        let errors = TransactionFilter::from_query(&query).unwrap_err();
        assert!(errors.has("type"));
        assert!(errors.has("status"));
        assert!(errors.has("date_to"));
    }
}
