//! Reference number format.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

use super::error::ReferenceError;

/// Minimum width of the sequence suffix.
pub const SEQUENCE_WIDTH: usize = 4;

/// Prefix for a transaction type name. Unknown names fall back to `TRX`.
#[must_use]
pub fn prefix_for(transaction_type: &str) -> &'static str {
    match transaction_type {
        "income" => "REV",
        "expense" => "EXP",
        "return" => "RET",
        "correction" => "COR",
        _ => "TRX",
    }
}

/// One numbering scope: all references sharing a prefix and a date.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Bucket {
    prefix: &'static str,
    date: NaiveDate,
}

impl Bucket {
    /// Bucket for a transaction type created on `date`.
    #[must_use]
    pub fn new(transaction_type: &str, date: NaiveDate) -> Self {
        Self {
            prefix: prefix_for(transaction_type),
            date,
        }
    }

    /// The three-letter prefix.
    #[must_use]
    pub fn prefix(&self) -> &'static str {
        self.prefix
    }

    /// The creation date.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Storage key, e.g. `EXP-20240315`.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}-{}", self.prefix, self.date.format("%Y%m%d"))
    }

    /// `LIKE` pattern matching every reference in the bucket.
    ///
    /// The key only holds letters, digits, and `-`, so no escaping is needed.
    #[must_use]
    pub fn like_pattern(&self) -> String {
        format!("{}-%", self.key())
    }

    /// The reference carrying `sequence` in this bucket.
    #[must_use]
    pub fn reference(&self, sequence: u32) -> ReferenceNumber {
        ReferenceNumber {
            prefix: self.prefix.to_string(),
            date: self.date,
            sequence,
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// A parsed reference number.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReferenceNumber {
    prefix: String,
    date: NaiveDate,
    sequence: u32,
}

impl ReferenceNumber {
    /// The prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The bucket date.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// The sequence within the bucket.
    #[must_use]
    pub fn sequence(&self) -> u32 {
        self.sequence
    }
}

impl fmt::Display for ReferenceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{:0width$}",
            self.prefix,
            self.date.format("%Y%m%d"),
            self.sequence,
            width = SEQUENCE_WIDTH
        )
    }
}

impl FromStr for ReferenceNumber {
    type Err = ReferenceError;

    /// Parses `{PREFIX}-{YYYYMMDD}-{digits}`; the suffix may exceed four digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ReferenceError::Malformed(s.to_string());

        let mut parts = s.splitn(3, '-');
        let (Some(prefix), Some(date), Some(suffix)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(malformed());
        };

        if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(malformed());
        }
        if date.len() != 8 {
            return Err(malformed());
        }
        let date = NaiveDate::parse_from_str(date, "%Y%m%d").map_err(|_| malformed())?;
        if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        let sequence = suffix.parse().map_err(|_| malformed())?;

        Ok(Self {
            prefix: prefix.to_string(),
            date,
            sequence,
        })
    }
}

impl Serialize for ReferenceNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Sequence following the newest number seen in a bucket.
///
/// `None` (empty bucket) starts at 1. A latest number that does not parse
/// also restarts at 1; uniqueness is still enforced by the store.
pub fn next_sequence(latest: Option<&str>) -> Result<u32, ReferenceError> {
    let Some(latest) = latest else {
        return Ok(1);
    };
    let current = latest
        .parse::<ReferenceNumber>()
        .map(|r| r.sequence())
        .unwrap_or(0);
    current
        .checked_add(1)
        .ok_or_else(|| ReferenceError::Exhausted(latest.to_string()))
}
