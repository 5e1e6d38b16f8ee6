//! Human-readable transaction reference numbers.
//!
//! A reference looks like `EXP-20240315-0007`: a type prefix, the creation
//! date, and a per-(prefix, date) sequence. Sequences are assigned by the
//! store through a counter row per bucket; this module owns the format and
//! the arithmetic.

pub mod error;
pub mod reference;

#[cfg(test)]
mod reference_props;

pub use error::ReferenceError;
pub use reference::{Bucket, ReferenceNumber, next_sequence, prefix_for};
