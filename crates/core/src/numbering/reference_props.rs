//! Property tests for reference numbering.

use chrono::NaiveDate;
use proptest::prelude::*;

use super::reference::{Bucket, ReferenceNumber, next_sequence};

fn arb_type() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("income"),
        Just("expense"),
        Just("return"),
        Just("correction"),
    ]
}

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (2000i32..2100, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Given a fixed latest number the next one is latest + 1, same bucket.
    #[test]
    fn prop_next_is_deterministic_increment(
        ty in arb_type(),
        date in arb_date(),
        seq in 1u32..1_000_000
    ) {
        let bucket = Bucket::new(ty, date);
        let latest = bucket.reference(seq).to_string();
        let next = next_sequence(Some(&latest)).unwrap();
        prop_assert_eq!(next, seq + 1);
        let parsed: ReferenceNumber = bucket.reference(next).to_string().parse().unwrap();
        prop_assert_eq!(parsed.prefix(), bucket.prefix());
        prop_assert_eq!(parsed.date(), date);
    }

    /// Zero padding keeps same-width references in sequence order when sorted as text.
    #[test]
    fn prop_padded_references_sort_by_sequence(
        date in arb_date(),
        a in 1u32..10_000,
        b in 1u32..10_000
    ) {
        let bucket = Bucket::new("expense", date);
        let (ra, rb) = (bucket.reference(a).to_string(), bucket.reference(b).to_string());
        prop_assert_eq!(ra.cmp(&rb), a.cmp(&b));
    }
}
