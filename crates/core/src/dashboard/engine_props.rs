//! Property tests for dashboard aggregation.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::engine::DashboardEngine;
use super::types::{BudgetAllocation, LedgerActivity};
use crate::lifecycle::RecordStatus;
use crate::transaction::TransactionType;
use medfin_shared::types::AccountId;

fn arb_type() -> impl Strategy<Value = TransactionType> {
    prop_oneof![
        Just(TransactionType::Income),
        Just(TransactionType::Expense),
        Just(TransactionType::Return),
        Just(TransactionType::Correction),
    ]
}

fn arb_status() -> impl Strategy<Value = RecordStatus> {
    prop_oneof![
        Just(RecordStatus::Draft),
        Just(RecordStatus::Approved),
        Just(RecordStatus::Locked),
    ]
}

fn arb_activity() -> impl Strategy<Value = LedgerActivity> {
    (
        1i64..6,
        arb_type(),
        arb_status(),
        0i64..10_000_000_000,
        (2022i32..2026, 1u32..=12, 1u32..=28),
    )
        .prop_map(|(account, ty, status, cents, (y, m, d))| LedgerActivity {
            account_id: AccountId::new(account),
            transaction_type: ty,
            status,
            amount: Decimal::new(cents, 2),
            transaction_date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
        })
}

fn arb_budget() -> impl Strategy<Value = BudgetAllocation> {
    (1i64..6, 2022i32..2026, arb_status(), 0i64..10_000_000_000).prop_map(
        |(account, fiscal_year, status, cents)| BudgetAllocation {
            account_id: AccountId::new(account),
            fiscal_year,
            status,
            amount: Decimal::new(cents, 2),
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Cash balance is approved income minus approved expense, in any order.
    #[test]
    fn prop_cash_balance_order_independent(
        rows in prop::collection::vec(arb_activity(), 0..40).prop_shuffle()
    ) {
        let expected: Decimal = rows
            .iter()
            .filter(|r| r.status == RecordStatus::Approved)
            .map(|r| match r.transaction_type {
                TransactionType::Income => r.amount,
                TransactionType::Expense => -r.amount,
                _ => Decimal::ZERO,
            })
            .sum();

        let forward = DashboardEngine::new(&rows, &[]).total_cash_balance();
        let mut reversed = rows.clone();
        reversed.reverse();
        let backward = DashboardEngine::new(&reversed, &[]).total_cash_balance();

        prop_assert_eq!(forward, expected);
        prop_assert_eq!(backward, expected);
    }

    /// The trend always has twelve entries, months 1..=12, summing to the year's totals.
    #[test]
    fn prop_trend_twelve_entries(
        rows in prop::collection::vec(arb_activity(), 0..40),
        year in 2021i32..2027
    ) {
        let engine = DashboardEngine::new(&rows, &[]);
        let trend = engine.monthly_trend(year);
        prop_assert_eq!(trend.len(), 12);
        for (i, point) in trend.iter().enumerate() {
            prop_assert_eq!(point.month as usize, i + 1);
            prop_assert_eq!(point.income, engine.monthly_income(year, point.month));
            prop_assert_eq!(point.expense, engine.monthly_expense(year, point.month));
        }
    }

    /// Without an approved budget for the year utilization is exactly zero.
    #[test]
    fn prop_zero_budget_zero_utilization(
        rows in prop::collection::vec(arb_activity(), 0..40),
        budgets in prop::collection::vec(arb_budget(), 0..10),
        year in 2030i32..2040
    ) {
        let engine = DashboardEngine::new(&rows, &budgets);
        prop_assert_eq!(engine.total_budget(year), Decimal::ZERO);
        prop_assert_eq!(engine.budget_utilization(year), Decimal::ZERO);
    }
}
