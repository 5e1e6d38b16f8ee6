//! Budget arithmetic.

use rust_decimal::Decimal;

/// Budget service for business logic.
pub struct BudgetService;

impl BudgetService {
    /// Realization as a percentage of the budget, two decimals.
    ///
    /// Zero when the budget is zero. Not clamped: over-spend yields more
    /// than 100 and net-negative realization yields a negative value.
    #[must_use]
    pub fn utilization_percent(realization: Decimal, budget: Decimal) -> Decimal {
        if budget.is_zero() {
            Decimal::ZERO
        } else {
            (realization / budget * Decimal::ONE_HUNDRED).round_dp(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_utilization_basic() {
        assert_eq!(
            BudgetService::utilization_percent(dec!(500000), dec!(3000000)),
            dec!(16.67)
        );
        assert_eq!(
            BudgetService::utilization_percent(dec!(800), dec!(1000)),
            dec!(80.00)
        );
    }

    #[test]
    fn test_utilization_not_clamped() {
        assert_eq!(
            BudgetService::utilization_percent(dec!(1500), dec!(1000)),
            dec!(150.00)
        );
        assert_eq!(
            BudgetService::utilization_percent(dec!(-250), dec!(1000)),
            dec!(-25.00)
        );
    }

    #[test]
    fn test_zero_budget_utilization() {
        assert_eq!(
            BudgetService::utilization_percent(dec!(500), dec!(0)),
            Decimal::ZERO
        );
    }
}
