//! String-backed enums stored in entity columns, with conversions to the domain enums.

use medfin_core::account::AccountType as DomainAccountType;
use medfin_core::budget::BudgetType as DomainBudgetType;
use medfin_core::lifecycle::RecordStatus as DomainRecordStatus;
use medfin_core::transaction::TransactionType as DomainTransactionType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    #[sea_orm(string_value = "asset")]
    Asset,
    #[sea_orm(string_value = "liability")]
    Liability,
    #[sea_orm(string_value = "equity")]
    Equity,
    #[sea_orm(string_value = "revenue")]
    Revenue,
    #[sea_orm(string_value = "expense")]
    Expense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    #[sea_orm(string_value = "income")]
    Income,
    #[sea_orm(string_value = "expense")]
    Expense,
    #[sea_orm(string_value = "return")]
    Return,
    #[sea_orm(string_value = "correction")]
    Correction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum BudgetType {
    #[sea_orm(string_value = "initial")]
    Initial,
    #[sea_orm(string_value = "shifting")]
    Shifting,
    #[sea_orm(string_value = "revised")]
    Revised,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "locked")]
    Locked,
}

macro_rules! mirror_enum {
    ($db:ident <=> $domain:ident { $($variant:ident),+ $(,)? }) => {
        impl From<$domain> for $db {
            fn from(value: $domain) -> Self {
                match value {
                    $($domain::$variant => Self::$variant,)+
                }
            }
        }

        impl From<$db> for $domain {
            fn from(value: $db) -> Self {
                match value {
                    $($db::$variant => Self::$variant,)+
                }
            }
        }
    };
}

mirror_enum!(AccountType <=> DomainAccountType { Asset, Liability, Equity, Revenue, Expense });
mirror_enum!(TransactionType <=> DomainTransactionType { Income, Expense, Return, Correction });
mirror_enum!(BudgetType <=> DomainBudgetType { Initial, Shifting, Revised });
mirror_enum!(RecordStatus <=> DomainRecordStatus { Draft, Approved, Locked });

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_domain() {
        for status in DomainRecordStatus::ALL {
            let stored = RecordStatus::from(status);
            assert_eq!(stored.to_value(), status.as_str());
            assert_eq!(DomainRecordStatus::from(stored), status);
        }
    }

    #[test]
    fn test_transaction_type_values_match_domain_names() {
        for ty in DomainTransactionType::ALL {
            assert_eq!(TransactionType::from(ty).to_value(), ty.as_str());
        }
    }

    #[test]
    fn test_account_and_budget_values_match_domain_names() {
        for ty in DomainAccountType::ALL {
            assert_eq!(AccountType::from(ty).to_value(), ty.as_str());
        }
        for ty in DomainBudgetType::ALL {
            assert_eq!(BudgetType::from(ty).to_value(), ty.as_str());
        }
    }
}
