//! `SeaORM` Entity for transactions table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{RecordStatus, TransactionType};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub reference_number: String,
    pub transaction_date: Date,
    pub journal_date: Date,
    pub payment_date: Option<Date>,
    pub account_id: i64,
    pub unit_id: i64,
    pub transaction_type: TransactionType,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub amount: Decimal,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub proof_file: Option<String>,
    pub status: RecordStatus,
    pub created_by: i64,
    pub approved_by: Option<i64>,
    pub approved_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::ledger_accounts::Entity",
        from = "Column::AccountId",
        to = "super::ledger_accounts::Column::Id"
    )]
    LedgerAccounts,
    #[sea_orm(
        belongs_to = "super::organizational_units::Entity",
        from = "Column::UnitId",
        to = "super::organizational_units::Column::Id"
    )]
    OrganizationalUnits,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CreatedBy",
        to = "super::users::Column::Id"
    )]
    Creator,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::ApprovedBy",
        to = "super::users::Column::Id"
    )]
    Approver,
}

impl Related<super::ledger_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedgerAccounts.def()
    }
}

impl Related<super::organizational_units::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrganizationalUnits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
