//! Initial schema.
//!
//! Built with the schema builder only, so the same migration runs on
//! PostgreSQL and SQLite.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(id_col(Users::Id))
                    .col(ColumnDef::new(Users::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Users::Email).string_len(255).not_null())
                    .col(timestamp_col(Users::CreatedAt))
                    .col(timestamp_col(Users::UpdatedAt))
                    .to_owned(),
            )
            .await?;
        unique_index(manager, "idx_users_email", Users::Table, Users::Email).await?;

        manager
            .create_table(
                Table::create()
                    .table(OrganizationalUnits::Table)
                    .if_not_exists()
                    .col(id_col(OrganizationalUnits::Id))
                    .col(ColumnDef::new(OrganizationalUnits::Code).string_len(10).not_null())
                    .col(ColumnDef::new(OrganizationalUnits::Name).string_len(255).not_null())
                    .col(ColumnDef::new(OrganizationalUnits::Description).text().null())
                    .col(
                        ColumnDef::new(OrganizationalUnits::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(timestamp_col(OrganizationalUnits::CreatedAt))
                    .col(timestamp_col(OrganizationalUnits::UpdatedAt))
                    .to_owned(),
            )
            .await?;
        unique_index(
            manager,
            "idx_organizational_units_code",
            OrganizationalUnits::Table,
            OrganizationalUnits::Code,
        )
        .await?;

        manager
            .create_table(
                Table::create()
                    .table(LedgerAccounts::Table)
                    .if_not_exists()
                    .col(id_col(LedgerAccounts::Id))
                    .col(ColumnDef::new(LedgerAccounts::Code).string_len(20).not_null())
                    .col(ColumnDef::new(LedgerAccounts::Name).string_len(255).not_null())
                    .col(ColumnDef::new(LedgerAccounts::Description).text().null())
                    .col(ColumnDef::new(LedgerAccounts::ParentId).big_integer().null())
                    .col(ColumnDef::new(LedgerAccounts::AccountType).string_len(16).not_null())
                    .col(ColumnDef::new(LedgerAccounts::Level).integer().not_null())
                    .col(
                        ColumnDef::new(LedgerAccounts::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(timestamp_col(LedgerAccounts::CreatedAt))
                    .col(timestamp_col(LedgerAccounts::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ledger_accounts_parent")
                            .from(LedgerAccounts::Table, LedgerAccounts::ParentId)
                            .to(LedgerAccounts::Table, LedgerAccounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;
        unique_index(
            manager,
            "idx_ledger_accounts_code",
            LedgerAccounts::Table,
            LedgerAccounts::Code,
        )
        .await?;
        plain_index(
            manager,
            "idx_ledger_accounts_parent",
            LedgerAccounts::Table,
            LedgerAccounts::ParentId,
        )
        .await?;

        manager
            .create_table(
                Table::create()
                    .table(Budgets::Table)
                    .if_not_exists()
                    .col(id_col(Budgets::Id))
                    .col(ColumnDef::new(Budgets::FiscalYear).integer().not_null())
                    .col(ColumnDef::new(Budgets::AccountId).big_integer().not_null())
                    .col(ColumnDef::new(Budgets::UnitId).big_integer().not_null())
                    .col(ColumnDef::new(Budgets::BudgetType).string_len(16).not_null())
                    .col(ColumnDef::new(Budgets::Amount).decimal_len(15, 2).not_null())
                    .col(ColumnDef::new(Budgets::Description).text().null())
                    .col(ColumnDef::new(Budgets::Status).string_len(16).not_null())
                    .col(ColumnDef::new(Budgets::CreatedBy).big_integer().not_null())
                    .col(ColumnDef::new(Budgets::ApprovedBy).big_integer().null())
                    .col(
                        ColumnDef::new(Budgets::ApprovedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(timestamp_col(Budgets::CreatedAt))
                    .col(timestamp_col(Budgets::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_budgets_account")
                            .from(Budgets::Table, Budgets::AccountId)
                            .to(LedgerAccounts::Table, LedgerAccounts::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_budgets_unit")
                            .from(Budgets::Table, Budgets::UnitId)
                            .to(OrganizationalUnits::Table, OrganizationalUnits::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_budgets_creator")
                            .from(Budgets::Table, Budgets::CreatedBy)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_budgets_approver")
                            .from(Budgets::Table, Budgets::ApprovedBy)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;
        plain_index(manager, "idx_budgets_fiscal_year", Budgets::Table, Budgets::FiscalYear)
            .await?;
        plain_index(manager, "idx_budgets_account", Budgets::Table, Budgets::AccountId).await?;

        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(id_col(Transactions::Id))
                    .col(
                        ColumnDef::new(Transactions::ReferenceNumber)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::TransactionDate).date().not_null())
                    .col(ColumnDef::new(Transactions::JournalDate).date().not_null())
                    .col(ColumnDef::new(Transactions::PaymentDate).date().null())
                    .col(ColumnDef::new(Transactions::AccountId).big_integer().not_null())
                    .col(ColumnDef::new(Transactions::UnitId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Transactions::TransactionType)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Amount).decimal_len(15, 2).not_null())
                    .col(ColumnDef::new(Transactions::Description).text().not_null())
                    .col(ColumnDef::new(Transactions::ProofFile).string_len(512).null())
                    .col(ColumnDef::new(Transactions::Status).string_len(16).not_null())
                    .col(ColumnDef::new(Transactions::CreatedBy).big_integer().not_null())
                    .col(ColumnDef::new(Transactions::ApprovedBy).big_integer().null())
                    .col(
                        ColumnDef::new(Transactions::ApprovedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(timestamp_col(Transactions::CreatedAt))
                    .col(timestamp_col(Transactions::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_account")
                            .from(Transactions::Table, Transactions::AccountId)
                            .to(LedgerAccounts::Table, LedgerAccounts::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_unit")
                            .from(Transactions::Table, Transactions::UnitId)
                            .to(OrganizationalUnits::Table, OrganizationalUnits::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_creator")
                            .from(Transactions::Table, Transactions::CreatedBy)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_approver")
                            .from(Transactions::Table, Transactions::ApprovedBy)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;
        unique_index(
            manager,
            "idx_transactions_reference_number",
            Transactions::Table,
            Transactions::ReferenceNumber,
        )
        .await?;
        plain_index(
            manager,
            "idx_transactions_date",
            Transactions::Table,
            Transactions::TransactionDate,
        )
        .await?;
        plain_index(
            manager,
            "idx_transactions_account",
            Transactions::Table,
            Transactions::AccountId,
        )
        .await?;

        manager
            .create_table(
                Table::create()
                    .table(ReferenceSequences::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ReferenceSequences::Bucket)
                            .string_len(16)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ReferenceSequences::LastValue)
                            .big_integer()
                            .not_null(),
                    )
                    .col(timestamp_col(ReferenceSequences::UpdatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            ReferenceSequences::Table.into_iden(),
            Transactions::Table.into_iden(),
            Budgets::Table.into_iden(),
            LedgerAccounts::Table.into_iden(),
            OrganizationalUnits::Table.into_iden(),
            Users::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}

fn id_col<T: IntoIden>(name: T) -> ColumnDef {
    ColumnDef::new(name)
        .big_integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

fn timestamp_col<T: IntoIden>(name: T) -> ColumnDef {
    ColumnDef::new(name)
        .timestamp_with_time_zone()
        .not_null()
        .to_owned()
}

async fn unique_index<T, C>(
    manager: &SchemaManager<'_>,
    name: &str,
    table: T,
    col: C,
) -> Result<(), DbErr>
where
    T: IntoIden + 'static,
    C: IntoIden + 'static,
{
    manager
        .create_index(
            Index::create()
                .name(name)
                .table(table)
                .col(col)
                .unique()
                .if_not_exists()
                .to_owned(),
        )
        .await
}

async fn plain_index<T, C>(
    manager: &SchemaManager<'_>,
    name: &str,
    table: T,
    col: C,
) -> Result<(), DbErr>
where
    T: IntoIden + 'static,
    C: IntoIden + 'static,
{
    manager
        .create_index(
            Index::create()
                .name(name)
                .table(table)
                .col(col)
                .if_not_exists()
                .to_owned(),
        )
        .await
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum OrganizationalUnits {
    Table,
    Id,
    Code,
    Name,
    Description,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum LedgerAccounts {
    Table,
    Id,
    Code,
    Name,
    Description,
    ParentId,
    AccountType,
    Level,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Budgets {
    Table,
    Id,
    FiscalYear,
    AccountId,
    UnitId,
    BudgetType,
    Amount,
    Description,
    Status,
    CreatedBy,
    ApprovedBy,
    ApprovedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Transactions {
    Table,
    Id,
    ReferenceNumber,
    TransactionDate,
    JournalDate,
    PaymentDate,
    AccountId,
    UnitId,
    TransactionType,
    Amount,
    Description,
    ProofFile,
    Status,
    CreatedBy,
    ApprovedBy,
    ApprovedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ReferenceSequences {
    Table,
    Bucket,
    LastValue,
    UpdatedAt,
}
