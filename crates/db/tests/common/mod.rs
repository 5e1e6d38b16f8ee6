//! Shared fixtures for repository tests.

#![allow(dead_code)]

use chrono::{NaiveDate, Utc};
use medfin_core::account::{AccountInput, AccountType};
use medfin_core::transaction::{TransactionInput, TransactionType};
use medfin_core::unit::UnitInput;
use medfin_db::entities::sea_orm_active_enums::{self, RecordStatus};
use medfin_db::entities::transactions;
use medfin_db::migration::Migrator;
use medfin_db::{AccountRepository, UnitRepository, UserRepository, connect_with};
use medfin_shared::config::DatabaseConfig;
use medfin_shared::types::{AccountId, UnitId, UserId};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;

/// Fresh in-memory database with the schema applied.
///
/// One pooled connection, so every query sees the same in-memory database.
pub async fn setup() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("Failed to connect to database");
    Migrator::up(&db, None).await.expect("Failed to run migrations");
    db
}

/// Fresh file-backed database shared by a pool of `max_connections`.
///
/// Unlike the in-memory database, writers on separate connections contend
/// for the same lock.
pub async fn setup_file(max_connections: u32) -> DatabaseConnection {
    let path = std::env::temp_dir().join(format!(
        "medfin-db-{}-{}.sqlite",
        std::process::id(),
        Utc::now().timestamp_nanos_opt().unwrap_or_default()
    ));
    let config = DatabaseConfig {
        url: format!("sqlite://{}?mode=rwc", path.display()),
        max_connections,
        min_connections: 1,
        busy_timeout_secs: 5,
    };
    let db = connect_with(&config)
        .await
        .expect("Failed to connect to database");
    Migrator::up(&db, None).await.expect("Failed to run migrations");
    db
}

/// Ids of the rows every ledger test needs.
pub struct Fixture {
    pub db: DatabaseConnection,
    pub user: UserId,
    pub root: AccountId,
    pub expense: AccountId,
    pub unit: UnitId,
}

/// Database with one user, a two-level expense branch and one unit.
pub async fn fixture() -> Fixture {
    fixture_on(setup().await).await
}

/// Same rows as [`fixture`] on an existing database.
pub async fn fixture_on(db: DatabaseConnection) -> Fixture {
    let user = UserRepository::new(db.clone())
        .create("Administrator", "admin@medfin.test")
        .await
        .expect("Failed to create user");

    let accounts = AccountRepository::new(db.clone());
    let root = accounts
        .create(account("5", "Belanja", None, AccountType::Expense))
        .await
        .expect("Failed to create root account");
    let expense = accounts
        .create(account(
            "5.1",
            "Belanja Operasi",
            Some(AccountId::new(root.id)),
            AccountType::Expense,
        ))
        .await
        .expect("Failed to create child account");

    let unit = UnitRepository::new(db.clone())
        .create(UnitInput {
            code: "IGD".into(),
            name: "Instalasi Gawat Darurat".into(),
            description: None,
            is_active: true,
        })
        .await
        .expect("Failed to create unit");

    Fixture {
        db,
        user: UserId::new(user.id),
        root: AccountId::new(root.id),
        expense: AccountId::new(expense.id),
        unit: UnitId::new(unit.id),
    }
}

pub fn account(
    code: &str,
    name: &str,
    parent_id: Option<AccountId>,
    account_type: AccountType,
) -> AccountInput {
    AccountInput {
        code: code.into(),
        name: name.into(),
        description: None,
        parent_id,
        account_type,
        is_active: true,
    }
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn transaction_input(
    fx: &Fixture,
    account_id: AccountId,
    transaction_type: TransactionType,
    amount: Decimal,
    date: NaiveDate,
    description: &str,
) -> TransactionInput {
    TransactionInput {
        transaction_date: date,
        journal_date: date,
        payment_date: None,
        account_id,
        unit_id: fx.unit,
        transaction_type,
        amount,
        description: description.into(),
    }
}

/// Inserts a transaction row with a fixed reference, bypassing numbering.
pub async fn insert_raw(fx: &Fixture, reference: &str) -> transactions::Model {
    let date = day(2024, 3, 15);
    let now = Utc::now();
    transactions::ActiveModel {
        reference_number: Set(reference.into()),
        transaction_date: Set(date),
        journal_date: Set(date),
        payment_date: Set(None),
        account_id: Set(fx.expense.into_inner()),
        unit_id: Set(fx.unit.into_inner()),
        transaction_type: Set(sea_orm_active_enums::TransactionType::Expense),
        amount: Set(Decimal::ONE_HUNDRED),
        description: Set("Imported".into()),
        proof_file: Set(None),
        status: Set(RecordStatus::Draft),
        created_by: Set(fx.user.into_inner()),
        approved_by: Set(None),
        approved_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&fx.db)
    .await
    .expect("Failed to insert transaction")
}
