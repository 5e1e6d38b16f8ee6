//! Database seeder for Medfin development and testing.
//!
//! Seeds an administrator, the hospital units, a SAP BLUD style chart of
//! accounts, approved budgets for the current year and a year of approved
//! income and expense transactions. Everything goes through the
//! repositories, so reference counters stay consistent with the rows.
//!
//! Usage: cargo run --bin seeder

use std::collections::HashMap;

use anyhow::Context;
use chrono::{Datelike, Duration, NaiveDate, Utc};
use medfin_core::account::{AccountInput, AccountType};
use medfin_core::budget::{BudgetInput, BudgetType};
use medfin_core::transaction::{TransactionInput, TransactionType};
use medfin_core::unit::UnitInput;
use medfin_db::{
    AccountFilter, AccountRepository, BudgetRepository, TransactionRepository, UnitRepository,
    UserRepository, connect_with,
};
use medfin_shared::AppConfig;
use medfin_shared::types::{AccountId, BudgetId, TransactionId, UnitId, UserId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const ADMIN_EMAIL: &str = "admin@medfin.local";

/// Fixed seed so every fresh database looks the same.
const RNG_SEED: u64 = 0x6d65_6466_696e;

const INCOME_TRANSACTIONS: usize = 50;
const EXPENSE_TRANSACTIONS: usize = 100;

const UNITS: &[(&str, &str, &str)] = &[
    ("IGD", "Instalasi Gawat Darurat", "Emergency Department"),
    ("RAWAT", "Rawat Inap", "Inpatient Care"),
    ("JALAN", "Rawat Jalan", "Outpatient Care"),
    ("LAB", "Laboratorium", "Laboratory Services"),
    ("RAD", "Radiologi", "Radiology Department"),
    ("FARM", "Farmasi", "Pharmacy"),
];

/// `(code, name, type)`; parents are found by dropping the last code segment.
const ACCOUNTS: &[(&str, &str, AccountType)] = &[
    ("1", "ASET", AccountType::Asset),
    ("1.1", "ASET LANCAR", AccountType::Asset),
    ("1.1.1", "Kas dan Setara Kas", AccountType::Asset),
    ("1.1.1.01", "Kas di Bendahara Pengeluaran", AccountType::Asset),
    ("1.1.1.02", "Kas di Bendahara Penerimaan", AccountType::Asset),
    ("1.1.2", "Investasi Jangka Pendek", AccountType::Asset),
    ("1.1.3", "Piutang", AccountType::Asset),
    ("1.1.3.01", "Piutang Pasien", AccountType::Asset),
    ("1.1.3.02", "Piutang BPJS", AccountType::Asset),
    ("2", "KEWAJIBAN", AccountType::Liability),
    ("2.1", "KEWAJIBAN JANGKA PENDEK", AccountType::Liability),
    ("2.1.1", "Utang Usaha", AccountType::Liability),
    ("2.1.2", "Utang Pajak", AccountType::Liability),
    ("3", "EKUITAS", AccountType::Equity),
    ("3.1", "EKUITAS AWAL", AccountType::Equity),
    ("4", "PENDAPATAN", AccountType::Revenue),
    ("4.1", "PENDAPATAN USAHA", AccountType::Revenue),
    ("4.1.1", "Pendapatan Pelayanan Kesehatan", AccountType::Revenue),
    ("4.1.1.01", "Pendapatan Rawat Inap", AccountType::Revenue),
    ("4.1.1.02", "Pendapatan Rawat Jalan", AccountType::Revenue),
    ("4.1.1.03", "Pendapatan IGD", AccountType::Revenue),
    ("5", "BEBAN", AccountType::Expense),
    ("5.1", "BEBAN OPERASIONAL", AccountType::Expense),
    ("5.1.1", "Beban Pegawai", AccountType::Expense),
    ("5.1.1.01", "Gaji dan Tunjangan", AccountType::Expense),
    ("5.1.2", "Beban Barang dan Jasa", AccountType::Expense),
    ("5.1.2.01", "Obat-obatan", AccountType::Expense),
    ("5.1.2.02", "Alat Kesehatan", AccountType::Expense),
];

/// A seeded leaf account.
struct Leaf {
    id: AccountId,
    name: &'static str,
    account_type: AccountType,
}

/// A seeded unit.
struct Unit {
    id: UnitId,
    name: &'static str,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seeder=info,medfin=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let db = connect_with(&config.database)
        .await
        .context("Failed to connect to database")?;

    let admin = seed_admin(&UserRepository::new(db.clone())).await?;

    let accounts = AccountRepository::new(db.clone());
    if !accounts.list(&AccountFilter::default()).await?.is_empty() {
        info!("Chart of accounts already present, skipping ledger seed");
        return Ok(());
    }

    let units = seed_units(&UnitRepository::new(db.clone())).await?;
    let leaves = seed_accounts(&accounts).await?;

    let mut rng = StdRng::seed_from_u64(RNG_SEED);
    let today = Utc::now().date_naive();

    seed_budgets(
        &BudgetRepository::new(db.clone()),
        admin,
        today.year(),
        &leaves,
        &units,
        &mut rng,
    )
    .await?;

    let transactions = TransactionRepository::new(db)
        .with_retry_limit(config.ledger.reference_retry_limit);
    seed_transactions(&transactions, admin, today, &leaves, &units, &mut rng).await?;

    info!("Seeding complete");
    Ok(())
}

async fn seed_admin(users: &UserRepository) -> anyhow::Result<UserId> {
    if let Some(user) = users.find_by_email(ADMIN_EMAIL).await? {
        info!(user_id = user.id, "Administrator already exists");
        return Ok(UserId::new(user.id));
    }
    let user = users.create("Administrator", ADMIN_EMAIL).await?;
    info!(user_id = user.id, email = ADMIN_EMAIL, "Created administrator");
    Ok(UserId::new(user.id))
}

async fn seed_units(repo: &UnitRepository) -> anyhow::Result<Vec<Unit>> {
    let mut units = Vec::with_capacity(UNITS.len());
    for &(code, name, description) in UNITS {
        let unit = repo
            .create(UnitInput {
                code: code.to_string(),
                name: name.to_string(),
                description: Some(description.to_string()),
                is_active: true,
            })
            .await?;
        units.push(Unit {
            id: UnitId::new(unit.id),
            name,
        });
    }
    info!(count = units.len(), "Seeded hospital units");
    Ok(units)
}

/// Inserts the chart in order and returns the level-4 accounts.
async fn seed_accounts(repo: &AccountRepository) -> anyhow::Result<Vec<Leaf>> {
    let mut ids: HashMap<&str, AccountId> = HashMap::new();
    let mut leaves = Vec::new();

    for &(code, name, account_type) in ACCOUNTS {
        let parent_id = match code.rsplit_once('.') {
            Some((parent, _)) => Some(
                *ids.get(parent)
                    .with_context(|| format!("Parent {parent} of {code} is not seeded"))?,
            ),
            None => None,
        };
        let account = repo
            .create(AccountInput {
                code: code.to_string(),
                name: name.to_string(),
                description: None,
                parent_id,
                account_type,
                is_active: true,
            })
            .await?;
        let id = AccountId::new(account.id);
        ids.insert(code, id);
        if account.level == 4 {
            leaves.push(Leaf {
                id,
                name,
                account_type,
            });
        }
    }
    info!(count = ids.len(), "Seeded chart of accounts");
    Ok(leaves)
}

async fn seed_budgets(
    repo: &BudgetRepository,
    admin: UserId,
    year: i32,
    leaves: &[Leaf],
    units: &[Unit],
    rng: &mut StdRng,
) -> anyhow::Result<()> {
    let mut count = 0;
    for unit in units {
        for account in leaves
            .iter()
            .filter(|a| a.account_type == AccountType::Expense)
        {
            let input = BudgetInput {
                fiscal_year: year,
                account_id: account.id,
                unit_id: unit.id,
                budget_type: BudgetType::Initial,
                amount: Decimal::from(rng.random_range(10_000_000_i64..=100_000_000)),
                description: Some(format!("Budget for {} - {}", account.name, unit.name)),
            };
            let budget = repo.create(&input, admin).await?;
            repo.approve(BudgetId::new(budget.id), admin).await?;
            count += 1;
        }
    }
    info!(count, year, "Seeded approved budgets");
    Ok(())
}

async fn seed_transactions(
    repo: &TransactionRepository,
    admin: UserId,
    today: NaiveDate,
    leaves: &[Leaf],
    units: &[Unit],
    rng: &mut StdRng,
) -> anyhow::Result<()> {
    let revenue: Vec<&Leaf> = leaves
        .iter()
        .filter(|a| a.account_type == AccountType::Revenue)
        .collect();
    let expense: Vec<&Leaf> = leaves
        .iter()
        .filter(|a| a.account_type == AccountType::Expense)
        .collect();

    let plan = [
        (
            TransactionType::Income,
            &revenue,
            INCOME_TRANSACTIONS,
            1_000_000_i64..=50_000_000,
            "Revenue from",
        ),
        (
            TransactionType::Expense,
            &expense,
            EXPENSE_TRANSACTIONS,
            500_000_i64..=25_000_000,
            "Expense for",
        ),
    ];

    for (transaction_type, accounts, count, amounts, label) in plan {
        if accounts.is_empty() {
            continue;
        }
        for _ in 0..count {
            let account = accounts[rng.random_range(0..accounts.len())];
            let unit = &units[rng.random_range(0..units.len())];
            let date = today - Duration::days(rng.random_range(1..=365));
            let payment_date = date + Duration::days(rng.random_range(0..=30));

            let input = TransactionInput {
                transaction_date: date,
                journal_date: date,
                payment_date: Some(payment_date),
                account_id: account.id,
                unit_id: unit.id,
                transaction_type,
                amount: Decimal::from(rng.random_range(amounts.clone())),
                description: format!("{label} {} - {}", account.name, unit.name),
            };
            let transaction = repo.create(&input, admin, today).await?;
            repo.approve(TransactionId::new(transaction.id), admin)
                .await?;
        }
        info!(count, transaction_type = %transaction_type.as_str(), "Seeded approved transactions");
    }
    Ok(())
}
