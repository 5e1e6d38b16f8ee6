//! Integration tests for the account and unit repositories.

mod common;

use common::{account, day, fixture, setup, transaction_input};
use medfin_core::account::{AccountType, HierarchyError};
use medfin_core::transaction::TransactionType;
use medfin_core::unit::UnitInput;
use medfin_db::entities::sea_orm_active_enums;
use medfin_db::{
    AccountError, AccountFilter, AccountRepository, TransactionRepository, UnitError,
    UnitRepository,
};
use medfin_shared::AppError;
use medfin_shared::types::{AccountId, UnitId};
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_levels_are_derived_from_parents() {
    let db = setup().await;
    let repo = AccountRepository::new(db);

    let root = repo
        .create(account("1", "Aset", None, AccountType::Asset))
        .await
        .unwrap();
    let child = repo
        .create(account("1.1", "Aset Lancar", Some(AccountId::new(root.id)), AccountType::Asset))
        .await
        .unwrap();
    let grandchild = repo
        .create(account("1.1.1", "Kas", Some(AccountId::new(child.id)), AccountType::Asset))
        .await
        .unwrap();

    assert_eq!(root.level, 1);
    assert_eq!(child.level, 2);
    assert_eq!(grandchild.level, 3);
    assert_eq!(grandchild.parent_id, Some(child.id));
    assert_eq!(grandchild.account_type, sea_orm_active_enums::AccountType::Asset);

    let tree = repo.load_tree().await.unwrap();
    assert_eq!(
        tree.ancestors(AccountId::new(grandchild.id)).unwrap(),
        vec![AccountId::new(child.id), AccountId::new(root.id)]
    );
}

#[tokio::test]
async fn test_create_rejects_bad_placement() {
    let db = setup().await;
    let repo = AccountRepository::new(db);
    repo.create(account("1", "Aset", None, AccountType::Asset))
        .await
        .unwrap();

    let err = repo
        .create(account("1", "Duplicate", None, AccountType::Asset))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AccountError::Hierarchy(HierarchyError::DuplicateCode(_))
    ));
    let AppError::InvalidFields(fields) = AppError::from(err) else {
        panic!("expected field errors");
    };
    assert_eq!(fields.get("code"), ["Account code has already been taken."]);

    let err = repo
        .create(account("9.1", "Orphan", Some(AccountId::new(42)), AccountType::Asset))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AccountError::Hierarchy(HierarchyError::ParentNotFound(_))
    ));
}

#[tokio::test]
async fn test_update_rejects_cycles_and_depth_changes() {
    let fx = fixture().await;
    let repo = AccountRepository::new(fx.db.clone());
    let leaf = repo
        .create(account("5.1.1", "Belanja Pegawai", Some(fx.expense), AccountType::Expense))
        .await
        .unwrap();

    let err = repo
        .update(
            fx.root,
            account("5", "Belanja", Some(AccountId::new(leaf.id)), AccountType::Expense),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AccountError::Hierarchy(HierarchyError::Cycle { .. })));

    let err = repo
        .update(
            AccountId::new(leaf.id),
            account("5.1.1", "Belanja Pegawai", Some(fx.root), AccountType::Expense),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AccountError::Hierarchy(HierarchyError::LevelMismatch { expected: 2, got: 3 })
    ));

    let renamed = repo
        .update(
            AccountId::new(leaf.id),
            account("5.1.01", "Belanja Pegawai Tetap", Some(fx.expense), AccountType::Expense),
        )
        .await
        .unwrap();
    assert_eq!(renamed.code, "5.1.01");
    assert_eq!(renamed.name, "Belanja Pegawai Tetap");
    assert_eq!(renamed.level, 3);
}

#[tokio::test]
async fn test_list_filters() {
    let fx = fixture().await;
    let repo = AccountRepository::new(fx.db.clone());
    repo.create(account("1", "Aset", None, AccountType::Asset))
        .await
        .unwrap();

    let roots = repo
        .list(&AccountFilter {
            level: Some(1),
            ..Default::default()
        })
        .await
        .unwrap();
    let codes: Vec<&str> = roots.iter().map(|a| a.code.as_str()).collect();
    assert_eq!(codes, ["1", "5"]);

    let expenses = repo
        .list(&AccountFilter {
            account_type: Some(AccountType::Expense),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(expenses.len(), 2);

    let children = repo
        .list(&AccountFilter {
            parent_id: Some(fx.root.into_inner()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].id, fx.expense.into_inner());
}

#[tokio::test]
async fn test_delete_cascades_and_respects_references() {
    let fx = fixture().await;
    let repo = AccountRepository::new(fx.db.clone());

    let other = repo
        .create(account("4", "Pendapatan", None, AccountType::Revenue))
        .await
        .unwrap();
    repo.create(account("4.1", "Pendapatan BLUD", Some(AccountId::new(other.id)), AccountType::Revenue))
        .await
        .unwrap();
    assert_eq!(repo.delete(AccountId::new(other.id)).await.unwrap(), 2);
    assert!(matches!(
        repo.find(AccountId::new(other.id)).await,
        Err(AccountError::NotFound(_))
    ));

    let transactions = TransactionRepository::new(fx.db.clone());
    let input = transaction_input(
        &fx,
        fx.expense,
        TransactionType::Expense,
        dec!(10),
        day(2024, 3, 15),
        "Keeps the branch",
    );
    transactions.create(&input, fx.user, day(2024, 3, 15)).await.unwrap();

    let err = repo.delete(fx.root).await.unwrap_err();
    assert!(matches!(err, AccountError::InUse(_)));
    assert_eq!(AppError::from(err).status_code(), 409);
    assert!(repo.find(fx.expense).await.is_ok());
}

#[tokio::test]
async fn test_units() {
    let fx = fixture().await;
    let repo = UnitRepository::new(fx.db.clone());

    let err = repo
        .create(UnitInput {
            code: "IGD".into(),
            name: "Duplicate".into(),
            description: None,
            is_active: true,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, UnitError::DuplicateCode(_)));

    let lab = repo
        .create(UnitInput {
            code: "LAB".into(),
            name: "Laboratorium".into(),
            description: Some("Lab klinik".into()),
            is_active: false,
        })
        .await
        .unwrap();
    assert_eq!(repo.list(false).await.unwrap().len(), 2);
    assert_eq!(repo.list(true).await.unwrap().len(), 1);

    let updated = repo
        .update(
            UnitId::new(lab.id),
            UnitInput {
                code: "LAB".into(),
                name: "Laboratorium Klinik".into(),
                description: None,
                is_active: true,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Laboratorium Klinik");
    assert!(updated.is_active);

    repo.delete(UnitId::new(lab.id)).await.unwrap();
    assert!(matches!(
        repo.find(UnitId::new(lab.id)).await,
        Err(UnitError::NotFound(_))
    ));

    let transactions = TransactionRepository::new(fx.db.clone());
    let input = transaction_input(
        &fx,
        fx.expense,
        TransactionType::Expense,
        dec!(10),
        day(2024, 3, 15),
        "Uses IGD",
    );
    transactions.create(&input, fx.user, day(2024, 3, 15)).await.unwrap();
    assert!(matches!(repo.delete(fx.unit).await, Err(UnitError::InUse(_))));
}
