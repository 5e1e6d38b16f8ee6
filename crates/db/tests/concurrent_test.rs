//! Concurrent reference numbering against a pooled, file-backed database.

mod common;

use std::sync::Arc;

use common::{day, fixture_on, setup_file, transaction_input};
use medfin_core::numbering::Bucket;
use medfin_core::transaction::TransactionType;
use medfin_db::{SequenceRepository, TransactionRepository};
use rust_decimal_macros::dec;
use tokio::sync::Barrier;

const WRITERS: usize = 8;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_get_distinct_sequential_numbers() {
    let fx = fixture_on(setup_file(4).await).await;
    let today = day(2024, 3, 15);
    let input = transaction_input(
        &fx,
        fx.expense,
        TransactionType::Expense,
        dec!(1000),
        today,
        "Pembelian alat tulis",
    );

    let barrier = Arc::new(Barrier::new(WRITERS));
    let mut handles = Vec::with_capacity(WRITERS);
    for _ in 0..WRITERS {
        let repo = TransactionRepository::new(fx.db.clone());
        let input = input.clone();
        let barrier = Arc::clone(&barrier);
        let user = fx.user;
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            repo.create(&input, user, today).await
        }));
    }

    let mut references = Vec::with_capacity(WRITERS);
    for handle in handles {
        let created = handle.await.expect("task panicked");
        match created {
            Ok(model) => references.push(model.reference_number),
            Err(e) => panic!("concurrent create failed: {e:?}"),
        }
    }
    references.sort();

    let expected: Vec<String> = (1..=WRITERS)
        .map(|n| format!("EXP-20240315-{n:04}"))
        .collect();
    assert_eq!(references, expected);

    let bucket = Bucket::new("expense", today);
    let counter = SequenceRepository::new(fx.db.clone())
        .current(&bucket)
        .await
        .unwrap();
    assert_eq!(counter, Some(8));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_across_buckets() {
    let fx = fixture_on(setup_file(4).await).await;
    let today = day(2024, 3, 15);

    let mut handles = Vec::new();
    for (i, transaction_type) in [TransactionType::Income, TransactionType::Expense]
        .into_iter()
        .cycle()
        .take(6)
        .enumerate()
    {
        let repo = TransactionRepository::new(fx.db.clone());
        let input = transaction_input(
            &fx,
            fx.expense,
            transaction_type,
            dec!(500),
            today,
            &format!("Entry {i}"),
        );
        let user = fx.user;
        handles.push(tokio::spawn(async move {
            repo.create(&input, user, today).await
        }));
    }

    let mut income = Vec::new();
    let mut expense = Vec::new();
    for handle in handles {
        let model = handle.await.expect("task panicked").unwrap();
        if model.reference_number.starts_with("REV-") {
            income.push(model.reference_number);
        } else {
            expense.push(model.reference_number);
        }
    }
    income.sort();
    expense.sort();

    assert_eq!(
        income,
        ["REV-20240315-0001", "REV-20240315-0002", "REV-20240315-0003"]
    );
    assert_eq!(
        expense,
        ["EXP-20240315-0001", "EXP-20240315-0002", "EXP-20240315-0003"]
    );
}
