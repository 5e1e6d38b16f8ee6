//! Per-bucket reference counters.
//!
//! Each `{prefix}-{date}` bucket owns one row in `reference_sequences`. A new
//! number is claimed by a compare-and-swap on `last_value`, so two writers
//! that read the same counter cannot both succeed. The caller runs this
//! inside the same database transaction as the insert that uses the number.
//!
//! The first statement of a claim writes the counter row. That takes the
//! write lock (a row lock on Postgres, the database lock on `SQLite`) before
//! anything is read, so concurrent claims queue on the lock instead of
//! failing on a stale read.

use chrono::Utc;
use medfin_core::numbering::{Bucket, ReferenceError, ReferenceNumber, next_sequence};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::debug;

use super::{is_lock_contention, is_unique_violation};
use crate::entities::{reference_sequences, transactions};

/// Error types for sequence operations.
#[derive(Debug, thiserror::Error)]
pub enum SequenceError {
    /// Another writer advanced the bucket first.
    #[error("Reference counter for {0} was advanced concurrently")]
    Contended(String),

    /// Sequence cannot be represented.
    #[error(transparent)]
    Reference(#[from] ReferenceError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Reference counter repository.
#[derive(Debug, Clone)]
pub struct SequenceRepository {
    db: DatabaseConnection,
}

impl SequenceRepository {
    /// Creates a new sequence repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Claims the next number of `bucket` on the repository connection.
    ///
    /// # Errors
    ///
    /// Returns `Contended` if another writer won the race.
    pub async fn next_reference(&self, bucket: &Bucket) -> Result<ReferenceNumber, SequenceError> {
        Self::advance_in(&self.db, bucket).await
    }

    /// Last value issued in `bucket`, if the bucket has a counter row.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn current(&self, bucket: &Bucket) -> Result<Option<i64>, DbErr> {
        Ok(reference_sequences::Entity::find_by_id(bucket.key())
            .one(&self.db)
            .await?
            .map(|row| row.last_value))
    }

    /// Claims the next number of `bucket` on `conn`.
    ///
    /// The next value is one past the larger of the counter row and the
    /// newest stored reference in the bucket, so numbers written without the
    /// counter are never reissued. A bucket without a counter row is
    /// bootstrapped from the newest stored reference.
    ///
    /// # Errors
    ///
    /// Returns `Contended` if another writer won the race or held the lock
    /// too long, and `Reference` if the bucket is exhausted.
    pub async fn advance_in<C: ConnectionTrait>(
        conn: &C,
        bucket: &Bucket,
    ) -> Result<ReferenceNumber, SequenceError> {
        let key = bucket.key();
        Self::claim(conn, bucket, &key).await.map_err(|e| match e {
            SequenceError::Database(db) if is_lock_contention(&db) => {
                SequenceError::Contended(key.clone())
            }
            other => other,
        })
    }

    async fn claim<C: ConnectionTrait>(
        conn: &C,
        bucket: &Bucket,
        key: &str,
    ) -> Result<ReferenceNumber, SequenceError> {
        let now = Utc::now();
        reference_sequences::Entity::update_many()
            .col_expr(reference_sequences::Column::UpdatedAt, Expr::value(now))
            .filter(reference_sequences::Column::Bucket.eq(key))
            .exec(conn)
            .await?;

        let latest: Option<String> = transactions::Entity::find()
            .select_only()
            .column(transactions::Column::ReferenceNumber)
            .filter(transactions::Column::ReferenceNumber.like(bucket.like_pattern()))
            .order_by_desc(transactions::Column::Id)
            .into_tuple::<String>()
            .one(conn)
            .await?;
        let from_rows = next_sequence(latest.as_deref())?;

        let counter = reference_sequences::Entity::find_by_id(key.to_owned())
            .one(conn)
            .await?;

        let next = match counter {
            None => {
                let row = reference_sequences::ActiveModel {
                    bucket: Set(key.to_owned()),
                    last_value: Set(i64::from(from_rows)),
                    updated_at: Set(now),
                };
                row.insert(conn).await.map_err(|e| {
                    if is_unique_violation(&e) {
                        SequenceError::Contended(key.to_owned())
                    } else {
                        SequenceError::Database(e)
                    }
                })?;
                from_rows
            }
            Some(row) => {
                let from_counter = u32::try_from(row.last_value)
                    .ok()
                    .and_then(|v| v.checked_add(1))
                    .ok_or_else(|| ReferenceError::Exhausted(key.to_owned()))?;
                let next = from_counter.max(from_rows);

                let result = reference_sequences::Entity::update_many()
                    .col_expr(
                        reference_sequences::Column::LastValue,
                        Expr::value(i64::from(next)),
                    )
                    .col_expr(reference_sequences::Column::UpdatedAt, Expr::value(now))
                    .filter(reference_sequences::Column::Bucket.eq(key))
                    .filter(reference_sequences::Column::LastValue.eq(row.last_value))
                    .exec(conn)
                    .await?;
                if result.rows_affected == 0 {
                    return Err(SequenceError::Contended(key.to_owned()));
                }
                next
            }
        };

        debug!(bucket = %key, sequence = next, "Reference sequence advanced");
        Ok(bucket.reference(next))
    }
}
