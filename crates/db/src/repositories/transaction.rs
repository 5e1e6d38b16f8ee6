//! Transaction repository.
//!
//! Every mutation passes the lifecycle guard on the loaded row and is then
//! written with a status-conditional statement, so a lock that lands
//! between the read and the write still wins.

use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, Utc};
use medfin_core::lifecycle::{
    LifecycleAction, LifecycleError, LifecycleGuard, LifecycleService, Mutation, RecordKind,
    RecordStatus as DomainStatus,
};
use medfin_core::numbering::Bucket;
use medfin_core::transaction::{TransactionFilter, TransactionInput};
use medfin_shared::types::{PageRequest, PageResponse, TransactionId, UserId};
use medfin_shared::{AppError, FieldErrors};
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::{info, warn};

use super::sequence::{SequenceError, SequenceRepository};
use super::{check_references, is_lock_contention, is_unique_violation};
use crate::entities::sea_orm_active_enums::{RecordStatus, TransactionType};
use crate::entities::{ledger_accounts, organizational_units, transactions, users};

/// Default number of attempts at claiming a reference number.
pub const DEFAULT_RETRY_LIMIT: u32 = 5;

/// Error types for transaction operations.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// Transaction not found.
    #[error("Transaction not found: {0}")]
    NotFound(TransactionId),

    /// Referenced account or unit does not exist.
    #[error("Invalid input: {0}")]
    Invalid(FieldErrors),

    /// Refused by the lifecycle rules.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// Counter could not be advanced.
    #[error(transparent)]
    Sequence(#[from] SequenceError),

    /// The claimed reference number was already stored.
    #[error("Reference number {0} is already taken")]
    ReferenceCollision(String),

    /// Every attempt at a unique reference number collided.
    #[error("Could not assign a reference number after {attempts} attempts")]
    ReferenceContention {
        /// Attempts made.
        attempts: u32,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl TransactionError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::ReferenceCollision(_) | Self::Sequence(SequenceError::Contended(_)) => true,
            Self::Database(e) => is_lock_contention(e),
            _ => false,
        }
    }
}

impl From<TransactionError> for AppError {
    fn from(err: TransactionError) -> Self {
        match err {
            TransactionError::NotFound(id) => Self::NotFound(format!("Transaction {id} not found")),
            TransactionError::Invalid(fields) => Self::InvalidFields(fields),
            TransactionError::Lifecycle(e) => Self::BusinessRule(e.to_string()),
            TransactionError::Sequence(SequenceError::Database(e))
            | TransactionError::Database(e) => Self::Database(e.to_string()),
            e @ (TransactionError::Sequence(_)
            | TransactionError::ReferenceCollision(_)
            | TransactionError::ReferenceContention { .. }) => Self::Conflict(e.to_string()),
        }
    }
}

/// A transaction with the display names of what it references.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionRow {
    /// The stored record.
    #[serde(flatten)]
    pub transaction: transactions::Model,
    /// Account code.
    pub account_code: Option<String>,
    /// Account name.
    pub account_name: Option<String>,
    /// Unit name.
    pub unit_name: Option<String>,
    /// Creator name.
    pub created_by_name: Option<String>,
}

/// Translates a listing filter into a query condition.
///
/// The search needle is matched as a case-insensitive substring of the
/// reference number or the description; `%`, `_` and `\` in the needle
/// match literally.
///
/// `LOWER()` on `SQLite` folds ASCII only, so the needle is also tried with
/// only its ASCII letters folded. Non-ASCII letters then match on `SQLite`
/// when their case agrees, and on Postgres in any case.
#[must_use]
pub fn filter_condition(filter: &TransactionFilter) -> Condition {
    let search = filter.search.as_deref().map(|needle| {
        let mut patterns = vec![needle.to_lowercase()];
        let ascii_folded = needle.to_ascii_lowercase();
        if ascii_folded != patterns[0] {
            patterns.push(ascii_folded);
        }

        let mut any = Condition::any();
        for pattern in patterns.iter().map(|p| format!("%{}%", escape_like(p))) {
            any = any
                .add(
                    Expr::expr(Func::lower(Expr::col(transactions::Column::ReferenceNumber)))
                        .like(LikeExpr::new(pattern.clone()).escape('\\')),
                )
                .add(
                    Expr::expr(Func::lower(Expr::col(transactions::Column::Description)))
                        .like(LikeExpr::new(pattern).escape('\\')),
                );
        }
        any
    });

    Condition::all()
        .add_option(search)
        .add_option(
            filter
                .transaction_type
                .map(|t| transactions::Column::TransactionType.eq(TransactionType::from(t))),
        )
        .add_option(
            filter
                .status
                .map(|s| transactions::Column::Status.eq(RecordStatus::from(s))),
        )
        .add_option(
            filter
                .date_from
                .map(|d| transactions::Column::TransactionDate.gte(d)),
        )
        .add_option(filter.date_to.map(|d| transactions::Column::TransactionDate.lte(d)))
}

fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Loads account, unit, and creator names for a batch of transactions.
pub(crate) async fn attach_names<C: ConnectionTrait>(
    conn: &C,
    models: Vec<transactions::Model>,
) -> Result<Vec<TransactionRow>, DbErr> {
    let account_ids: HashSet<i64> = models.iter().map(|m| m.account_id).collect();
    let unit_ids: HashSet<i64> = models.iter().map(|m| m.unit_id).collect();
    let user_ids: HashSet<i64> = models.iter().map(|m| m.created_by).collect();

    let accounts: HashMap<i64, ledger_accounts::Model> = if account_ids.is_empty() {
        HashMap::new()
    } else {
        ledger_accounts::Entity::find()
            .filter(ledger_accounts::Column::Id.is_in(account_ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect()
    };
    let units: HashMap<i64, String> = if unit_ids.is_empty() {
        HashMap::new()
    } else {
        organizational_units::Entity::find()
            .filter(organizational_units::Column::Id.is_in(unit_ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|u| (u.id, u.name))
            .collect()
    };
    let creators: HashMap<i64, String> = if user_ids.is_empty() {
        HashMap::new()
    } else {
        users::Entity::find()
            .filter(users::Column::Id.is_in(user_ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|u| (u.id, u.name))
            .collect()
    };

    Ok(models
        .into_iter()
        .map(|transaction| {
            let account = accounts.get(&transaction.account_id);
            TransactionRow {
                account_code: account.map(|a| a.code.clone()),
                account_name: account.map(|a| a.name.clone()),
                unit_name: units.get(&transaction.unit_id).cloned(),
                created_by_name: creators.get(&transaction.created_by).cloned(),
                transaction,
            }
        })
        .collect())
}

/// Transaction repository.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    db: DatabaseConnection,
    retry_limit: u32,
}

impl TransactionRepository {
    /// Creates a new transaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            retry_limit: DEFAULT_RETRY_LIMIT,
        }
    }

    /// Sets how many times a create may claim a reference number.
    #[must_use]
    pub const fn with_retry_limit(mut self, limit: u32) -> Self {
        self.retry_limit = if limit == 0 { 1 } else { limit };
        self
    }

    /// Creates a draft transaction numbered in the bucket of `today`.
    ///
    /// The number is claimed and the row inserted in one database
    /// transaction; a lost race rolls both back and the whole attempt is
    /// repeated.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` if the account or unit does not exist and
    /// `ReferenceContention` if every attempt collided.
    pub async fn create(
        &self,
        input: &TransactionInput,
        created_by: UserId,
        today: NaiveDate,
    ) -> Result<transactions::Model, TransactionError> {
        let errors = check_references(&self.db, input.account_id, input.unit_id).await?;
        if !errors.is_empty() {
            return Err(TransactionError::Invalid(errors));
        }

        let bucket = Bucket::new(input.transaction_type.as_str(), today);
        for attempt in 1..=self.retry_limit {
            match self.try_create(input, created_by, &bucket).await {
                Ok(model) => {
                    info!(
                        transaction_id = model.id,
                        reference = %model.reference_number,
                        attempt,
                        "Transaction created"
                    );
                    return Ok(model);
                }
                Err(e) if e.is_retryable() => {
                    warn!(bucket = %bucket, attempt, error = %e, "Reference number race, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        warn!(bucket = %bucket, attempts = self.retry_limit, "Gave up assigning a reference number");
        Err(TransactionError::ReferenceContention {
            attempts: self.retry_limit,
        })
    }

    async fn try_create(
        &self,
        input: &TransactionInput,
        created_by: UserId,
        bucket: &Bucket,
    ) -> Result<transactions::Model, TransactionError> {
        let txn = self.db.begin().await?;

        let reference = SequenceRepository::advance_in(&txn, bucket).await?;
        let now = Utc::now();
        let transaction = transactions::ActiveModel {
            reference_number: Set(reference.to_string()),
            transaction_date: Set(input.transaction_date),
            journal_date: Set(input.journal_date),
            payment_date: Set(input.payment_date),
            account_id: Set(input.account_id.into_inner()),
            unit_id: Set(input.unit_id.into_inner()),
            transaction_type: Set(input.transaction_type.into()),
            amount: Set(input.amount),
            description: Set(input.description.clone()),
            proof_file: Set(None),
            status: Set(RecordStatus::Draft),
            created_by: Set(created_by.into_inner()),
            approved_by: Set(None),
            approved_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = match transaction.insert(&txn).await {
            Ok(model) => model,
            Err(e) if is_unique_violation(&e) => {
                txn.rollback().await?;
                return Err(TransactionError::ReferenceCollision(reference.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        txn.commit().await?;
        Ok(model)
    }

    /// Lists transactions matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: &TransactionFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<TransactionRow>, TransactionError> {
        let paginator = transactions::Entity::find()
            .filter(filter_condition(filter))
            .order_by_desc(transactions::Column::CreatedAt)
            .order_by_desc(transactions::Column::Id)
            .paginate(&self.db, page.limit());

        let total = paginator.num_items().await?;
        let models = paginator
            .fetch_page(u64::from(page.page.saturating_sub(1)))
            .await?;
        let rows = attach_names(&self.db, models).await?;

        Ok(PageResponse::new(rows, page.page, page.per_page, total))
    }

    /// Finds a transaction by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the transaction does not exist.
    pub async fn find(&self, id: TransactionId) -> Result<transactions::Model, TransactionError> {
        transactions::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(TransactionError::NotFound(id))
    }

    /// Finds a transaction with its display names.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the transaction does not exist.
    pub async fn find_row(&self, id: TransactionId) -> Result<TransactionRow, TransactionError> {
        let model = self.find(id).await?;
        attach_names(&self.db, vec![model])
            .await?
            .pop()
            .ok_or(TransactionError::NotFound(id))
    }

    /// Loads a transaction for editing; locked transactions are refused.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, or `Lifecycle` if the transaction is locked.
    pub async fn find_for_edit(
        &self,
        id: TransactionId,
    ) -> Result<transactions::Model, TransactionError> {
        let model = self.find(id).await?;
        LifecycleGuard::ensure_modifiable(
            model.status.into(),
            RecordKind::Transaction,
            Mutation::Edit,
        )?;
        Ok(model)
    }

    /// Replaces the editable fields. The reference number never changes.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `Invalid`, or `Lifecycle` if the transaction is locked.
    pub async fn update(
        &self,
        id: TransactionId,
        input: &TransactionInput,
    ) -> Result<transactions::Model, TransactionError> {
        let existing = self.find(id).await?;
        LifecycleGuard::ensure_modifiable(
            existing.status.into(),
            RecordKind::Transaction,
            Mutation::Update,
        )?;

        let errors = check_references(&self.db, input.account_id, input.unit_id).await?;
        if !errors.is_empty() {
            return Err(TransactionError::Invalid(errors));
        }

        let result = transactions::Entity::update_many()
            .col_expr(
                transactions::Column::TransactionDate,
                Expr::value(input.transaction_date),
            )
            .col_expr(transactions::Column::JournalDate, Expr::value(input.journal_date))
            .col_expr(transactions::Column::PaymentDate, Expr::value(input.payment_date))
            .col_expr(
                transactions::Column::AccountId,
                Expr::value(input.account_id.into_inner()),
            )
            .col_expr(transactions::Column::UnitId, Expr::value(input.unit_id.into_inner()))
            .col_expr(
                transactions::Column::TransactionType,
                Expr::value(TransactionType::from(input.transaction_type)),
            )
            .col_expr(transactions::Column::Amount, Expr::value(input.amount))
            .col_expr(
                transactions::Column::Description,
                Expr::value(input.description.clone()),
            )
            .col_expr(transactions::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(transactions::Column::Id.eq(id.into_inner()))
            .filter(transactions::Column::Status.ne(RecordStatus::Locked))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(self.refusal(id, Mutation::Update).await);
        }

        info!(transaction_id = %id, "Transaction updated");
        self.find(id).await
    }

    /// Deletes a transaction, returning the removed row.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, or `Lifecycle` if the transaction is locked.
    pub async fn delete(&self, id: TransactionId) -> Result<transactions::Model, TransactionError> {
        let existing = self.find(id).await?;
        LifecycleGuard::ensure_modifiable(
            existing.status.into(),
            RecordKind::Transaction,
            Mutation::Delete,
        )?;

        let result = transactions::Entity::delete_many()
            .filter(transactions::Column::Id.eq(id.into_inner()))
            .filter(transactions::Column::Status.ne(RecordStatus::Locked))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(self.refusal(id, Mutation::Delete).await);
        }

        info!(transaction_id = %id, reference = %existing.reference_number, "Transaction deleted");
        Ok(existing)
    }

    /// Records the storage key of an uploaded proof document.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, or `Lifecycle` if the transaction is locked.
    pub async fn set_proof_file(
        &self,
        id: TransactionId,
        key: &str,
    ) -> Result<transactions::Model, TransactionError> {
        let result = transactions::Entity::update_many()
            .col_expr(transactions::Column::ProofFile, Expr::value(key.to_string()))
            .col_expr(transactions::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(transactions::Column::Id.eq(id.into_inner()))
            .filter(transactions::Column::Status.ne(RecordStatus::Locked))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(self.refusal(id, Mutation::Update).await);
        }

        info!(transaction_id = %id, key, "Proof document attached");
        self.find(id).await
    }

    /// Approves a draft transaction.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, or `Lifecycle` unless the transaction is a draft.
    pub async fn approve(
        &self,
        id: TransactionId,
        approver: UserId,
    ) -> Result<transactions::Model, TransactionError> {
        let existing = self.find(id).await?;
        let action = LifecycleService::approve(existing.status.into(), approver)?;
        self.transition(id, &action, &[DomainStatus::Draft]).await
    }

    /// Locks a draft or approved transaction.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, or `Lifecycle` if it is already locked.
    pub async fn lock(&self, id: TransactionId) -> Result<transactions::Model, TransactionError> {
        let existing = self.find(id).await?;
        let action = LifecycleService::lock(existing.status.into())?;
        self.transition(id, &action, &[DomainStatus::Draft, DomainStatus::Approved])
            .await
    }

    async fn transition(
        &self,
        id: TransactionId,
        action: &LifecycleAction,
        from: &[DomainStatus],
    ) -> Result<transactions::Model, TransactionError> {
        let to = action.new_status();
        let mut update = transactions::Entity::update_many()
            .col_expr(transactions::Column::Status, Expr::value(RecordStatus::from(to)))
            .col_expr(transactions::Column::UpdatedAt, Expr::value(Utc::now()));
        if let LifecycleAction::Approve {
            approved_by,
            approved_at,
            ..
        } = action
        {
            update = update
                .col_expr(
                    transactions::Column::ApprovedBy,
                    Expr::value(approved_by.into_inner()),
                )
                .col_expr(transactions::Column::ApprovedAt, Expr::value(*approved_at));
        }

        let result = update
            .filter(transactions::Column::Id.eq(id.into_inner()))
            .filter(transactions::Column::Status.is_in(from.iter().map(|s| RecordStatus::from(*s))))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            let current = self.find(id).await?;
            return Err(LifecycleError::InvalidTransition {
                from: current.status.into(),
                to,
            }
            .into());
        }

        info!(transaction_id = %id, status = %to, "Transaction status changed");
        self.find(id).await
    }

    /// Explains why a guarded write matched no row.
    async fn refusal(&self, id: TransactionId, mutation: Mutation) -> TransactionError {
        match transactions::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
        {
            Ok(Some(_)) => {
                warn!(transaction_id = %id, %mutation, "Refused mutation of locked transaction");
                LifecycleError::Locked {
                    kind: RecordKind::Transaction,
                    mutation,
                }
                .into()
            }
            Ok(None) => TransactionError::NotFound(id),
            Err(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medfin_core::lifecycle::RecordStatus as Status;
    use medfin_core::transaction::TransactionType as Type;
    use sea_orm::{DbBackend, QueryTrait};

    fn sql(filter: &TransactionFilter) -> String {
        transactions::Entity::find()
            .filter(filter_condition(filter))
            .build(DbBackend::Sqlite)
            .to_string()
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("obat"), "obat");
    }

    #[test]
    fn test_empty_filter_has_no_predicate() {
        assert!(!sql(&TransactionFilter::new()).contains("WHERE"));
    }

    #[test]
    fn test_filter_translates_every_field() {
        let from = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let filter = TransactionFilter::new()
            .with_search("EXP")
            .with_type(Type::Expense)
            .with_status(Status::Approved)
            .with_dates(Some(from), Some(to));
        let sql = sql(&filter);

        assert!(sql.contains("LOWER(\"reference_number\") LIKE '%exp%'"), "{sql}");
        assert!(sql.contains("LOWER(\"description\") LIKE '%exp%'"), "{sql}");
        assert!(sql.contains("\"transaction_type\" = 'expense'"), "{sql}");
        assert!(sql.contains("\"status\" = 'approved'"), "{sql}");
        assert!(sql.contains("\"transaction_date\" >= '2024-01-01'"), "{sql}");
        assert!(sql.contains("\"transaction_date\" <= '2024-01-31'"), "{sql}");
    }

    #[test]
    fn test_non_ascii_needle_also_tried_ascii_folded() {
        let sql = sql(&TransactionFilter::new().with_search("ÖL Mesin"));
        assert!(sql.contains("LIKE '%öl mesin%'"), "{sql}");
        assert!(sql.contains("LIKE '%Öl mesin%'"), "{sql}");

        let ascii = self::sql(&TransactionFilter::new().with_search("Obat"));
        assert_eq!(ascii.matches("LIKE").count(), 2, "{ascii}");
    }
}
