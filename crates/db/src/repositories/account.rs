//! Account repository for chart of accounts database operations.
//!
//! Structural rules (unique codes, parent levels, no cycles) are checked
//! against an [`AccountTree`] built from the stored rows before any write.

use chrono::Utc;
use medfin_core::account::{AccountInput, AccountNode, AccountTree, AccountType, HierarchyError};
use medfin_shared::AppError;
use medfin_shared::types::AccountId;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use tracing::{info, warn};

use super::{is_foreign_key_violation, is_unique_violation};
use crate::entities::{budgets, ledger_accounts, transactions};

/// Error types for account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Account not found.
    #[error("Account not found: {0}")]
    NotFound(AccountId),

    /// Input breaks a hierarchy rule.
    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),

    /// Budgets or transactions still reference the account or a descendant.
    #[error("Account {0} is referenced by budgets or transactions")]
    InUse(AccountId),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<AccountError> for AppError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::NotFound(id) => Self::NotFound(format!("Account {id} not found")),
            AccountError::Hierarchy(e) => hierarchy_to_app(e),
            AccountError::InUse(_) => Self::Conflict(
                "Account cannot be deleted while budgets or transactions reference it.".into(),
            ),
            AccountError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

fn hierarchy_to_app(err: HierarchyError) -> AppError {
    match err {
        HierarchyError::InvalidCode(_) => AppError::field(
            "code",
            "Account code must be dot-separated digits of at most 20 characters.",
        ),
        HierarchyError::DuplicateCode(_) => {
            AppError::field("code", "Account code has already been taken.")
        }
        HierarchyError::ParentNotFound(_) => {
            AppError::field("parent_id", "Selected parent account is invalid.")
        }
        HierarchyError::LevelMismatch { .. } => AppError::field(
            "parent_id",
            "The new parent must keep the account at its current level.",
        ),
        HierarchyError::Cycle { .. } => AppError::field(
            "parent_id",
            "An account cannot be placed under itself or one of its descendants.",
        ),
        HierarchyError::AccountNotFound(id) => AppError::NotFound(format!("Account {id} not found")),
        HierarchyError::DuplicateId(id) => AppError::Conflict(format!("Account {id} already exists")),
    }
}

/// Filter options for listing accounts.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountFilter {
    /// Filter by account type.
    #[serde(rename = "type")]
    pub account_type: Option<AccountType>,
    /// Filter by active status.
    pub is_active: Option<bool>,
    /// Filter by hierarchy level.
    pub level: Option<i32>,
    /// Filter by parent account.
    pub parent_id: Option<i64>,
}

/// Account repository for chart of accounts operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Builds the hierarchy from every stored account.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the stored rows violate the hierarchy.
    pub async fn load_tree(&self) -> Result<AccountTree, AccountError> {
        let rows = ledger_accounts::Entity::find().all(&self.db).await?;
        let nodes = rows
            .into_iter()
            .map(|row| AccountNode {
                id: AccountId::new(row.id),
                code: row.code,
                parent_id: row.parent_id.map(AccountId::new),
                level: row.level,
            })
            .collect();
        Ok(AccountTree::build(nodes)?)
    }

    /// Creates an account; its level is derived from the parent.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is taken, the parent does not exist,
    /// or the database insert fails.
    pub async fn create(&self, input: AccountInput) -> Result<ledger_accounts::Model, AccountError> {
        let tree = self.load_tree().await?;
        let level = tree.placement(&input.code, input.parent_id)?;

        let now = Utc::now();
        let account = ledger_accounts::ActiveModel {
            code: Set(input.code.clone()),
            name: Set(input.name),
            description: Set(input.description),
            parent_id: Set(input.parent_id.map(AccountId::into_inner)),
            account_type: Set(input.account_type.into()),
            level: Set(level),
            is_active: Set(input.is_active),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = account.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                AccountError::Hierarchy(HierarchyError::DuplicateCode(input.code.clone()))
            } else {
                AccountError::Database(e)
            }
        })?;

        info!(account_id = model.id, code = %model.code, level, "Account created");
        Ok(model)
    }

    /// Lists accounts ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, filter: &AccountFilter) -> Result<Vec<ledger_accounts::Model>, AccountError> {
        let mut query = ledger_accounts::Entity::find();

        if let Some(account_type) = filter.account_type {
            query = query.filter(
                ledger_accounts::Column::AccountType
                    .eq(crate::entities::sea_orm_active_enums::AccountType::from(account_type)),
            );
        }
        if let Some(is_active) = filter.is_active {
            query = query.filter(ledger_accounts::Column::IsActive.eq(is_active));
        }
        if let Some(level) = filter.level {
            query = query.filter(ledger_accounts::Column::Level.eq(level));
        }
        if let Some(parent_id) = filter.parent_id {
            query = query.filter(ledger_accounts::Column::ParentId.eq(parent_id));
        }

        Ok(query
            .order_by_asc(ledger_accounts::Column::Code)
            .all(&self.db)
            .await?)
    }

    /// Level-1 accounts ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn top_level(&self) -> Result<Vec<ledger_accounts::Model>, DbErr> {
        ledger_accounts::Entity::find()
            .filter(ledger_accounts::Column::Level.eq(1))
            .order_by_asc(ledger_accounts::Column::Code)
            .all(&self.db)
            .await
    }

    /// Finds an account by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the account does not exist.
    pub async fn find(&self, id: AccountId) -> Result<ledger_accounts::Model, AccountError> {
        ledger_accounts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(AccountError::NotFound(id))
    }

    /// Updates an account.
    ///
    /// A new parent must keep the account at its current depth and may not
    /// be the account itself or one of its descendants.
    ///
    /// # Errors
    ///
    /// Returns an error if the account does not exist, a hierarchy rule is
    /// violated, or the database update fails.
    pub async fn update(
        &self,
        id: AccountId,
        input: AccountInput,
    ) -> Result<ledger_accounts::Model, AccountError> {
        let existing = self.find(id).await?;
        let tree = self.load_tree().await?;

        tree.validate_code_change(id, &input.code)?;
        let current_parent = existing.parent_id.map(AccountId::new);
        if input.parent_id != current_parent {
            tree.validate_reparent(id, input.parent_id)?;
        }

        let mut account: ledger_accounts::ActiveModel = existing.into();
        account.code = Set(input.code.clone());
        account.name = Set(input.name);
        account.description = Set(input.description);
        account.parent_id = Set(input.parent_id.map(AccountId::into_inner));
        account.account_type = Set(input.account_type.into());
        account.is_active = Set(input.is_active);
        account.updated_at = Set(Utc::now());

        let model = account.update(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                AccountError::Hierarchy(HierarchyError::DuplicateCode(input.code.clone()))
            } else {
                AccountError::Database(e)
            }
        })?;

        info!(account_id = model.id, code = %model.code, "Account updated");
        Ok(model)
    }

    /// Deletes an account together with its descendants.
    ///
    /// # Errors
    ///
    /// Returns `InUse` if budgets or transactions reference any account in
    /// the subtree, `NotFound` if the account does not exist.
    pub async fn delete(&self, id: AccountId) -> Result<u64, AccountError> {
        let tree = self.load_tree().await?;
        if tree.get(id).is_none() {
            return Err(AccountError::NotFound(id));
        }
        let ids: Vec<i64> = tree.subtree(id)?.into_iter().map(AccountId::into_inner).collect();

        let budget_refs = budgets::Entity::find()
            .filter(budgets::Column::AccountId.is_in(ids.clone()))
            .count(&self.db)
            .await?;
        let transaction_refs = transactions::Entity::find()
            .filter(transactions::Column::AccountId.is_in(ids.clone()))
            .count(&self.db)
            .await?;
        if budget_refs + transaction_refs > 0 {
            warn!(
                account_id = %id,
                budget_refs,
                transaction_refs,
                "Refusing to delete referenced account"
            );
            return Err(AccountError::InUse(id));
        }

        let removed = u64::try_from(ids.len()).unwrap_or(u64::MAX);
        ledger_accounts::Entity::delete_many()
            .filter(ledger_accounts::Column::Id.is_in(ids))
            .exec(&self.db)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    AccountError::InUse(id)
                } else {
                    AccountError::Database(e)
                }
            })?;

        // Cascaded children are not counted by every backend.
        info!(account_id = %id, removed, "Account subtree deleted");
        Ok(removed)
    }
}
