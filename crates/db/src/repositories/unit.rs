//! Organizational unit repository.

use chrono::Utc;
use medfin_core::unit::UnitInput;
use medfin_shared::AppError;
use medfin_shared::types::UnitId;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use tracing::{info, warn};

use super::is_unique_violation;
use crate::entities::{budgets, organizational_units, transactions};

/// Error types for unit operations.
#[derive(Debug, thiserror::Error)]
pub enum UnitError {
    /// Unit not found.
    #[error("Unit not found: {0}")]
    NotFound(UnitId),

    /// Unit code already exists.
    #[error("Unit code '{0}' already exists")]
    DuplicateCode(String),

    /// Budgets or transactions still reference the unit.
    #[error("Unit {0} is referenced by budgets or transactions")]
    InUse(UnitId),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<UnitError> for AppError {
    fn from(err: UnitError) -> Self {
        match err {
            UnitError::NotFound(id) => Self::NotFound(format!("Unit {id} not found")),
            UnitError::DuplicateCode(_) => {
                Self::field("code", "Unit code has already been taken.")
            }
            UnitError::InUse(_) => Self::Conflict(
                "Unit cannot be deleted while budgets or transactions reference it.".into(),
            ),
            UnitError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Repository for hospital units.
#[derive(Debug, Clone)]
pub struct UnitRepository {
    db: DatabaseConnection,
}

impl UnitRepository {
    /// Creates a new unit repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a unit.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateCode` if the code is taken.
    pub async fn create(&self, input: UnitInput) -> Result<organizational_units::Model, UnitError> {
        if self.code_exists(&input.code, None).await? {
            return Err(UnitError::DuplicateCode(input.code));
        }

        let now = Utc::now();
        let unit = organizational_units::ActiveModel {
            code: Set(input.code.clone()),
            name: Set(input.name),
            description: Set(input.description),
            is_active: Set(input.is_active),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let model = unit.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                UnitError::DuplicateCode(input.code.clone())
            } else {
                UnitError::Database(e)
            }
        })?;

        info!(unit_id = model.id, code = %model.code, "Unit created");
        Ok(model)
    }

    /// Lists units ordered by code, optionally only active ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, active_only: bool) -> Result<Vec<organizational_units::Model>, UnitError> {
        let mut query = organizational_units::Entity::find();
        if active_only {
            query = query.filter(organizational_units::Column::IsActive.eq(true));
        }
        Ok(query
            .order_by_asc(organizational_units::Column::Code)
            .all(&self.db)
            .await?)
    }

    /// Finds a unit by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the unit does not exist.
    pub async fn find(&self, id: UnitId) -> Result<organizational_units::Model, UnitError> {
        organizational_units::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(UnitError::NotFound(id))
    }

    /// Updates a unit.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `DuplicateCode`.
    pub async fn update(
        &self,
        id: UnitId,
        input: UnitInput,
    ) -> Result<organizational_units::Model, UnitError> {
        let existing = self.find(id).await?;
        if self.code_exists(&input.code, Some(id)).await? {
            return Err(UnitError::DuplicateCode(input.code));
        }

        let mut unit: organizational_units::ActiveModel = existing.into();
        unit.code = Set(input.code.clone());
        unit.name = Set(input.name);
        unit.description = Set(input.description);
        unit.is_active = Set(input.is_active);
        unit.updated_at = Set(Utc::now());

        let model = unit.update(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                UnitError::DuplicateCode(input.code.clone())
            } else {
                UnitError::Database(e)
            }
        })?;
        info!(unit_id = model.id, "Unit updated");
        Ok(model)
    }

    /// Deletes an unreferenced unit.
    ///
    /// # Errors
    ///
    /// Returns `InUse` while budgets or transactions reference it.
    pub async fn delete(&self, id: UnitId) -> Result<(), UnitError> {
        let raw = id.into_inner();
        let budget_refs = budgets::Entity::find()
            .filter(budgets::Column::UnitId.eq(raw))
            .count(&self.db)
            .await?;
        let transaction_refs = transactions::Entity::find()
            .filter(transactions::Column::UnitId.eq(raw))
            .count(&self.db)
            .await?;
        if budget_refs + transaction_refs > 0 {
            warn!(unit_id = %id, budget_refs, transaction_refs, "Refusing to delete referenced unit");
            return Err(UnitError::InUse(id));
        }

        let result = organizational_units::Entity::delete_by_id(raw)
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(UnitError::NotFound(id));
        }
        info!(unit_id = %id, "Unit deleted");
        Ok(())
    }

    async fn code_exists(&self, code: &str, except: Option<UnitId>) -> Result<bool, DbErr> {
        let mut query =
            organizational_units::Entity::find().filter(organizational_units::Column::Code.eq(code));
        if let Some(id) = except {
            query = query.filter(organizational_units::Column::Id.ne(id.into_inner()));
        }
        Ok(query.count(&self.db).await? > 0)
    }
}
