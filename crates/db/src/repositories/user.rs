//! User repository for database operations.

use chrono::Utc;
use medfin_shared::AppError;
use medfin_shared::types::UserId;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};
use tracing::info;

use super::is_unique_violation;
use crate::entities::users;

/// Error types for user operations.
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    /// Email already registered.
    #[error("Email '{0}' is already registered")]
    DuplicateEmail(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::DuplicateEmail(_) => {
                Self::field("email", "Email has already been taken.")
            }
            UserError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// User repository. Users are created by the seeder; authentication is external.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: UserId) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find_by_id(id.into_inner()).one(&self.db).await
    }

    /// Finds a user by email.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
    }

    /// Creates a new user.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateEmail` if the email is taken.
    pub async fn create(&self, name: &str, email: &str) -> Result<users::Model, UserError> {
        let now = Utc::now();
        let user = users::ActiveModel {
            name: Set(name.to_string()),
            email: Set(email.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = user.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                UserError::DuplicateEmail(email.to_string())
            } else {
                UserError::Database(e)
            }
        })?;
        info!(user_id = model.id, "User created");
        Ok(model)
    }
}
