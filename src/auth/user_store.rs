//! Local user records keyed by email

use sqlx::SqlitePool;
use tracing::{debug, error, info};

use super::models::User;
use crate::common::{safe_email_log, ApiError};

pub struct UserStore {
    db: SqlitePool,
}

impl UserStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        sqlx::query_as::<_, User>("SELECT id, name, email, picture FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| {
                error!(error = %e, email = %safe_email_log(email), "Database error looking up user by email");
                ApiError::DatabaseError(e)
            })
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, ApiError> {
        sqlx::query_as::<_, User>("SELECT id, name, email, picture FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(ApiError::DatabaseError)
    }

    /// Insert a new user; the store assigns the id.
    pub async fn create(
        &self,
        name: &str,
        email: &str,
        picture: Option<&str>,
    ) -> Result<User, ApiError> {
        let id = sqlx::query("INSERT INTO users (name, email, picture) VALUES (?, ?, ?)")
            .bind(name)
            .bind(email)
            .bind(picture)
            .execute(&self.db)
            .await
            .map_err(|e| {
                if !is_unique_violation(&e) {
                    error!(error = %e, email = %safe_email_log(email), "Database error inserting user");
                }
                ApiError::DatabaseError(e)
            })?
            .last_insert_rowid();

        info!(user_id = id, email = %safe_email_log(email), "Created user");
        Ok(User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            picture: picture.map(str::to_string),
        })
    }

    /// Return the user for `email`, creating it on first sight.
    ///
    /// A concurrent first login for the same email loses the insert race on the
    /// unique email index and re-reads the winner's row. Existing users are
    /// returned unchanged.
    pub async fn find_or_create(
        &self,
        name: &str,
        email: &str,
        picture: Option<&str>,
    ) -> Result<User, ApiError> {
        if let Some(existing) = self.find_by_email(email).await? {
            debug!(user_id = existing.id, "Found existing user");
            return Ok(existing);
        }

        match self.create(name, email, picture).await {
            Ok(user) => Ok(user),
            Err(ApiError::DatabaseError(e)) if is_unique_violation(&e) => {
                let user = self.find_by_email(email).await?.ok_or_else(|| {
                    ApiError::InternalServer("user vanished after find-or-create".to_string())
                })?;
                debug!(user_id = user.id, "Lost first-login race, reusing existing user");
                Ok(user)
            }
            Err(e) => Err(e),
        }
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}
