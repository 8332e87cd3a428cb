//! # User Repository
//!
//! Registration, login and profile updates.
//!
//! ## Registration Flow
//! ```text
//! register(username, email, password)
//!      │
//!      ├── validate fields (400)
//!      ├── hash password (argon2)
//!      ▼
//! BEGIN IMMEDIATE
//!      ├── username or email taken? → UniqueViolation (409)
//!      ├── pick 4-char id not in users.id
//!      └── INSERT
//! COMMIT
//! ```

use std::collections::HashSet;

use chrono::Utc;
use sqlx::SqlitePool;
use stockroom_core::ids::unique_user_id;
use stockroom_core::validation::{validate_email, validate_password, validate_username};
use stockroom_core::{CoreError, NewUser, ProfileUpdate, User, UserSummary, ValidationError};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::password::{hash_password, verify_password};

/// Repository for user accounts.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Finds a user by exact username or email.
    pub async fn find_by_login(&self, identifier: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash FROM users \
             WHERE username = ?1 OR email = ?1 \
             LIMIT 1",
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Gets the public view of a user.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<UserSummary>> {
        let user = sqlx::query_as::<_, UserSummary>(
            "SELECT id, username, email FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Checks credentials.
    ///
    /// ## Errors
    /// - `CoreError::UnknownUser` when nobody has that username or email
    /// - `CoreError::WrongPassword` when the password does not match
    pub async fn authenticate(&self, identifier: &str, password: &str) -> DbResult<UserSummary> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(ValidationError::required("identifier").into());
        }
        if password.trim().is_empty() {
            return Err(ValidationError::required("password").into());
        }

        let user = self
            .find_by_login(identifier)
            .await?
            .ok_or(CoreError::UnknownUser)?;

        if !verify_password(password, &user.password_hash) {
            debug!(user_id = %user.id, "Password mismatch");
            return Err(CoreError::WrongPassword.into());
        }

        Ok(user.summary())
    }

    /// Creates an account.
    pub async fn register(&self, new_user: NewUser) -> DbResult<UserSummary> {
        let username = validate_username(&new_user.username)?;
        let email = validate_email(&new_user.email)?;
        validate_password(&new_user.password)?;

        let password_hash = hash_password(&new_user.password)?;

        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        let clash: Option<(String, String)> = sqlx::query_as(
            "SELECT username, email FROM users WHERE username = ? OR email = ? LIMIT 1",
        )
        .bind(&username)
        .bind(&email)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some((taken_username, _)) = clash {
            return Err(if taken_username == username {
                DbError::duplicate("username", username)
            } else {
                DbError::duplicate("email", email)
            });
        }

        let existing: HashSet<String> = sqlx::query_scalar("SELECT id FROM users")
            .fetch_all(&mut *tx)
            .await?
            .into_iter()
            .collect();

        let id = unique_user_id(
            &mut rand::thread_rng(),
            |candidate| existing.contains(candidate),
            Utc::now().timestamp_millis(),
        );

        sqlx::query("INSERT INTO users (id, username, email, password_hash) VALUES (?, ?, ?, ?)")
            .bind(&id)
            .bind(&username)
            .bind(&email)
            .bind(&password_hash)
            .execute(&mut *tx)
            .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(user_id = %id, username = %username, "User registered");

        Ok(UserSummary {
            id,
            username,
            email,
        })
    }

    /// Applies profile changes to user `id`.
    ///
    /// Username and email stay unique across other users; a clash is a
    /// `UniqueViolation`. A new password is re-hashed.
    pub async fn update_profile(&self, id: &str, update: ProfileUpdate) -> DbResult<UserSummary> {
        if update.is_empty() {
            return Err(ValidationError::required("username, email or password").into());
        }

        let username = update
            .username
            .as_deref()
            .map(validate_username)
            .transpose()?;
        let email = update.email.as_deref().map(validate_email).transpose()?;
        let password_hash = match update.password.as_deref() {
            Some(password) => {
                validate_password(password)?;
                Some(hash_password(password)?)
            }
            None => None,
        };

        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        let current = sqlx::query_as::<_, UserSummary>(
            "SELECT id, username, email FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("User", id))?;

        if let Some(username) = &username {
            let taken: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM users WHERE username = ? AND id != ?)",
            )
            .bind(username)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
            if taken {
                return Err(DbError::duplicate("username", username.clone()));
            }
        }

        if let Some(email) = &email {
            let taken: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM users WHERE email = ? AND id != ?)",
            )
            .bind(email)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
            if taken {
                return Err(DbError::duplicate("email", email.clone()));
            }
        }

        let updated = UserSummary {
            id: current.id,
            username: username.unwrap_or(current.username),
            email: email.unwrap_or(current.email),
        };

        sqlx::query(
            "UPDATE users SET username = ?, email = ?, \
             password_hash = COALESCE(?, password_hash) \
             WHERE id = ?",
        )
        .bind(&updated.username)
        .bind(&updated.email)
        .bind(password_hash)
        .bind(&updated.id)
        .execute(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(user_id = %updated.id, "Profile updated");
        Ok(updated)
    }

    /// Resolves the user a movement is recorded for. See
    /// [`stockroom_core::UserIdentity`].
    pub(crate) async fn resolve_in(
        conn: &mut sqlx::SqliteConnection,
        username: Option<&str>,
        user_id: Option<&str>,
    ) -> DbResult<Option<String>> {
        if let Some(username) = username.map(str::trim).filter(|u| !u.is_empty()) {
            let id: Option<String> = sqlx::query_scalar("SELECT id FROM users WHERE username = ?")
                .bind(username)
                .fetch_optional(&mut *conn)
                .await?;
            if id.is_some() {
                return Ok(id);
            }
        }

        if let Some(user_id) = user_id.map(str::trim).filter(|u| !u.is_empty()) {
            let id: Option<String> = sqlx::query_scalar("SELECT id FROM users WHERE id = ?")
                .bind(user_id)
                .fetch_optional(&mut *conn)
                .await?;
            return Ok(id);
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password: "rahasia".to_string(),
        }
    }

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let db = db().await;
        let users = db.users();

        let created = users.register(new_user("budi", "budi@example.com")).await.unwrap();
        assert_eq!(created.id.len(), 4);

        let by_name = users.authenticate("budi", "rahasia").await.unwrap();
        assert_eq!(by_name, created);

        let by_email = users.authenticate("budi@example.com", "rahasia").await.unwrap();
        assert_eq!(by_email.id, created.id);
    }

    #[tokio::test]
    async fn test_login_failures() {
        let db = db().await;
        let users = db.users();
        users.register(new_user("sari", "sari@example.com")).await.unwrap();

        let wrong = users.authenticate("sari", "salah!").await.unwrap_err();
        assert!(matches!(wrong, DbError::Core(CoreError::WrongPassword)));

        let unknown = users.authenticate("nobody", "rahasia").await.unwrap_err();
        assert!(matches!(unknown, DbError::Core(CoreError::UnknownUser)));

        let blank = users.authenticate("  ", "rahasia").await.unwrap_err();
        assert!(matches!(blank, DbError::Core(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_duplicate_registration_creates_nothing() {
        let db = db().await;
        let users = db.users();
        users.register(new_user("andi", "andi@example.com")).await.unwrap();

        let dup_name = users
            .register(new_user("andi", "other@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(dup_name, DbError::UniqueViolation { ref field, .. } if field == "username"));

        let dup_email = users
            .register(new_user("andi2", "andi@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(dup_email, DbError::UniqueViolation { ref field, .. } if field == "email"));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_registered_ids_are_unique() {
        let db = db().await;
        let users = db.users();
        let mut ids = HashSet::new();
        for n in 0..8 {
            let user = users
                .register(new_user(&format!("user{n}"), &format!("user{n}@example.com")))
                .await
                .unwrap();
            assert!(ids.insert(user.id));
        }
    }

    #[tokio::test]
    async fn test_short_password_rejected() {
        let db = db().await;
        let mut user = new_user("dewi", "dewi@example.com");
        user.password = "abc".to_string();
        let err = db.users().register(user).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_profile() {
        let db = db().await;
        let users = db.users();
        let budi = users.register(new_user("budi", "budi@example.com")).await.unwrap();
        users.register(new_user("sari", "sari@example.com")).await.unwrap();

        let updated = users
            .update_profile(
                &budi.id,
                ProfileUpdate {
                    email: Some("budi@toko.id".to_string()),
                    password: Some("baru123".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.username, "budi");
        assert_eq!(updated.email, "budi@toko.id");
        assert!(users.authenticate("budi", "baru123").await.is_ok());

        let clash = users
            .update_profile(
                &budi.id,
                ProfileUpdate {
                    username: Some("sari".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(clash, DbError::UniqueViolation { .. }));

        let missing = users
            .update_profile(
                "zzzz",
                ProfileUpdate {
                    username: Some("ghost".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(missing, DbError::NotFound { .. }));
    }
}
