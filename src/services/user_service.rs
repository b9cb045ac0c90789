use sqlx::PgPool;
use thiserror::Error;
use tracing::{debug, info};

use crate::api::pagination::Pagination;
use crate::api::schemas::UserCreate;
use crate::auth::password::{hash_password_blocking, verify_password_blocking, PasswordError};
use crate::database::models::User;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("Username already exists")]
    UsernameTaken,
    #[error("Email already exists")]
    EmailTaken,
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Password error: {0}")]
    Password(#[from] PasswordError),
}

const USER_COLUMNS: &str =
    "id, email, username, name, hashed_password, is_active, client_id, created_at, updated_at";

pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Check a username/password pair. Inactive accounts, accounts without a
    /// stored hash and wrong passwords all come back as `None`.
    pub async fn auth_user(&self, username: &str, password: &str) -> Result<Option<User>, UserError> {
        // no stored account has an empty username or password
        if username.is_empty() || password.is_empty() {
            debug!("Login with empty credentials");
            return Ok(None);
        }

        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE username = $1 AND is_active",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        let Some(user) = user else {
            debug!("Login for unknown or inactive user {}", username);
            return Ok(None);
        };
        let Some(hashed) = user.hashed_password.clone() else {
            debug!("User {} has no password set", user.id);
            return Ok(None);
        };

        if verify_password_blocking(password.to_string(), hashed).await? {
            Ok(Some(user))
        } else {
            debug!("Password mismatch for user {}", user.id);
            Ok(None)
        }
    }

    /// Active user by id; used to resolve token subjects.
    pub async fn auth_user_by_user_id(&self, user_id: i32) -> Result<Option<User>, UserError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1 AND is_active",
            USER_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn get_users(&self, pagination: Pagination) -> Result<(Vec<User>, i64), UserError> {
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users ORDER BY id LIMIT $1 OFFSET $2",
            USER_COLUMNS
        ))
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((users, total.0))
    }

    pub async fn create_user(&self, input: UserCreate, bcrypt_cost: u32) -> Result<User, UserError> {
        let hashed = hash_password_blocking(input.password, bcrypt_cost).await?;

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, username, name, hashed_password, is_active, client_id)
             VALUES ($1, $2, $3, $4, TRUE, $5)
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&input.email)
        .bind(&input.username)
        .bind(&input.name)
        .bind(&hashed)
        .bind(&input.client_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        info!("Created user {} ({})", user.id, user.username);
        Ok(user)
    }
}

fn map_unique_violation(err: sqlx::Error) -> UserError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            match db.constraint() {
                Some("users_username_key") => return UserError::UsernameTaken,
                Some("users_email_key") => return UserError::EmailTaken,
                _ => {}
            }
        }
    }
    UserError::Database(err)
}
