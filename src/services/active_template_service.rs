use sqlx::{PgPool, Postgres, Transaction};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::api::pagination::Pagination;
use crate::api::schemas::{ActiveTemplateCreate, ActiveTemplateUpdate};
use crate::database::models::active_template::ACTIVE_TEMPLATE_SELECT;
use crate::database::models::ActiveTemplate;
use super::is_unique_violation;

#[derive(Debug, Error)]
pub enum ActiveTemplateError {
    #[error("Invalid user_id '{0}': must be an integer")]
    InvalidUserId(String),
    #[error("User {0} not found")]
    UserNotFound(i32),
    #[error("Template '{0}' not found")]
    TemplateNotFound(String),
    #[error("User {0} already has an active template")]
    AlreadyAssigned(i32),
    #[error("Active template for user {0} not found")]
    NotFound(i32),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// One active template per user. The assigned template must be live and
/// owned by that user.
pub struct ActiveTemplateService {
    pool: PgPool,
}

impl ActiveTemplateService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_active_template(
        &self,
        input: ActiveTemplateCreate,
    ) -> Result<ActiveTemplate, ActiveTemplateError> {
        let user_id: i32 = input
            .user_id
            .trim()
            .parse()
            .map_err(|_| ActiveTemplateError::InvalidUserId(input.user_id.clone()))?;

        let mut tx = self.pool.begin().await?;
        ensure_active_user(&mut tx, user_id).await?;
        ensure_assignable_template(&mut tx, user_id, &input.template_id).await?;

        let assigned: (bool,) = sqlx::query_as("SELECT EXISTS (SELECT 1 FROM active_templates WHERE user_id = $1)")
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;
        if assigned.0 {
            return Err(ActiveTemplateError::AlreadyAssigned(user_id));
        }

        sqlx::query("INSERT INTO active_templates (id, user_id, template_id) VALUES ($1, $2, $3)")
            .bind(Uuid::new_v4().to_string())
            .bind(user_id)
            .bind(&input.template_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    ActiveTemplateError::AlreadyAssigned(user_id)
                } else {
                    ActiveTemplateError::Database(e)
                }
            })?;

        let row = fetch_by_user(&mut tx, user_id).await?;
        tx.commit().await?;

        info!("Assigned template {} to user {}", row.template_id, user_id);
        Ok(row)
    }

    pub async fn get_active_template(&self, user_id: i32) -> Result<ActiveTemplate, ActiveTemplateError> {
        sqlx::query_as::<_, ActiveTemplate>(&format!("{} WHERE a.user_id = $1", ACTIVE_TEMPLATE_SELECT))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ActiveTemplateError::NotFound(user_id))
    }

    pub async fn list_active_templates(
        &self,
        pagination: Pagination,
    ) -> Result<(Vec<ActiveTemplate>, i64), ActiveTemplateError> {
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM active_templates")
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, ActiveTemplate>(&format!(
            "{} ORDER BY a.created_at DESC, a.id LIMIT $1 OFFSET $2",
            ACTIVE_TEMPLATE_SELECT
        ))
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((rows, total.0))
    }

    pub async fn update_active_template(
        &self,
        user_id: i32,
        input: ActiveTemplateUpdate,
    ) -> Result<ActiveTemplate, ActiveTemplateError> {
        let mut tx = self.pool.begin().await?;
        ensure_assignable_template(&mut tx, user_id, &input.template_id).await?;

        let updated = sqlx::query(
            "UPDATE active_templates SET template_id = $2, updated_at = now() WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(&input.template_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        if updated == 0 {
            return Err(ActiveTemplateError::NotFound(user_id));
        }

        let row = fetch_by_user(&mut tx, user_id).await?;
        tx.commit().await?;

        info!("Reassigned user {} to template {}", user_id, row.template_id);
        Ok(row)
    }

    pub async fn delete_active_template(&self, user_id: i32) -> Result<(), ActiveTemplateError> {
        let deleted = sqlx::query("DELETE FROM active_templates WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if deleted == 0 {
            return Err(ActiveTemplateError::NotFound(user_id));
        }

        info!("Removed active template of user {}", user_id);
        Ok(())
    }
}

async fn ensure_active_user(tx: &mut Transaction<'_, Postgres>, user_id: i32) -> Result<(), ActiveTemplateError> {
    let found: (bool,) = sqlx::query_as("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1 AND is_active)")
        .bind(user_id)
        .fetch_one(&mut **tx)
        .await?;
    if found.0 {
        Ok(())
    } else {
        Err(ActiveTemplateError::UserNotFound(user_id))
    }
}

async fn ensure_assignable_template(
    tx: &mut Transaction<'_, Postgres>,
    user_id: i32,
    template_id: &str,
) -> Result<(), ActiveTemplateError> {
    let found: (bool,) = sqlx::query_as(
        "SELECT EXISTS (SELECT 1 FROM templates WHERE id = $1 AND user_id = $2 AND NOT is_deleted)",
    )
    .bind(template_id)
    .bind(user_id)
    .fetch_one(&mut **tx)
    .await?;
    if found.0 {
        Ok(())
    } else {
        Err(ActiveTemplateError::TemplateNotFound(template_id.to_string()))
    }
}

async fn fetch_by_user(
    tx: &mut Transaction<'_, Postgres>,
    user_id: i32,
) -> Result<ActiveTemplate, ActiveTemplateError> {
    let row = sqlx::query_as::<_, ActiveTemplate>(&format!("{} WHERE a.user_id = $1", ACTIVE_TEMPLATE_SELECT))
        .bind(user_id)
        .fetch_one(&mut **tx)
        .await?;
    Ok(row)
}
