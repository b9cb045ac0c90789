use sqlx::{PgPool, Postgres, QueryBuilder};
use thiserror::Error;
use tracing::{debug, info};

use crate::api::pagination::Pagination;
use crate::api::schemas::{TemplateCreate, TemplateListQuery, TemplateUpdate};
use crate::database::models::Template;
use super::is_unique_violation;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template with id '{0}' already exists")]
    AlreadyExists(String),
    #[error("Template '{0}' not found")]
    NotFound(String),
    #[error("No fields to update")]
    NothingToUpdate,
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

const TEMPLATE_COLUMNS: &str = "id, user_id, client_id, channel_id, account_id, account_alias, \
     template_name, template_description, division_id, content, is_deleted, \
     created_at, updated_at, deleted_at";

/// Template CRUD scoped to the owning user. Soft-deleted rows are invisible to
/// every operation except `restore_template`.
pub struct TemplateService {
    pool: PgPool,
}

impl TemplateService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_template(&self, owner: i32, input: TemplateCreate) -> Result<Template, TemplateError> {
        // ids stay reserved after a soft delete
        let exists: (bool,) = sqlx::query_as("SELECT EXISTS (SELECT 1 FROM templates WHERE id = $1)")
            .bind(&input.id)
            .fetch_one(&self.pool)
            .await?;
        if exists.0 {
            return Err(TemplateError::AlreadyExists(input.id));
        }

        let content = input.content.as_ref().map(|payload| payload.to_value());
        let template = sqlx::query_as::<_, Template>(&format!(
            "INSERT INTO templates (id, user_id, client_id, channel_id, account_id, account_alias,
                                    template_name, template_description, division_id, content)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {}",
            TEMPLATE_COLUMNS
        ))
        .bind(&input.id)
        .bind(owner)
        .bind(&input.client_id)
        .bind(&input.channel_id)
        .bind(&input.account_id)
        .bind(&input.account_alias)
        .bind(&input.template_name)
        .bind(&input.template_description)
        .bind(&input.division_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                TemplateError::AlreadyExists(input.id.clone())
            } else {
                TemplateError::Database(e)
            }
        })?;

        info!("User {} created template {}", owner, template.id);
        Ok(template)
    }

    pub async fn get_template(&self, owner: i32, id: &str) -> Result<Template, TemplateError> {
        sqlx::query_as::<_, Template>(&format!(
            "SELECT {} FROM templates WHERE id = $1 AND user_id = $2 AND NOT is_deleted",
            TEMPLATE_COLUMNS
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| TemplateError::NotFound(id.to_string()))
    }

    pub async fn list_templates(
        &self,
        owner: i32,
        filter: &TemplateListQuery,
        pagination: Pagination,
    ) -> Result<(Vec<Template>, i64), TemplateError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM templates");
        push_list_filters(&mut count, owner, filter);
        let total: (i64,) = count.build_query_as().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM templates", TEMPLATE_COLUMNS));
        push_list_filters(&mut select, owner, filter);
        select
            .push(" ORDER BY created_at DESC, id LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());
        let templates = select.build_query_as::<Template>().fetch_all(&self.pool).await?;

        debug!("Listed {} of {} templates for user {}", templates.len(), total.0, owner);
        Ok((templates, total.0))
    }

    pub async fn update_template(
        &self,
        owner: i32,
        id: &str,
        input: TemplateUpdate,
    ) -> Result<Template, TemplateError> {
        if input.is_empty() {
            return Err(TemplateError::NothingToUpdate);
        }

        let content = input.content.as_ref().map(|payload| payload.to_value());
        let template = sqlx::query_as::<_, Template>(&format!(
            "UPDATE templates SET
                 client_id = COALESCE($3, client_id),
                 channel_id = COALESCE($4, channel_id),
                 account_id = COALESCE($5, account_id),
                 account_alias = COALESCE($6, account_alias),
                 template_name = COALESCE($7, template_name),
                 template_description = COALESCE($8, template_description),
                 division_id = COALESCE($9, division_id),
                 content = COALESCE($10, content),
                 updated_at = now()
             WHERE id = $1 AND user_id = $2 AND NOT is_deleted
             RETURNING {}",
            TEMPLATE_COLUMNS
        ))
        .bind(id)
        .bind(owner)
        .bind(&input.client_id)
        .bind(&input.channel_id)
        .bind(&input.account_id)
        .bind(&input.account_alias)
        .bind(&input.template_name)
        .bind(&input.template_description)
        .bind(&input.division_id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| TemplateError::NotFound(id.to_string()))?;

        info!("User {} updated template {}", owner, id);
        Ok(template)
    }

    /// Soft delete. Assignments pointing at the template are removed in the
    /// same transaction.
    pub async fn delete_template(&self, owner: i32, id: &str) -> Result<Template, TemplateError> {
        let mut tx = self.pool.begin().await?;

        let template = sqlx::query_as::<_, Template>(&format!(
            "UPDATE templates SET is_deleted = TRUE, deleted_at = now(), updated_at = now()
             WHERE id = $1 AND user_id = $2 AND NOT is_deleted
             RETURNING {}",
            TEMPLATE_COLUMNS
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| TemplateError::NotFound(id.to_string()))?;

        let unassigned = sqlx::query("DELETE FROM active_templates WHERE template_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        info!("User {} deleted template {} ({} assignments removed)", owner, id, unassigned);
        Ok(template)
    }

    pub async fn restore_template(&self, owner: i32, id: &str) -> Result<Template, TemplateError> {
        let template = sqlx::query_as::<_, Template>(&format!(
            "UPDATE templates SET is_deleted = FALSE, deleted_at = NULL, updated_at = now()
             WHERE id = $1 AND user_id = $2 AND is_deleted
             RETURNING {}",
            TEMPLATE_COLUMNS
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| TemplateError::NotFound(id.to_string()))?;

        info!("User {} restored template {}", owner, id);
        Ok(template)
    }
}

fn push_list_filters(builder: &mut QueryBuilder<'_, Postgres>, owner: i32, filter: &TemplateListQuery) {
    builder.push(" WHERE NOT is_deleted AND user_id = ").push_bind(owner);

    if let Some(channel_id) = &filter.channel_id {
        builder.push(" AND channel_id = ").push_bind(channel_id.clone());
    }
    if let Some(account_id) = &filter.account_id {
        builder.push(" AND account_id = ").push_bind(account_id.clone());
    }
    if let Some(division_id) = &filter.division_id {
        builder.push(" AND division_id = ").push_bind(division_id.clone());
    }
    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        builder
            .push(" AND template_name ILIKE ")
            .push_bind(format!("%{}%", escape_like(search)));
    }
}

/// Escape LIKE wildcards so a search term matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
