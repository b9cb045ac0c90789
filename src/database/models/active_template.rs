use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// An assignment row joined with the channel fields of its template.
#[derive(Debug, Clone, FromRow)]
pub struct ActiveTemplate {
    pub id: String,
    pub user_id: i32,
    pub template_id: String,
    pub client_id: Option<String>,
    pub channel_id: Option<String>,
    pub account_id: Option<String>,
    pub account_alias: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Single assignment, keyed by user
#[derive(Debug, Clone, Serialize)]
pub struct ActiveTemplateView {
    pub user_id: i32,
    pub template_id: String,
    pub client_id: Option<String>,
    pub channel_id: Option<String>,
    pub account_id: Option<String>,
    pub account_alias: Option<String>,
}

/// Row of the paginated assignment list, keyed by assignment id
#[derive(Debug, Clone, Serialize)]
pub struct ActiveTemplatePageItem {
    pub id: String,
    pub template_id: String,
    pub client_id: Option<String>,
    pub channel_id: Option<String>,
    pub account_id: Option<String>,
    pub account_alias: Option<String>,
}

impl From<ActiveTemplate> for ActiveTemplateView {
    fn from(row: ActiveTemplate) -> Self {
        Self {
            user_id: row.user_id,
            template_id: row.template_id,
            client_id: row.client_id,
            channel_id: row.channel_id,
            account_id: row.account_id,
            account_alias: row.account_alias,
        }
    }
}

impl From<ActiveTemplate> for ActiveTemplatePageItem {
    fn from(row: ActiveTemplate) -> Self {
        Self {
            id: row.id,
            template_id: row.template_id,
            client_id: row.client_id,
            channel_id: row.channel_id,
            account_id: row.account_id,
            account_alias: row.account_alias,
        }
    }
}

/// Shared SELECT for assignment rows; callers append WHERE/ORDER clauses.
pub const ACTIVE_TEMPLATE_SELECT: &str = r#"
    SELECT a.id, a.user_id, a.template_id,
           t.client_id, t.channel_id, t.account_id, t.account_alias,
           a.created_at, a.updated_at
    FROM active_templates a
    JOIN templates t ON t.id = a.template_id
"#;
