use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// A chatbot message template. Rows are never removed by the API; deletion
/// flips `is_deleted`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Template {
    pub id: String,
    pub user_id: i32,
    pub client_id: Option<String>,
    pub channel_id: Option<String>,
    pub account_id: Option<String>,
    pub account_alias: Option<String>,
    pub template_name: Option<String>,
    pub template_description: Option<String>,
    pub division_id: Option<String>,
    pub content: Option<serde_json::Value>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}
