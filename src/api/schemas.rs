use serde::Deserialize;
use validator::Validate;

use super::payload::MessagePayload;

/// Credentials are checked as given; an empty pair fails like any other.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UserLogin {
    pub username: String,
    pub password: String,
}

/// New account. `is_active` is accepted for compatibility but every new
/// account starts active.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UserCreate {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub username: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub password: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub client_id: Option<String>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TemplateCreate {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub id: String,
    pub client_id: Option<String>,
    pub channel_id: Option<String>,
    pub account_id: Option<String>,
    pub account_alias: Option<String>,
    pub template_name: Option<String>,
    pub template_description: Option<String>,
    pub division_id: Option<String>,
    #[validate]
    pub content: Option<MessagePayload>,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct TemplateUpdate {
    pub client_id: Option<String>,
    pub channel_id: Option<String>,
    pub account_id: Option<String>,
    pub account_alias: Option<String>,
    pub template_name: Option<String>,
    pub template_description: Option<String>,
    pub division_id: Option<String>,
    #[validate]
    pub content: Option<MessagePayload>,
}

impl TemplateUpdate {
    pub fn is_empty(&self) -> bool {
        self.client_id.is_none()
            && self.channel_id.is_none()
            && self.account_id.is_none()
            && self.account_alias.is_none()
            && self.template_name.is_none()
            && self.template_description.is_none()
            && self.division_id.is_none()
            && self.content.is_none()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplateListQuery {
    pub channel_id: Option<String>,
    pub account_id: Option<String>,
    pub division_id: Option<String>,
    /// Case-insensitive substring of `template_name`
    pub search: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ActiveTemplateCreate {
    /// Kept as a string on the wire; the service parses it.
    #[validate(length(min = 1, message = "must not be empty"))]
    pub user_id: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub template_id: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ActiveTemplateUpdate {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub template_id: String,
}
