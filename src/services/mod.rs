pub mod active_template_service;
pub mod template_service;
pub mod user_service;

pub use active_template_service::{ActiveTemplateError, ActiveTemplateService};
pub use template_service::{TemplateError, TemplateService};
pub use user_service::{UserError, UserService};

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
