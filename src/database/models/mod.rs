pub mod active_template;
pub mod template;
pub mod user;

pub use active_template::{ActiveTemplate, ActiveTemplatePageItem, ActiveTemplateView};
pub use template::Template;
pub use user::{User, UserView};
