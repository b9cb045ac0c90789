use std::sync::Arc;

use crate::auth::TokenDenylist;
use crate::config::AppConfig;
use crate::database::DatabaseManager;
use crate::services::{ActiveTemplateService, TemplateService, UserService};

/// Shared handles cloned into every request
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DatabaseManager,
    pub denylist: Arc<dyn TokenDenylist>,
}

impl AppState {
    pub fn new(config: AppConfig, db: DatabaseManager, denylist: Arc<dyn TokenDenylist>) -> Self {
        Self {
            config: Arc::new(config),
            db,
            denylist,
        }
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.db.pool().clone())
    }

    pub fn templates(&self) -> TemplateService {
        TemplateService::new(self.db.pool().clone())
    }

    pub fn active_templates(&self) -> ActiveTemplateService {
        ActiveTemplateService::new(self.db.pool().clone())
    }
}
