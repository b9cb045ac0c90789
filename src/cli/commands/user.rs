use anyhow::Context;
use validator::Validate;

use crate::api::schemas::UserCreate;
use crate::config::AppConfig;
use crate::database::DatabaseManager;
use crate::services::UserService;

/// Same rules as `POST /users/`
pub async fn create(config: AppConfig, input: UserCreate) -> anyhow::Result<()> {
    input.validate().context("invalid user")?;

    let db = DatabaseManager::connect(&config.database).await?;
    let result = UserService::new(db.pool().clone())
        .create_user(input, config.security.bcrypt_cost)
        .await;
    db.close().await;

    let user = result?;
    println!("Created user {} (id {})", user.username, user.id);
    Ok(())
}
