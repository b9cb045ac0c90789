use crate::auth::{PgTokenDenylist, TokenDenylist};
use crate::config::AppConfig;
use crate::database::DatabaseManager;

pub async fn purge(config: AppConfig) -> anyhow::Result<()> {
    let db = DatabaseManager::connect(&config.database).await?;
    let removed = PgTokenDenylist::new(db.pool().clone()).purge_expired().await;
    db.close().await;

    println!("Removed {} expired denylist entries", removed?);
    Ok(())
}
