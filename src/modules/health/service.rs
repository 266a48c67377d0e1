use async_trait::async_trait;
use sqlx::PgPool;

/// Reports whether the backing database is reachable.
#[async_trait]
pub trait StatusCheck: Send + Sync {
    async fn status_check(&self) -> anyhow::Result<()>;
}

#[async_trait]
impl StatusCheck for PgPool {
    async fn status_check(&self) -> anyhow::Result<()> {
        sales_db::status_check(self).await?;
        Ok(())
    }
}
