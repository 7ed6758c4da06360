use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{ConsumptionLogEntry, Food, FoodFilter, FoodStats, NewFood};

/// Food catalog and consumption log store.
#[async_trait]
pub trait FoodCatalog: Send + Sync {
    async fn get_food(&self, id: i64) -> anyhow::Result<Option<Food>>;
    async fn search_food(&self, filter: &FoodFilter) -> anyhow::Result<Vec<Food>>;
    async fn add_food(&self, food: NewFood) -> anyhow::Result<i64>;
    async fn add_consumption_log(&self, entry: &ConsumptionLogEntry) -> anyhow::Result<()>;
    async fn list_consumption_logs(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<ConsumptionLogEntry>>;
    /// Entries with `from <= consumed_at <= to`, oldest first.
    async fn consumption_logs_between(
        &self,
        user_id: Uuid,
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> anyhow::Result<Vec<ConsumptionLogEntry>>;
    /// Most logged catalog foods in the window, by count desc then id asc.
    async fn top_products(
        &self,
        user_id: Uuid,
        from: OffsetDateTime,
        to: OffsetDateTime,
        limit: i64,
    ) -> anyhow::Result<Vec<FoodStats>>;
}
