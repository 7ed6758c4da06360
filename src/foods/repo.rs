use anyhow::Context;
use async_trait::async_trait;
use sqlx::{types::Json, PgPool, Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use super::catalog::FoodCatalog;
use super::repo_types::{
    ConsumptionLogEntry, ConsumptionLogRow, Food, FoodFilter, FoodRow, FoodStats, NewFood,
};

const FOOD_COLUMNS: &str = "id, name, description, barcode, food_type, is_archived, \
     serving_size_g, serving_name, nutrients, food_composition, created_at, updated_at";

/// Postgres-backed catalog.
#[derive(Clone)]
pub struct PgCatalog {
    db: PgPool,
}

impl PgCatalog {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FoodCatalog for PgCatalog {
    async fn get_food(&self, id: i64) -> anyhow::Result<Option<Food>> {
        let sql = format!("SELECT {FOOD_COLUMNS} FROM food WHERE id = $1");
        let row = sqlx::query_as::<_, FoodRow>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .with_context(|| format!("get food {}", id))?;

        row.map(Food::try_from).transpose()
    }

    async fn search_food(&self, filter: &FoodFilter) -> anyhow::Result<Vec<Food>> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(FOOD_COLUMNS).push(" FROM food WHERE TRUE");

        if !filter.ids.is_empty() {
            qb.push(" AND id = ANY(")
                .push_bind(filter.ids.clone())
                .push(")");
        }
        if let Some(name) = filter.name.as_deref().filter(|n| !n.is_empty()) {
            qb.push(" AND LOWER(name) LIKE '%' || LOWER(")
                .push_bind(name.to_string())
                .push(") || '%'");
        }
        if let Some(barcode) = filter.barcode.as_deref().filter(|b| !b.is_empty()) {
            qb.push(" AND barcode = ").push_bind(barcode.to_string());
        }
        qb.push(" ORDER BY name ASC");

        let rows = qb
            .build_query_as::<FoodRow>()
            .fetch_all(&self.db)
            .await
            .context("search food")?;

        rows.into_iter().map(Food::try_from).collect()
    }

    async fn add_food(&self, food: NewFood) -> anyhow::Result<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO food (name, description, barcode, food_type, is_archived,
                              serving_size_g, serving_name, nutrients, food_composition)
            VALUES ($1, $2, $3, $4, FALSE, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(&food.name)
        .bind(&food.description)
        .bind(&food.barcode)
        .bind(food.food_type.as_str())
        .bind(food.serving_size_g)
        .bind(&food.serving_name)
        .bind(food.nutrients.map(Json))
        .bind((!food.food_composition.is_empty()).then(|| Json(food.food_composition)))
        .fetch_one(&self.db)
        .await
        .with_context(|| format!("insert food '{}'", food.name))?;

        Ok(id)
    }

    async fn add_consumption_log(&self, entry: &ConsumptionLogEntry) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO consumption_log (user_id, consumed_at, food_id, food_name, amount_g,
                                         meal_type, note, nutrients)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(entry.user_id)
        .bind(entry.consumed_at)
        .bind(entry.food_id)
        .bind(&entry.food_name)
        .bind(entry.amount_g)
        .bind(&entry.meal_type)
        .bind(&entry.note)
        .bind(entry.nutrients.clone().map(Json))
        .execute(&self.db)
        .await
        .context("insert consumption log")?;

        Ok(())
    }

    async fn list_consumption_logs(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<ConsumptionLogEntry>> {
        let rows = sqlx::query_as::<_, ConsumptionLogRow>(
            r#"
            SELECT user_id, consumed_at, food_id, food_name, amount_g, meal_type, note, nutrients
              FROM consumption_log
             WHERE user_id = $1
             ORDER BY consumed_at DESC
             LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await
        .context("list consumption logs")?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn consumption_logs_between(
        &self,
        user_id: Uuid,
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> anyhow::Result<Vec<ConsumptionLogEntry>> {
        let rows = sqlx::query_as::<_, ConsumptionLogRow>(
            r#"
            SELECT user_id, consumed_at, food_id, food_name, amount_g, meal_type, note, nutrients
              FROM consumption_log
             WHERE user_id = $1
               AND consumed_at >= $2
               AND consumed_at <= $3
             ORDER BY consumed_at ASC
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.db)
        .await
        .context("consumption logs in window")?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn top_products(
        &self,
        user_id: Uuid,
        from: OffsetDateTime,
        to: OffsetDateTime,
        limit: i64,
    ) -> anyhow::Result<Vec<FoodStats>> {
        sqlx::query_as::<_, FoodStats>(
            r#"
            SELECT cl.food_id, f.name AS food_name, f.serving_name, COUNT(*) AS log_count
              FROM consumption_log cl
              JOIN food f ON f.id = cl.food_id
             WHERE cl.user_id = $1
               AND cl.consumed_at >= $2
               AND cl.consumed_at <= $3
               AND cl.food_id IS NOT NULL
             GROUP BY cl.food_id, f.name, f.serving_name
             ORDER BY log_count DESC, cl.food_id ASC
             LIMIT $4
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .bind(limit)
        .fetch_all(&self.db)
        .await
        .context("top products")
    }
}
