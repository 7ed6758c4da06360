use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::catalog::FoodCatalog;
use super::repo_types::{ConsumptionLogEntry, Food, FoodFilter, FoodStats, FoodType, NewFood};
use crate::nutrients::NutrientProfile;

#[derive(Default)]
struct Inner {
    foods: Vec<Food>,
    logs: Vec<ConsumptionLogEntry>,
    search_calls: Vec<FoodFilter>,
    fail_log_at: Option<usize>,
    fail_search: bool,
}

/// Catalog kept in memory, mirroring the Postgres search semantics.
#[derive(Default)]
pub struct InMemoryCatalog {
    inner: Mutex<Inner>,
}

impl InMemoryCatalog {
    pub fn with_foods(foods: Vec<Food>) -> Self {
        let catalog = Self::default();
        catalog.inner.lock().unwrap().foods = foods;
        catalog
    }

    /// Makes the n-th (0-based) `add_consumption_log` call fail.
    pub fn fail_log_at(self, n: usize) -> Self {
        self.inner.lock().unwrap().fail_log_at = Some(n);
        self
    }

    pub fn fail_search(self) -> Self {
        self.inner.lock().unwrap().fail_search = true;
        self
    }

    pub fn logs(&self) -> Vec<ConsumptionLogEntry> {
        self.inner.lock().unwrap().logs.clone()
    }

    pub fn search_calls(&self) -> Vec<FoodFilter> {
        self.inner.lock().unwrap().search_calls.clone()
    }
}

/// Builds a catalog food with sensible defaults for tests.
pub fn food(id: i64, name: &str) -> Food {
    Food {
        id,
        name: name.to_string(),
        description: None,
        barcode: None,
        food_type: FoodType::Product,
        is_archived: false,
        serving_size_g: None,
        serving_name: None,
        nutrients: None,
        food_composition: Vec::new(),
        created_at: OffsetDateTime::UNIX_EPOCH,
        updated_at: OffsetDateTime::UNIX_EPOCH,
    }
}

pub fn macros(calories: f64, protein_g: f64, total_fat_g: f64, carbohydrates_g: f64) -> NutrientProfile {
    NutrientProfile {
        calories: Some(calories),
        protein_g: Some(protein_g),
        total_fat_g: Some(total_fat_g),
        carbohydrates_g: Some(carbohydrates_g),
        ..Default::default()
    }
}

fn matches(food: &Food, filter: &FoodFilter) -> bool {
    if !filter.ids.is_empty() && !filter.ids.contains(&food.id) {
        return false;
    }
    if let Some(name) = filter.name.as_deref().filter(|n| !n.is_empty()) {
        if !food.name.to_lowercase().contains(&name.to_lowercase()) {
            return false;
        }
    }
    if let Some(barcode) = filter.barcode.as_deref().filter(|b| !b.is_empty()) {
        if food.barcode.as_deref() != Some(barcode) {
            return false;
        }
    }
    true
}

#[async_trait]
impl FoodCatalog for InMemoryCatalog {
    async fn get_food(&self, id: i64) -> anyhow::Result<Option<Food>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.foods.iter().find(|f| f.id == id).cloned())
    }

    async fn search_food(&self, filter: &FoodFilter) -> anyhow::Result<Vec<Food>> {
        let mut inner = self.inner.lock().unwrap();
        inner.search_calls.push(filter.clone());
        if inner.fail_search {
            anyhow::bail!("connection reset");
        }
        let mut found: Vec<Food> = inner
            .foods
            .iter()
            .filter(|f| matches(f, filter))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }

    async fn add_food(&self, new: NewFood) -> anyhow::Result<i64> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.foods.iter().map(|f| f.id).max().unwrap_or(0) + 1;
        let now = OffsetDateTime::now_utc();
        inner.foods.push(Food {
            id,
            name: new.name,
            description: new.description,
            barcode: new.barcode,
            food_type: new.food_type,
            is_archived: false,
            serving_size_g: new.serving_size_g,
            serving_name: new.serving_name,
            nutrients: new.nutrients,
            food_composition: new.food_composition,
            created_at: now,
            updated_at: now,
        });
        Ok(id)
    }

    async fn add_consumption_log(&self, entry: &ConsumptionLogEntry) -> anyhow::Result<()> {
        let mut inner = self.inner.lock().unwrap();
        let attempt = inner.logs.len();
        if inner.fail_log_at == Some(attempt) {
            anyhow::bail!("disk full");
        }
        inner.logs.push(entry.clone());
        Ok(())
    }

    async fn list_consumption_logs(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<ConsumptionLogEntry>> {
        let inner = self.inner.lock().unwrap();
        let mut logs: Vec<ConsumptionLogEntry> = inner
            .logs
            .iter()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect();
        logs.sort_by(|a, b| b.consumed_at.cmp(&a.consumed_at));
        Ok(logs
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn consumption_logs_between(
        &self,
        user_id: Uuid,
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> anyhow::Result<Vec<ConsumptionLogEntry>> {
        let inner = self.inner.lock().unwrap();
        let mut logs: Vec<ConsumptionLogEntry> = inner
            .logs
            .iter()
            .filter(|l| l.user_id == user_id && l.consumed_at >= from && l.consumed_at <= to)
            .cloned()
            .collect();
        logs.sort_by(|a, b| a.consumed_at.cmp(&b.consumed_at));
        Ok(logs)
    }

    async fn top_products(
        &self,
        user_id: Uuid,
        from: OffsetDateTime,
        to: OffsetDateTime,
        limit: i64,
    ) -> anyhow::Result<Vec<FoodStats>> {
        let inner = self.inner.lock().unwrap();
        let mut counts: HashMap<i64, i64> = HashMap::new();
        for log in &inner.logs {
            if log.user_id != user_id || log.consumed_at < from || log.consumed_at > to {
                continue;
            }
            if let Some(food_id) = log.food_id {
                *counts.entry(food_id).or_default() += 1;
            }
        }

        let mut stats: Vec<FoodStats> = counts
            .into_iter()
            .filter_map(|(food_id, log_count)| {
                let food = inner.foods.iter().find(|f| f.id == food_id)?;
                Some(FoodStats {
                    food_id,
                    food_name: food.name.clone(),
                    serving_name: food.serving_name.clone(),
                    log_count,
                })
            })
            .collect();
        stats.sort_by(|a, b| b.log_count.cmp(&a.log_count).then_with(|| a.food_id.cmp(&b.food_id)));
        stats.truncate(limit.max(0) as usize);
        Ok(stats)
    }
}
