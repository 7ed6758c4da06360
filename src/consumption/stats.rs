use std::collections::BTreeMap;

use time::{util::days_in_year_month, Date, Duration, Month, OffsetDateTime, UtcOffset};
use tracing::debug;
use uuid::Uuid;

use super::dto::{NutritionStats, NutritionStatsResponse};
use crate::foods::{ConsumptionLogEntry, FoodCatalog, FoodStats};
use crate::nutrients::round3;

pub const TOP_PRODUCTS_LIMIT: i64 = 30;
const TOP_PRODUCTS_MONTHS: u8 = 3;
const STATS_DAYS: i64 = 4;
const LAST_MEAL_WINDOW: Duration = Duration::hours(1);

#[derive(Debug, Default)]
struct Totals {
    calories: f64,
    protein: f64,
    fat: f64,
    carbs: f64,
    weight: f64,
}

impl Totals {
    fn add(&mut self, entry: &ConsumptionLogEntry) {
        if let Some(n) = &entry.nutrients {
            self.calories += n.calories.unwrap_or(0.0);
            self.protein += n.protein_g.unwrap_or(0.0);
            self.fat += n.total_fat_g.unwrap_or(0.0);
            self.carbs += n.carbohydrates_g.unwrap_or(0.0);
        }
        self.weight += entry.amount_g;
    }

    fn is_zero(&self) -> bool {
        self.calories == 0.0
            && self.protein == 0.0
            && self.fat == 0.0
            && self.carbs == 0.0
            && self.weight == 0.0
    }

    fn into_stats(self, period_start: OffsetDateTime, period_end: OffsetDateTime) -> NutritionStats {
        NutritionStats {
            period_start,
            period_end,
            total_calories: round3(self.calories),
            total_protein: round3(self.protein),
            total_fat: round3(self.fat),
            total_carbs: round3(self.carbs),
            total_weight: round3(self.weight),
        }
    }
}

/// Totals for the hour leading up to and including the latest entry.
async fn last_meal(catalog: &dyn FoodCatalog, user_id: Uuid) -> anyhow::Result<Option<NutritionStats>> {
    let Some(latest) = catalog.list_consumption_logs(user_id, 1, 0).await?.into_iter().next() else {
        return Ok(None);
    };
    let logs = catalog
        .consumption_logs_between(user_id, latest.consumed_at - LAST_MEAL_WINDOW, latest.consumed_at)
        .await?;
    let (Some(first), Some(last)) = (logs.first(), logs.last()) else {
        return Ok(None);
    };

    let mut totals = Totals::default();
    logs.iter().for_each(|l| totals.add(l));
    if totals.is_zero() {
        return Ok(None);
    }
    Ok(Some(totals.into_stats(first.consumed_at, last.consumed_at)))
}

/// Daily totals for today and the previous days, in `offset` local time.
/// Days without data are left out.
async fn recent_days(
    catalog: &dyn FoodCatalog,
    user_id: Uuid,
    now: OffsetDateTime,
    offset: UtcOffset,
) -> anyhow::Result<Vec<NutritionStats>> {
    let today = now.to_offset(offset).date();
    let from = (today - Duration::days(STATS_DAYS - 1)).midnight().assume_offset(offset);
    let to = today.midnight().assume_offset(offset) + Duration::days(1) - Duration::seconds(1);

    let mut days: BTreeMap<Date, Totals> = BTreeMap::new();
    for log in catalog.consumption_logs_between(user_id, from, to).await? {
        days.entry(log.consumed_at.to_offset(offset).date())
            .or_default()
            .add(&log);
    }

    Ok(days
        .into_iter()
        .filter(|(_, totals)| !totals.is_zero())
        .map(|(day, totals)| {
            let start = day.midnight().assume_offset(offset);
            totals.into_stats(start, start + Duration::days(1) - Duration::seconds(1))
        })
        .collect())
}

pub async fn nutrition_stats(
    catalog: &dyn FoodCatalog,
    user_id: Uuid,
    now: OffsetDateTime,
    offset: UtcOffset,
) -> anyhow::Result<NutritionStatsResponse> {
    let last_meal = last_meal(catalog, user_id).await?;
    let last_4_days = recent_days(catalog, user_id, now, offset).await?;
    debug!(%user_id, has_last_meal = last_meal.is_some(), days = last_4_days.len(), "nutrition stats");
    Ok(NutritionStatsResponse { last_meal, last_4_days })
}

/// Same wall time `months` calendar months earlier. The day is clamped to
/// the length of the target month.
fn months_before(at: OffsetDateTime, months: u8) -> anyhow::Result<OffsetDateTime> {
    let (mut year, mut month) = (at.year(), at.month());
    for _ in 0..months {
        if month == Month::January {
            year -= 1;
        }
        month = month.previous();
    }
    let day = at.day().min(days_in_year_month(year, month));
    Ok(at.replace_date(Date::from_calendar_date(year, month, day)?))
}

pub async fn top_products(
    catalog: &dyn FoodCatalog,
    user_id: Uuid,
    now: OffsetDateTime,
) -> anyhow::Result<Vec<FoodStats>> {
    let from = months_before(now, TOP_PRODUCTS_MONTHS)?;
    catalog.top_products(user_id, from, now, TOP_PRODUCTS_LIMIT).await
}
