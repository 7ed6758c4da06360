use time::OffsetDateTime;
use uuid::Uuid;

use super::dto::{ConsumedItem, DirectNutrients, LogDetails};
use super::error::ItemError;
use crate::foods::{ConsumptionLogEntry, Food};
use crate::nutrients::{round3, scale, NutrientProfile};

/// Who ate, when, and the free-form metadata carried into every entry.
#[derive(Debug, Clone)]
pub struct LogContext {
    pub user_id: Uuid,
    pub consumed_at: OffsetDateTime,
    pub meal_type: Option<String>,
    pub note: Option<String>,
}

impl LogContext {
    /// Empty strings count as absent; a missing timestamp means now.
    pub fn new(
        user_id: Uuid,
        consumed_at: Option<OffsetDateTime>,
        meal_type: Option<&str>,
        note: Option<&str>,
    ) -> Self {
        let present = |s: Option<&str>| s.filter(|s| !s.is_empty()).map(str::to_string);
        Self {
            user_id,
            consumed_at: consumed_at.unwrap_or_else(OffsetDateTime::now_utc),
            meal_type: present(meal_type),
            note: present(note),
        }
    }

    pub fn for_item(user_id: Uuid, item: &ConsumedItem) -> Self {
        Self::new(user_id, item.consumed_at, item.meal_type.as_deref(), item.note.as_deref())
    }

    pub fn for_details(user_id: Uuid, details: &LogDetails) -> Self {
        Self::new(
            user_id,
            details.consumed_at,
            details.meal_type.as_deref(),
            details.note.as_deref(),
        )
    }
}

/// Entry for a catalog food, with its nutrients scaled to `grams`.
/// With `require_nutrients`, a food without a profile is an error instead of
/// an entry with null nutrients.
pub fn assemble_food(
    ctx: LogContext,
    food: &Food,
    grams: f64,
    require_nutrients: bool,
) -> Result<ConsumptionLogEntry, ItemError> {
    let nutrients = food.nutrients.as_ref().map(|base| scale(base, grams));
    if require_nutrients && nutrients.is_none() {
        return Err(ItemError::MissingNutrients {
            food: food.name.clone(),
        });
    }

    Ok(ConsumptionLogEntry {
        user_id: ctx.user_id,
        consumed_at: ctx.consumed_at,
        food_id: Some(food.id),
        food_name: food.name.clone(),
        amount_g: grams,
        meal_type: ctx.meal_type,
        note: ctx.note,
        nutrients,
    })
}

/// Direct values are already per consumed amount; they are only rounded.
pub fn direct_profile(n: &DirectNutrients) -> NutrientProfile {
    NutrientProfile {
        calories: Some(round3(n.calories)),
        protein_g: Some(round3(n.protein_g)),
        total_fat_g: Some(round3(n.total_fat_g)),
        carbohydrates_g: Some(round3(n.carbohydrates_g)),
        caffeine_mg: n.caffeine_mg.map(round3),
        ethyl_alcohol_g: n.ethyl_alcohol_g.map(round3),
        ..Default::default()
    }
}

pub fn assemble_direct(ctx: LogContext, n: &DirectNutrients, grams: f64) -> ConsumptionLogEntry {
    ConsumptionLogEntry {
        user_id: ctx.user_id,
        consumed_at: ctx.consumed_at,
        food_id: None,
        food_name: n.product_name.clone(),
        amount_g: grams,
        meal_type: ctx.meal_type,
        note: ctx.note,
        nutrients: Some(direct_profile(n)),
    }
}
