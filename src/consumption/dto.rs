use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::foods::{ConsumptionLogEntry, Food, FoodStats};

/// One consumed item. Exactly one of `food_id`, `name`, `barcode`,
/// `direct_nutrients` selects the resolution scenario.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConsumedItem {
    #[serde(default)]
    pub food_id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub direct_nutrients: Option<DirectNutrients>,

    #[serde(default)]
    pub amount_g: f64,
    #[serde(default)]
    pub serving_count: Option<f64>,
    #[serde(default)]
    pub meal_type: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub consumed_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub note: Option<String>,
}

/// Nutrients already scaled to the consumed amount.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DirectNutrients {
    pub calories: f64,
    pub protein_g: f64,
    pub total_fat_g: f64,
    pub carbohydrates_g: f64,
    #[serde(default)]
    pub caffeine_mg: Option<f64>,
    #[serde(default)]
    pub ethyl_alcohol_g: Option<f64>,
    pub product_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogFoodRequest {
    pub consumed_items: Vec<ConsumedItem>,
}

#[derive(Debug, Serialize)]
pub struct LogFoodResponse {
    pub added_items: Vec<AddedItem>,
    pub not_found_items: Vec<NotFoundItem>,
    pub message: String,
}

/// A persisted entry plus, for catalog lookups, the food it resolved to.
#[derive(Debug, Clone, Serialize)]
pub struct AddedItem {
    #[serde(flatten)]
    pub entry: ConsumptionLogEntry,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub food: Option<Food>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotFoundReason {
    IdNotFound,
    NameNotFound,
    BarcodeNotFound,
    MultipleMatches,
    InvalidScenario,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotFoundItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub food_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    pub amount_g: f64,
    pub reason: NotFoundReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<FoodMatch>>,
}

/// Suggestion for an ambiguous reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoodMatch {
    pub id: i64,
    pub name: String,
}

impl From<&Food> for FoodMatch {
    fn from(food: &Food) -> Self {
        Self {
            id: food.id,
            name: food.name.clone(),
        }
    }
}

/// Amount and metadata shared by the single-reference requests.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogDetails {
    #[serde(default)]
    pub amount_g: f64,
    #[serde(default)]
    pub serving_count: f64,
    #[serde(default)]
    pub meal_type: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub consumed_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogFoodByIdRequest {
    pub food_id: i64,
    #[serde(flatten)]
    pub details: LogDetails,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogFoodByNameRequest {
    pub name: String,
    #[serde(flatten)]
    pub details: LogDetails,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogFoodByBarcodeRequest {
    pub barcode: String,
    #[serde(flatten)]
    pub details: LogDetails,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogCustomFoodRequest {
    pub product_name: String,
    pub amount_g: f64,
    pub calories: f64,
    pub protein_g: f64,
    pub total_fat_g: f64,
    pub carbohydrates_g: f64,
    #[serde(default)]
    pub caffeine_mg: Option<f64>,
    #[serde(default)]
    pub ethyl_alcohol_g: Option<f64>,
    #[serde(default)]
    pub meal_type: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub consumed_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub note: Option<String>,
}

/// In-band result of a single-reference call.
#[derive(Debug, Default, Serialize)]
pub struct LogResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<FoodMatch>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl LogResult {
    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            error: Some(msg.into()),
            ..Default::default()
        }
    }

    pub fn message(msg: impl Into<String>) -> Self {
        Self {
            message: Some(msg.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}
fn default_limit() -> i64 { 20 }

impl Pagination {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.limit < 0 || self.offset < 0 {
            return Err("limit and offset must be non-negative");
        }
        Ok(())
    }
}

/// Macro and weight totals over a period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutritionStats {
    #[serde(with = "time::serde::rfc3339")]
    pub period_start: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub period_end: OffsetDateTime,
    pub total_calories: f64,
    pub total_protein: f64,
    pub total_fat: f64,
    pub total_carbs: f64,
    pub total_weight: f64,
}

#[derive(Debug, Serialize)]
pub struct NutritionStatsResponse {
    pub last_meal: Option<NutritionStats>,
    pub last_4_days: Vec<NutritionStats>,
}

#[derive(Debug, Serialize)]
pub struct TopProductsResponse {
    pub products: Vec<FoodStats>,
}
