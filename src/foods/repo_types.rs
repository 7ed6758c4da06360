use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::nutrients::NutrientProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FoodType {
    Component,
    Product,
    Dish,
}

impl FoodType {
    pub fn as_str(self) -> &'static str {
        match self {
            FoodType::Component => "component",
            FoodType::Product => "product",
            FoodType::Dish => "dish",
        }
    }
}

impl FromStr for FoodType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "component" => Ok(FoodType::Component),
            "product" => Ok(FoodType::Product),
            "dish" => Ok(FoodType::Dish),
            other => anyhow::bail!("unknown food_type '{}'", other),
        }
    }
}

/// One ingredient of a composite dish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodComponent {
    pub food_id: i64,
    pub amount_g: f64,
}

/// Food catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Food {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    pub food_type: FoodType,
    pub is_archived: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serving_size_g: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serving_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nutrients: Option<NutrientProfile>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub food_composition: Vec<FoodComponent>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Food to be inserted; the catalog assigns id and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFood {
    pub name: String,
    pub description: Option<String>,
    pub barcode: Option<String>,
    pub food_type: FoodType,
    pub serving_size_g: Option<f64>,
    pub serving_name: Option<String>,
    pub nutrients: Option<NutrientProfile>,
    pub food_composition: Vec<FoodComponent>,
}

/// Catalog search filter. Set criteria are combined with AND; results are
/// ordered by name ascending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FoodFilter {
    pub ids: Vec<i64>,
    /// Case-insensitive substring match.
    pub name: Option<String>,
    /// Exact match.
    pub barcode: Option<String>,
}

impl FoodFilter {
    pub fn by_ids(ids: Vec<i64>) -> Self {
        Self {
            ids,
            ..Default::default()
        }
    }

    pub fn by_name(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    pub fn by_barcode(barcode: &str) -> Self {
        Self {
            barcode: Some(barcode.to_string()),
            ..Default::default()
        }
    }
}

/// Persisted consumption record. `food_name` is copied at write time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionLogEntry {
    pub user_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub consumed_at: OffsetDateTime,
    pub food_id: Option<i64>,
    pub food_name: String,
    pub amount_g: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meal_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub nutrients: Option<NutrientProfile>,
}

/// How often one catalog food was logged by a user.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct FoodStats {
    pub food_id: i64,
    pub food_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serving_name: Option<String>,
    pub log_count: i64,
}

#[derive(Debug, FromRow)]
pub struct FoodRow {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub barcode: Option<String>,
    pub food_type: String,
    pub is_archived: bool,
    pub serving_size_g: Option<f64>,
    pub serving_name: Option<String>,
    pub nutrients: Option<Json<NutrientProfile>>,
    pub food_composition: Option<Json<Vec<FoodComponent>>>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl TryFrom<FoodRow> for Food {
    type Error = anyhow::Error;

    fn try_from(r: FoodRow) -> Result<Self, Self::Error> {
        Ok(Self {
            food_type: r.food_type.parse()?,
            id: r.id,
            name: r.name,
            description: r.description,
            barcode: r.barcode,
            is_archived: r.is_archived,
            serving_size_g: r.serving_size_g,
            serving_name: r.serving_name,
            nutrients: r.nutrients.map(|Json(n)| n),
            food_composition: r.food_composition.map(|Json(c)| c).unwrap_or_default(),
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct ConsumptionLogRow {
    pub user_id: Uuid,
    pub consumed_at: OffsetDateTime,
    pub food_id: Option<i64>,
    pub food_name: String,
    pub amount_g: f64,
    pub meal_type: Option<String>,
    pub note: Option<String>,
    pub nutrients: Option<Json<NutrientProfile>>,
}

impl From<ConsumptionLogRow> for ConsumptionLogEntry {
    fn from(r: ConsumptionLogRow) -> Self {
        Self {
            user_id: r.user_id,
            consumed_at: r.consumed_at,
            food_id: r.food_id,
            food_name: r.food_name,
            amount_g: r.amount_g,
            meal_type: r.meal_type,
            note: r.note,
            nutrients: r.nutrients.map(|Json(n)| n),
        }
    }
}
