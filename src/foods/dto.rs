use serde::{Deserialize, Serialize};

use super::repo_types::FoodComponent;
use crate::nutrients::NutrientProfile;

#[derive(Debug, Clone, Deserialize)]
pub struct AddFoodRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
    pub food_type: String,
    #[serde(default)]
    pub serving_size_g: Option<f64>,
    #[serde(default)]
    pub serving_name: Option<String>,
    /// Per 100 g. Takes precedence over `food_composition`.
    #[serde(default)]
    pub nutrients: Option<NutrientProfile>,
    #[serde(default)]
    pub food_composition: Vec<FoodComponent>,
}

#[derive(Debug, Serialize)]
pub struct AddFoodResponse {
    pub id: i64,
    pub message: String,
}
