use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct ResolveFoodRequest {
    #[serde(default)]
    pub name_variants: Vec<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct ResolveFoodResponse {
    pub foods: Vec<RankedFoodMatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResolveFoodResponse {
    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            foods: Vec::new(),
            error: Some(msg.into()),
        }
    }
}

/// A food matched by at least one name variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedFoodMatch {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serving_name: Option<String>,
    pub match_count: usize,
}
