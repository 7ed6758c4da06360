use std::collections::HashMap;

use tracing::{debug, warn};

use super::dto::{RankedFoodMatch, ResolveFoodRequest, ResolveFoodResponse};
use crate::foods::services::search_by_name;
use crate::foods::FoodCatalog;

pub const MAX_NAME_VARIANTS: usize = 5;

fn validate(variants: &[String]) -> Result<(), &'static str> {
    if variants.is_empty() {
        return Err("name_variants cannot be empty");
    }
    if variants.len() > MAX_NAME_VARIANTS {
        return Err("maximum 5 name variants allowed");
    }
    if variants.iter().any(|v| v.is_empty()) {
        return Err("name variants cannot be empty");
    }
    Ok(())
}

/// Searches every variant and ranks foods by how many variants matched them.
/// Repeated variants count again.
pub async fn rank_by_name_variants(
    catalog: &dyn FoodCatalog,
    variants: &[String],
) -> anyhow::Result<Vec<RankedFoodMatch>> {
    let mut ranked: HashMap<i64, RankedFoodMatch> = HashMap::new();

    for variant in variants {
        let found = search_by_name(catalog, variant).await?;
        debug!(%variant, matches = found.len(), "variant searched");
        for food in found {
            ranked
                .entry(food.id)
                .or_insert_with(|| RankedFoodMatch {
                    id: food.id,
                    name: food.name,
                    serving_name: food.serving_name,
                    match_count: 0,
                })
                .match_count += 1;
        }
    }

    let mut foods: Vec<RankedFoodMatch> = ranked.into_values().collect();
    foods.sort_by(|a, b| b.match_count.cmp(&a.match_count).then_with(|| a.id.cmp(&b.id)));
    Ok(foods)
}

/// Validation and search failures are reported in the response body.
pub async fn resolve_food(catalog: &dyn FoodCatalog, req: &ResolveFoodRequest) -> ResolveFoodResponse {
    if let Err(msg) = validate(&req.name_variants) {
        return ResolveFoodResponse::error(msg);
    }

    match rank_by_name_variants(catalog, &req.name_variants).await {
        Ok(foods) => ResolveFoodResponse { foods, error: None },
        Err(e) => {
            warn!(error = %e, "name variant search failed");
            ResolveFoodResponse::error(format!("search failed: {e}"))
        }
    }
}
