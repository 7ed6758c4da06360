use tracing::{debug, info};

use super::catalog::FoodCatalog;
use super::dto::{AddFoodRequest, AddFoodResponse};
use super::repo_types::{Food, FoodComponent, FoodFilter, FoodType, NewFood};
use crate::nutrients::{accumulate, NutrientProfile};
use crate::state::AppState;

#[derive(Debug, thiserror::Error)]
pub enum AddFoodError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("duplicate food found: {0}")]
    Duplicate(String),
    #[error("component food {0} not found")]
    ComponentNotFound(i64),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Case-insensitive substring search on food names.
pub async fn search_by_name(catalog: &dyn FoodCatalog, name: &str) -> anyhow::Result<Vec<Food>> {
    catalog.search_food(&FoodFilter::by_name(name)).await
}

pub async fn add_food(st: &AppState, req: AddFoodRequest) -> Result<AddFoodResponse, AddFoodError> {
    let catalog = st.catalog.as_ref();
    let mut food = validate(req)?;

    check_duplicates(catalog, &food.name, food.barcode.as_deref()).await?;

    if food.nutrients.is_none() && !food.food_composition.is_empty() {
        food.nutrients = composition_nutrients(catalog, &food.food_composition).await?;
    }

    let name = food.name.clone();
    let id = catalog.add_food(food).await?;
    info!(food_id = id, name = %name, "food added");

    Ok(AddFoodResponse {
        id,
        message: format!("Food '{}' added successfully with ID {}", name, id),
    })
}

fn validate(req: AddFoodRequest) -> Result<NewFood, AddFoodError> {
    if req.name.trim().is_empty() {
        return Err(AddFoodError::Validation("name is required".into()));
    }
    let food_type: FoodType = req.food_type.parse().map_err(|_| {
        AddFoodError::Validation("food_type must be one of: component, product, dish".into())
    })?;
    let serving_size_g = match req.serving_size_g {
        Some(v) if v < 0.0 => {
            return Err(AddFoodError::Validation("serving_size_g must be positive".into()))
        }
        Some(v) if v == 0.0 => None,
        other => other,
    };
    if req.food_composition.iter().any(|c| c.amount_g <= 0.0) {
        return Err(AddFoodError::Validation(
            "food_composition amount_g must be positive".into(),
        ));
    }

    Ok(NewFood {
        name: req.name,
        description: req.description.filter(|s| !s.is_empty()),
        barcode: req.barcode.filter(|s| !s.is_empty()),
        food_type,
        serving_size_g,
        serving_name: req.serving_name.filter(|s| !s.is_empty()),
        nutrients: req.nutrients,
        food_composition: req.food_composition,
    })
}

async fn check_duplicates(
    catalog: &dyn FoodCatalog,
    name: &str,
    barcode: Option<&str>,
) -> Result<(), AddFoodError> {
    let wanted = name.to_lowercase();
    let same_name = search_by_name(catalog, name)
        .await?
        .into_iter()
        .find(|f| f.name.to_lowercase() == wanted);
    if let Some(existing) = same_name {
        return Err(AddFoodError::Duplicate(format!(
            "food with name '{}' already exists (ID: {})",
            existing.name, existing.id
        )));
    }

    if let Some(barcode) = barcode {
        let found = catalog.search_food(&FoodFilter::by_barcode(barcode)).await?;
        if let Some(existing) = found.first() {
            return Err(AddFoodError::Duplicate(format!(
                "food with barcode '{}' already exists: '{}' (ID: {})",
                barcode, existing.name, existing.id
            )));
        }
    }

    Ok(())
}

/// Sums the scaled nutrients of every component that has a profile.
/// Returns `None` when no component contributed.
pub async fn composition_nutrients(
    catalog: &dyn FoodCatalog,
    composition: &[FoodComponent],
) -> Result<Option<NutrientProfile>, AddFoodError> {
    let mut total = NutrientProfile::default();
    let mut contributed = false;

    for component in composition {
        let food = catalog
            .get_food(component.food_id)
            .await?
            .ok_or(AddFoodError::ComponentNotFound(component.food_id))?;

        let Some(nutrients) = food.nutrients.as_ref() else {
            debug!(food_id = food.id, "component has no nutrients; skipped");
            continue;
        };
        accumulate(&mut total, nutrients, component.amount_g);
        contributed = true;
    }

    Ok(contributed.then_some(total))
}
