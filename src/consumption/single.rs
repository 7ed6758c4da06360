//! One-item entry points. Problems are reported in-band in [`LogResult`]
//! rather than as errors.

use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::amount::resolve_grams;
use super::assemble::{assemble_direct, assemble_food, LogContext};
use super::classify::AmountSpec;
use super::dto::{
    DirectNutrients, LogCustomFoodRequest, LogDetails, LogFoodByBarcodeRequest,
    LogFoodByIdRequest, LogFoodByNameRequest, LogResult, NotFoundReason,
};
use super::error::ItemError;
use super::resolve::{interpret_barcode_matches, interpret_matches, Lookup, Resolution};
use super::services::persist;
use crate::foods::services::search_by_name;
use crate::foods::{Food, FoodCatalog, FoodFilter};
use crate::state::AppState;

const NO_AMOUNT: &str = "either amount_g or serving_count must be greater than 0";

#[instrument(skip(st, req), fields(food_id = req.food_id))]
pub async fn log_food_by_id(st: &AppState, user_id: Uuid, req: &LogFoodByIdRequest) -> LogResult {
    if req.food_id <= 0 {
        return LogResult::error("food_id must be greater than 0");
    }
    let Some(amount) = AmountSpec::lenient(req.details.amount_g, req.details.serving_count) else {
        return LogResult::error(NO_AMOUNT);
    };

    let catalog = st.catalog.as_ref();
    match catalog.get_food(req.food_id).await {
        Ok(Some(food)) => log_resolved(catalog, user_id, &food, amount, &req.details).await,
        Ok(None) => LogResult::error("food not found"),
        Err(e) => {
            warn!(error = %e, "food lookup failed");
            LogResult::error(format!("search failed: {e}"))
        }
    }
}

#[instrument(skip(st, req), fields(name = %req.name))]
pub async fn log_food_by_name(
    st: &AppState,
    user_id: Uuid,
    req: &LogFoodByNameRequest,
) -> LogResult {
    if req.name.is_empty() {
        return LogResult::error("name cannot be empty");
    }
    let Some(amount) = AmountSpec::lenient(req.details.amount_g, req.details.serving_count) else {
        return LogResult::error(NO_AMOUNT);
    };

    let catalog = st.catalog.as_ref();
    let matches = match search_by_name(catalog, &req.name).await {
        Ok(found) => found,
        Err(e) => {
            warn!(error = %e, "name search failed");
            return LogResult::error(format!("search failed: {e}"));
        }
    };

    let resolution = interpret_matches(Lookup::Name(&req.name), req.details.amount_g, matches);
    log_resolution(catalog, user_id, resolution, amount, &req.details, "food not found").await
}

#[instrument(skip(st, req), fields(barcode = %req.barcode))]
pub async fn log_food_by_barcode(
    st: &AppState,
    user_id: Uuid,
    req: &LogFoodByBarcodeRequest,
) -> LogResult {
    if req.barcode.is_empty() {
        return LogResult::error("barcode cannot be empty");
    }
    let Some(amount) = AmountSpec::lenient(req.details.amount_g, req.details.serving_count) else {
        return LogResult::error(NO_AMOUNT);
    };

    let catalog = st.catalog.as_ref();
    let matches = match catalog.search_food(&FoodFilter::by_barcode(&req.barcode)).await {
        Ok(found) => found,
        Err(e) => {
            warn!(error = %e, "barcode search failed");
            return LogResult::error(format!("search failed: {e}"));
        }
    };

    let resolution = interpret_barcode_matches(
        st.config.barcode_policy,
        &req.barcode,
        req.details.amount_g,
        matches,
    );
    log_resolution(catalog, user_id, resolution, amount, &req.details, "barcode not found").await
}

#[instrument(skip(st, req), fields(product = %req.product_name))]
pub async fn log_custom_food(
    st: &AppState,
    user_id: Uuid,
    req: &LogCustomFoodRequest,
) -> LogResult {
    if req.product_name.is_empty() {
        return LogResult::error("product_name cannot be empty");
    }
    if req.amount_g <= 0.0 {
        return LogResult::error("amount_g must be greater than 0");
    }
    let required = [req.calories, req.protein_g, req.total_fat_g, req.carbohydrates_g];
    if required.iter().any(|v| *v < 0.0) {
        return LogResult::error("all required nutrients must be >= 0");
    }

    let nutrients = DirectNutrients {
        calories: req.calories,
        protein_g: req.protein_g,
        total_fat_g: req.total_fat_g,
        carbohydrates_g: req.carbohydrates_g,
        caffeine_mg: req.caffeine_mg.filter(|v| *v > 0.0),
        ethyl_alcohol_g: req.ethyl_alcohol_g.filter(|v| *v > 0.0),
        product_name: req.product_name.clone(),
    };
    let ctx = LogContext::new(
        user_id,
        req.consumed_at,
        req.meal_type.as_deref(),
        req.note.as_deref(),
    );
    let entry = assemble_direct(ctx, &nutrients, req.amount_g);

    match persist(st.catalog.as_ref(), &entry).await {
        Ok(()) => success(&entry.food_name, entry.amount_g),
        Err(e) => failure(e),
    }
}

async fn log_resolution(
    catalog: &dyn FoodCatalog,
    user_id: Uuid,
    resolution: Resolution<'_>,
    amount: AmountSpec,
    details: &LogDetails,
    not_found: &str,
) -> LogResult {
    match resolution {
        Resolution::Found(food) => log_resolved(catalog, user_id, &food, amount, details).await,
        Resolution::NotFound(item) if item.reason == NotFoundReason::MultipleMatches => LogResult {
            error: Some("multiple matches found".into()),
            suggestions: item.suggestions,
            message: None,
        },
        Resolution::NotFound(_) | Resolution::Direct(_) => LogResult::error(not_found),
    }
}

async fn log_resolved(
    catalog: &dyn FoodCatalog,
    user_id: Uuid,
    food: &Food,
    amount: AmountSpec,
    details: &LogDetails,
) -> LogResult {
    let result = async {
        let grams = resolve_grams(food, amount)?;
        let entry = assemble_food(LogContext::for_details(user_id, details), food, grams, true)?;
        persist(catalog, &entry).await?;
        Ok::<_, ItemError>(entry)
    }
    .await;

    match result {
        Ok(entry) => success(&entry.food_name, entry.amount_g),
        Err(e) => failure(e),
    }
}

fn success(food_name: &str, grams: f64) -> LogResult {
    info!(food = %food_name, grams, "consumption logged");
    LogResult::message(format!("Successfully logged {:.1}g of {}", grams, food_name))
}

fn failure(e: ItemError) -> LogResult {
    match e {
        ItemError::MissingServingSize { .. } => {
            LogResult::error("food has no serving size, amount_g is required")
        }
        ItemError::MissingNutrients { .. } => LogResult::error("food has no nutrients data"),
        ItemError::Store(_) => {
            warn!(error = %e, "consumption log not saved");
            LogResult::error(e.to_string())
        }
    }
}
