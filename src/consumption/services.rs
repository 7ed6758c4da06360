use tracing::{debug, error, info};
use uuid::Uuid;

use super::amount::resolve_grams;
use super::assemble::{assemble_direct, assemble_food, LogContext};
use super::classify::{classify_request, ClassifiedItem};
use super::dto::{AddedItem, LogFoodRequest, LogFoodResponse, NotFoundItem};
use super::error::{ItemError, LogFoodError};
use super::resolve::{resolve_batch, Resolution};
use crate::foods::{ConsumptionLogEntry, FoodCatalog};
use crate::state::AppState;

enum Outcome {
    Added(AddedItem),
    NotFound(NotFoundItem),
}

/// Logs a batch of consumed items.
///
/// Every item is validated before the catalog is touched. Not-found and
/// ambiguous references are reported in the response. A processing failure
/// stops the batch; entries written before it are not rolled back.
pub async fn log_food(
    st: &AppState,
    user_id: Uuid,
    req: &LogFoodRequest,
) -> Result<LogFoodResponse, LogFoodError> {
    let catalog = st.catalog.as_ref();
    let items = classify_request(req)?;
    let resolutions = resolve_batch(catalog, &items, st.config.barcode_policy).await?;

    let mut added_items = Vec::new();
    let mut not_found_items = Vec::new();

    for (ci, resolution) in items.iter().zip(resolutions) {
        match process_item(catalog, user_id, ci, resolution).await {
            Ok(Outcome::Added(item)) => added_items.push(item),
            Ok(Outcome::NotFound(item)) => {
                debug!(item = ci.index, reason = ?item.reason, "item needs clarification");
                not_found_items.push(item);
            }
            Err(source) => {
                let persisted = added_items.len();
                error!(%user_id, item = ci.index, persisted, error = %source, "log_food aborted");
                return Err(LogFoodError::Item {
                    index: ci.index,
                    persisted,
                    source,
                });
            }
        }
    }

    info!(
        %user_id,
        added = added_items.len(),
        not_found = not_found_items.len(),
        "consumption logged"
    );
    let message = summary(added_items.len(), not_found_items.len());
    Ok(LogFoodResponse {
        added_items,
        not_found_items,
        message,
    })
}

async fn process_item(
    catalog: &dyn FoodCatalog,
    user_id: Uuid,
    ci: &ClassifiedItem<'_>,
    resolution: Resolution<'_>,
) -> Result<Outcome, ItemError> {
    let ctx = LogContext::for_item(user_id, ci.item);
    let (entry, food) = match resolution {
        Resolution::NotFound(item) => return Ok(Outcome::NotFound(item)),
        Resolution::Found(food) => {
            let grams = resolve_grams(&food, ci.amount)?;
            let entry = assemble_food(ctx, &food, grams, false)?;
            (entry, Some(food))
        }
        Resolution::Direct(nutrients) => (assemble_direct(ctx, nutrients, ci.item.amount_g), None),
    };

    persist(catalog, &entry).await?;
    Ok(Outcome::Added(AddedItem { entry, food }))
}

pub(crate) async fn persist(
    catalog: &dyn FoodCatalog,
    entry: &ConsumptionLogEntry,
) -> Result<(), ItemError> {
    catalog
        .add_consumption_log(entry)
        .await
        .map_err(ItemError::Store)?;
    debug!(food_id = ?entry.food_id, food = %entry.food_name, grams = entry.amount_g, "entry saved");
    Ok(())
}

fn summary(added: usize, not_found: usize) -> String {
    if not_found == 0 {
        format!("Successfully logged {} food consumption item(s)", added)
    } else {
        format!(
            "Logged {} item(s), {} item(s) not found and require clarification",
            added, not_found
        )
    }
}
