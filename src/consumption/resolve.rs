use std::collections::HashMap;
use std::str::FromStr;

use tracing::{debug, warn};

use super::classify::{ClassifiedItem, Scenario};
use super::dto::{DirectNutrients, FoodMatch, NotFoundItem, NotFoundReason};
use super::error::LogFoodError;
use crate::foods::{Food, FoodCatalog, FoodFilter};

/// Maximum number of suggestions returned for an ambiguous reference.
pub const MAX_SUGGESTIONS: usize = 2;

/// What to do when a barcode matches more than one catalog food.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BarcodePolicy {
    /// Take the first row in catalog order.
    #[default]
    FirstMatch,
    /// Treat several rows like an ambiguous name.
    RequireUnique,
}

impl FromStr for BarcodePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first_match" => Ok(BarcodePolicy::FirstMatch),
            "require_unique" => Ok(BarcodePolicy::RequireUnique),
            other => anyhow::bail!("unknown barcode policy '{}'", other),
        }
    }
}

/// Outcome of resolving one classified item.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<'a> {
    Found(Food),
    NotFound(NotFoundItem),
    Direct(&'a DirectNutrients),
}

/// The reference a set of catalog matches was looked up by.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<'a> {
    Id(i64),
    Name(&'a str),
    Barcode(&'a str),
}

impl Lookup<'_> {
    fn not_found(self, amount_g: f64, reason: NotFoundReason) -> NotFoundItem {
        let mut item = NotFoundItem {
            food_id: None,
            name: None,
            barcode: None,
            amount_g,
            reason,
            suggestions: None,
        };
        match self {
            Lookup::Id(id) => item.food_id = Some(id),
            Lookup::Name(name) => item.name = Some(name.to_string()),
            Lookup::Barcode(barcode) => item.barcode = Some(barcode.to_string()),
        }
        item
    }

    fn missing_reason(self) -> NotFoundReason {
        match self {
            Lookup::Id(_) => NotFoundReason::IdNotFound,
            Lookup::Name(_) => NotFoundReason::NameNotFound,
            Lookup::Barcode(_) => NotFoundReason::BarcodeNotFound,
        }
    }
}

/// First [`MAX_SUGGESTIONS`] matches, in catalog order.
fn suggestions(matches: &[Food]) -> Vec<FoodMatch> {
    matches.iter().take(MAX_SUGGESTIONS).map(FoodMatch::from).collect()
}

/// Turns the catalog matches for one reference into a resolution:
/// none is not found, one is found, more is ambiguous.
pub fn interpret_matches(lookup: Lookup<'_>, amount_g: f64, matches: Vec<Food>) -> Resolution<'static> {
    if matches.len() > 1 {
        let mut item = lookup.not_found(amount_g, NotFoundReason::MultipleMatches);
        item.suggestions = Some(suggestions(&matches));
        return Resolution::NotFound(item);
    }
    match matches.into_iter().next() {
        Some(food) => Resolution::Found(food),
        None => Resolution::NotFound(lookup.not_found(amount_g, lookup.missing_reason())),
    }
}

/// Applies the barcode policy, then the usual match interpretation.
pub fn interpret_barcode_matches(
    policy: BarcodePolicy,
    barcode: &str,
    amount_g: f64,
    mut matches: Vec<Food>,
) -> Resolution<'static> {
    if policy == BarcodePolicy::FirstMatch && matches.len() > 1 {
        warn!(%barcode, matches = matches.len(), "barcode matches several foods, taking the first");
        matches.truncate(1);
    }
    interpret_matches(Lookup::Barcode(barcode), amount_g, matches)
}

fn store_error(operation: String, source: anyhow::Error) -> LogFoodError {
    LogFoodError::Store { operation, source }
}

async fn fetch_by_ids(
    catalog: &dyn FoodCatalog,
    items: &[ClassifiedItem<'_>],
) -> Result<HashMap<i64, Food>, LogFoodError> {
    let mut ids: Vec<i64> = items
        .iter()
        .filter_map(|ci| match ci.scenario {
            Scenario::ById(id) => Some(id),
            _ => None,
        })
        .collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    ids.sort_unstable();
    ids.dedup();

    let found = catalog
        .search_food(&FoodFilter::by_ids(ids))
        .await
        .map_err(|e| store_error("food id lookup".into(), e))?;
    Ok(found.into_iter().map(|f| (f.id, f)).collect())
}

/// Resolves every item against the catalog. All ids go out in a single query,
/// each distinct name is searched once, and each barcode item is searched on
/// its own. The result has one entry per item, in request order.
pub async fn resolve_batch<'a>(
    catalog: &dyn FoodCatalog,
    items: &[ClassifiedItem<'a>],
    policy: BarcodePolicy,
) -> Result<Vec<Resolution<'a>>, LogFoodError> {
    let by_id = fetch_by_ids(catalog, items).await?;
    let mut by_name: HashMap<&str, Vec<Food>> = HashMap::new();
    let mut resolved = Vec::with_capacity(items.len());

    for ci in items {
        let amount_g = ci.item.amount_g;
        let resolution = match ci.scenario {
            Scenario::ById(id) => {
                let matches = by_id.get(&id).cloned().into_iter().collect();
                interpret_matches(Lookup::Id(id), amount_g, matches)
            }
            Scenario::ByName(name) => {
                let matches = match by_name.get(name) {
                    Some(cached) => cached.clone(),
                    None => {
                        let found = catalog
                            .search_food(&FoodFilter::by_name(name))
                            .await
                            .map_err(|e| store_error(format!("item {}: name search", ci.index), e))?;
                        by_name.insert(name, found.clone());
                        found
                    }
                };
                interpret_matches(Lookup::Name(name), amount_g, matches)
            }
            Scenario::ByBarcode(barcode) => {
                let found = catalog
                    .search_food(&FoodFilter::by_barcode(barcode))
                    .await
                    .map_err(|e| store_error(format!("item {}: barcode search", ci.index), e))?;
                interpret_barcode_matches(policy, barcode, amount_g, found)
            }
            Scenario::Direct(nutrients) => Resolution::Direct(nutrients),
        };
        resolved.push(resolution);
    }

    debug!(
        items = items.len(),
        id_lookups = by_id.len(),
        name_searches = by_name.len(),
        "batch resolved"
    );
    Ok(resolved)
}
