use super::dto::{ConsumedItem, DirectNutrients, LogFoodRequest};
use super::error::LogFoodError;

const SCENARIO_FIELDS: &str = "food_id, name, barcode, or direct_nutrients";

/// Resolution path of a consumed item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scenario<'a> {
    ById(i64),
    ByName(&'a str),
    ByBarcode(&'a str),
    Direct(&'a DirectNutrients),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AmountSpec {
    Grams(f64),
    Servings(f64),
}

impl AmountSpec {
    /// Exactly one of `amount_g > 0` and `serving_count > 0` must hold.
    pub fn strict(amount_g: f64, serving_count: Option<f64>) -> Result<Self, String> {
        let has_amount = amount_g > 0.0;
        let servings = serving_count.filter(|c| *c > 0.0);
        match (has_amount, servings) {
            (true, None) => Ok(AmountSpec::Grams(amount_g)),
            (false, Some(count)) => Ok(AmountSpec::Servings(count)),
            (false, None) => Err("must provide either amount_g > 0 or serving_count > 0".into()),
            (true, Some(_)) => {
                Err("cannot provide both amount_g and serving_count, use only one".into())
            }
        }
    }

    /// Grams win when positive; otherwise servings, if positive.
    pub fn lenient(amount_g: f64, serving_count: f64) -> Option<Self> {
        if amount_g > 0.0 {
            Some(AmountSpec::Grams(amount_g))
        } else if serving_count > 0.0 {
            Some(AmountSpec::Servings(serving_count))
        } else {
            None
        }
    }
}

/// A validated item, tagged with its position in the request.
#[derive(Debug, Clone)]
pub struct ClassifiedItem<'a> {
    pub index: usize,
    pub item: &'a ConsumedItem,
    pub scenario: Scenario<'a>,
    pub amount: AmountSpec,
}

pub fn classify(item: &ConsumedItem) -> Result<Scenario<'_>, String> {
    let name = item.name.as_deref().filter(|n| !n.is_empty());
    let barcode = item.barcode.as_deref().filter(|b| !b.is_empty());

    let mut present = Vec::with_capacity(1);
    if let Some(id) = item.food_id {
        present.push(Scenario::ById(id));
    }
    if let Some(name) = name {
        present.push(Scenario::ByName(name));
    }
    if let Some(barcode) = barcode {
        present.push(Scenario::ByBarcode(barcode));
    }
    if let Some(direct) = item.direct_nutrients.as_ref() {
        present.push(Scenario::Direct(direct));
    }

    match present.as_slice() {
        [] => Err(format!("must provide one of: {SCENARIO_FIELDS}")),
        [scenario] => Ok(*scenario),
        _ => Err(format!("must provide only one of: {SCENARIO_FIELDS}")),
    }
}

pub fn validate_direct_nutrients(n: &DirectNutrients) -> Result<(), String> {
    if n.product_name.is_empty() {
        return Err("product_name is required".into());
    }
    let required = [
        ("calories", n.calories),
        ("protein_g", n.protein_g),
        ("total_fat_g", n.total_fat_g),
        ("carbohydrates_g", n.carbohydrates_g),
    ];
    let optional = [("caffeine_mg", n.caffeine_mg), ("ethyl_alcohol_g", n.ethyl_alcohol_g)];

    let negative = required
        .into_iter()
        .chain(optional.into_iter().filter_map(|(k, v)| v.map(|v| (k, v))))
        .find(|(_, v)| *v < 0.0);
    match negative {
        Some((field, _)) => Err(format!("{field} must be non-negative")),
        None => Ok(()),
    }
}

fn classify_item(index: usize, item: &ConsumedItem) -> Result<ClassifiedItem<'_>, String> {
    let scenario = classify(item)?;
    let amount = AmountSpec::strict(item.amount_g, item.serving_count)?;

    if let Scenario::Direct(direct) = scenario {
        if matches!(amount, AmountSpec::Servings(_)) {
            return Err("direct_nutrients requires amount_g > 0, serving_count is not supported".into());
        }
        validate_direct_nutrients(direct).map_err(|e| format!("direct_nutrients: {e}"))?;
    }

    Ok(ClassifiedItem {
        index,
        item,
        scenario,
        amount,
    })
}

/// Validates every item before anything is resolved; the first failure
/// rejects the whole request.
pub fn classify_request(req: &LogFoodRequest) -> Result<Vec<ClassifiedItem<'_>>, LogFoodError> {
    if req.consumed_items.is_empty() {
        return Err(LogFoodError::Validation("consumed_items cannot be empty".into()));
    }

    req.consumed_items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            classify_item(i, item).map_err(|e| LogFoodError::Validation(format!("item {i}: {e}")))
        })
        .collect()
}
