use super::classify::AmountSpec;
use super::error::ItemError;
use crate::foods::Food;

/// Grams actually consumed. Servings need the food's serving size.
pub fn resolve_grams(food: &Food, amount: AmountSpec) -> Result<f64, ItemError> {
    match amount {
        AmountSpec::Grams(grams) => Ok(grams),
        AmountSpec::Servings(count) => food
            .serving_size_g
            .map(|size| count * size)
            .ok_or_else(|| ItemError::MissingServingSize {
                food: food.name.clone(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foods::memory::food;

    #[test]
    fn grams_pass_through() {
        let f = food(1, "rice");
        assert_eq!(resolve_grams(&f, AmountSpec::Grams(150.0)).unwrap(), 150.0);
    }

    #[test]
    fn servings_multiply_serving_size() {
        let mut f = food(1, "cookie");
        f.serving_size_g = Some(30.0);
        assert_eq!(resolve_grams(&f, AmountSpec::Servings(2.0)).unwrap(), 60.0);
    }

    #[test]
    fn servings_without_serving_size_fail() {
        let err = resolve_grams(&food(1, "soup"), AmountSpec::Servings(1.5)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "food 'soup' has no serving_size_g defined, cannot use serving_count"
        );
    }
}
