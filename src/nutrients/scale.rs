use super::profile::{NutrientProfile, FLOAT_FIELDS, INT_FIELDS};

/// Rounds half away from zero to 3 decimal places.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Scales a per-100 g profile to `amount_g` grams.
///
/// Float fields are rounded to 3 decimals, integer fields to the nearest
/// integer, saturating at the `i64` bounds. Absent fields stay absent.
pub fn scale(base: &NutrientProfile, amount_g: f64) -> NutrientProfile {
    let ratio = amount_g / 100.0;
    let mut scaled = NutrientProfile::default();

    for field in FLOAT_FIELDS {
        if let Some(value) = (field.get)(base) {
            (field.set)(&mut scaled, Some(round3(value * ratio)));
        }
    }
    for field in INT_FIELDS {
        if let Some(value) = (field.get)(base) {
            (field.set)(&mut scaled, Some((value as f64 * ratio).round() as i64));
        }
    }

    scaled
}

/// Adds `component` scaled to `amount_g` into `total`, field by field.
///
/// A field missing on the component leaves the total untouched; a field
/// missing on the total takes the component value as is.
pub fn accumulate(total: &mut NutrientProfile, component: &NutrientProfile, amount_g: f64) {
    let scaled = scale(component, amount_g);

    for field in FLOAT_FIELDS {
        let Some(part) = (field.get)(&scaled) else {
            continue;
        };
        let sum = match (field.get)(total) {
            Some(current) => round3(current + part),
            None => part,
        };
        (field.set)(total, Some(sum));
    }
    for field in INT_FIELDS {
        let Some(part) = (field.get)(&scaled) else {
            continue;
        };
        let sum = (field.get)(total).map_or(part, |current| current.saturating_add(part));
        (field.set)(total, Some(sum));
    }
}
