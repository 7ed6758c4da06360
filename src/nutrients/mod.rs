mod profile;
mod scale;

pub use profile::NutrientProfile;
pub use scale::{accumulate, round3, scale};
