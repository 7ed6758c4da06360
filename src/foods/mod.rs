mod catalog;
mod dto;
pub mod handlers;
#[cfg(test)]
pub(crate) mod memory;
mod repo;
pub mod repo_types;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub use catalog::FoodCatalog;
pub use dto::{AddFoodRequest, AddFoodResponse};
pub use repo::PgCatalog;
pub use repo_types::{
    ConsumptionLogEntry, Food, FoodComponent, FoodFilter, FoodStats, FoodType, NewFood,
};

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::food_routes())
}
