mod dto;
pub mod handlers;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub use dto::{RankedFoodMatch, ResolveFoodRequest, ResolveFoodResponse};

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::search_routes())
}
