use axum::{extract::State, routing::post, Json, Router};
use tracing::instrument;

use super::dto::{ResolveFoodRequest, ResolveFoodResponse};
use super::services::resolve_food;
use crate::{extractors::CallerId, state::AppState};

pub fn search_routes() -> Router<AppState> {
    Router::new().route("/foods/resolve", post(resolve))
}

#[instrument(skip(state, body))]
pub async fn resolve(
    State(state): State<AppState>,
    CallerId(_user_id): CallerId,
    Json(body): Json<ResolveFoodRequest>,
) -> Json<ResolveFoodResponse> {
    Json(resolve_food(state.catalog.as_ref(), &body).await)
}
