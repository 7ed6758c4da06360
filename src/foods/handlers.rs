use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, instrument, warn};

use super::dto::{AddFoodRequest, AddFoodResponse};
use super::repo_types::Food;
use super::services::{add_food, AddFoodError};
use crate::{extractors::CallerId, state::AppState};

pub fn food_routes() -> Router<AppState> {
    Router::new()
        .route("/foods", post(create_food))
        .route("/foods/:id", get(get_food))
}

#[instrument(skip(state, body))]
pub async fn create_food(
    State(state): State<AppState>,
    CallerId(_user_id): CallerId,
    Json(body): Json<AddFoodRequest>,
) -> Result<(StatusCode, Json<AddFoodResponse>), (StatusCode, String)> {
    match add_food(&state, body).await {
        Ok(resp) => Ok((StatusCode::CREATED, Json(resp))),
        Err(e) => {
            let status = status_for(&e);
            if status.is_server_error() {
                error!(error = %e, "add_food failed");
            } else {
                warn!(error = %e, "add_food rejected");
            }
            Err((status, e.to_string()))
        }
    }
}

#[instrument(skip(state))]
pub async fn get_food(
    State(state): State<AppState>,
    CallerId(_user_id): CallerId,
    Path(id): Path<i64>,
) -> Result<Json<Food>, (StatusCode, String)> {
    match state.catalog.get_food(id).await {
        Ok(Some(food)) => Ok(Json(food)),
        Ok(None) => Err((StatusCode::NOT_FOUND, "Food not found".into())),
        Err(e) => {
            error!(error = %e, %id, "get_food failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

fn status_for(e: &AddFoodError) -> StatusCode {
    match e {
        AddFoodError::Validation(_) => StatusCode::BAD_REQUEST,
        AddFoodError::Duplicate(_) => StatusCode::CONFLICT,
        AddFoodError::ComponentNotFound(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AddFoodError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
