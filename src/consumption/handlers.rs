use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{error, instrument, warn};

use super::dto::{
    LogCustomFoodRequest, LogFoodByBarcodeRequest, LogFoodByIdRequest, LogFoodByNameRequest,
    LogFoodRequest, LogFoodResponse, LogResult, NutritionStatsResponse, Pagination,
    TopProductsResponse,
};
use super::error::{ItemError, LogFoodError};
use super::{services, single, stats};
use crate::foods::ConsumptionLogEntry;
use crate::{extractors::CallerId, state::AppState};

// --- public routers ---

pub fn consumption_routes() -> Router<AppState> {
    Router::new()
        .route("/consumption/log", post(log_food).get(list_logs))
        .route("/consumption/log/by-id", post(log_by_id))
        .route("/consumption/log/by-name", post(log_by_name))
        .route("/consumption/log/by-barcode", post(log_by_barcode))
        .route("/consumption/log/custom", post(log_custom))
        .route("/consumption/stats", get(nutrition_stats))
        .route("/consumption/top-products", get(top_products))
}

// --- handlers ---

#[instrument(skip(state, body))]
pub async fn log_food(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
    Json(body): Json<LogFoodRequest>,
) -> Result<Json<LogFoodResponse>, (StatusCode, String)> {
    match services::log_food(&state, user_id, &body).await {
        Ok(resp) => Ok(Json(resp)),
        Err(e) => {
            let status = status_for(&e);
            if status.is_server_error() {
                error!(error = %e, %user_id, "log_food failed");
            } else {
                warn!(error = %e, %user_id, "log_food rejected");
            }
            Err((status, e.to_string()))
        }
    }
}

#[instrument(skip(state))]
pub async fn list_logs(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<ConsumptionLogEntry>>, (StatusCode, String)> {
    if let Err(msg) = p.validate() {
        warn!(%user_id, limit = p.limit, offset = p.offset, "list_logs rejected");
        return Err((StatusCode::BAD_REQUEST, msg.to_string()));
    }
    state
        .catalog
        .list_consumption_logs(user_id, p.limit, p.offset)
        .await
        .map(Json)
        .map_err(|e| {
            error!(error = %e, %user_id, "list_logs failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })
}

#[instrument(skip(state))]
pub async fn nutrition_stats(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
) -> Result<Json<NutritionStatsResponse>, (StatusCode, String)> {
    let now = OffsetDateTime::now_utc();
    stats::nutrition_stats(state.catalog.as_ref(), user_id, now, state.config.stats_utc_offset)
        .await
        .map(Json)
        .map_err(|e| {
            error!(error = %e, %user_id, "nutrition_stats failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })
}

#[instrument(skip(state))]
pub async fn top_products(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
) -> Result<Json<TopProductsResponse>, (StatusCode, String)> {
    stats::top_products(state.catalog.as_ref(), user_id, OffsetDateTime::now_utc())
        .await
        .map(|products| Json(TopProductsResponse { products }))
        .map_err(|e| {
            error!(error = %e, %user_id, "top_products failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })
}

#[instrument(skip(state, body))]
pub async fn log_by_id(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
    Json(body): Json<LogFoodByIdRequest>,
) -> Json<LogResult> {
    Json(single::log_food_by_id(&state, user_id, &body).await)
}

#[instrument(skip(state, body))]
pub async fn log_by_name(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
    Json(body): Json<LogFoodByNameRequest>,
) -> Json<LogResult> {
    Json(single::log_food_by_name(&state, user_id, &body).await)
}

#[instrument(skip(state, body))]
pub async fn log_by_barcode(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
    Json(body): Json<LogFoodByBarcodeRequest>,
) -> Json<LogResult> {
    Json(single::log_food_by_barcode(&state, user_id, &body).await)
}

#[instrument(skip(state, body))]
pub async fn log_custom(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
    Json(body): Json<LogCustomFoodRequest>,
) -> Json<LogResult> {
    Json(single::log_custom_food(&state, user_id, &body).await)
}

fn status_for(e: &LogFoodError) -> StatusCode {
    match e {
        LogFoodError::Validation(_) => StatusCode::BAD_REQUEST,
        LogFoodError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        LogFoodError::Item { source, .. } => match source {
            ItemError::MissingServingSize { .. } | ItemError::MissingNutrients { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ItemError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{body::Body, http::Request};
    use tower::ServiceExt;
    use uuid::Uuid;

    use time::Duration;

    use super::*;
    use crate::extractors::USER_ID_HEADER;
    use crate::foods::memory::{food, macros, InMemoryCatalog};
    use crate::foods::FoodCatalog;

    #[test]
    fn log_food_errors_map_to_statuses() {
        assert_eq!(
            status_for(&LogFoodError::Validation("x".into())),
            StatusCode::BAD_REQUEST
        );
        let item = |source| LogFoodError::Item { index: 0, persisted: 0, source };
        assert_eq!(
            status_for(&item(ItemError::MissingNutrients { food: "x".into() })),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(&item(ItemError::Store(anyhow::anyhow!("down")))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_for(&LogFoodError::Store {
                operation: "food id lookup".into(),
                source: anyhow::anyhow!("down"),
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    fn app() -> (Router, Arc<InMemoryCatalog>) {
        let mut apple = food(1, "apple");
        apple.nutrients = Some(macros(52.0, 0.3, 0.2, 14.0));
        let catalog = Arc::new(InMemoryCatalog::with_foods(vec![apple]));
        let router = consumption_routes().with_state(AppState::fake(catalog.clone()));
        (router, catalog)
    }

    fn post_json(uri: &str, user: Option<Uuid>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(user) = user {
            builder = builder.header(USER_ID_HEADER, user.to_string());
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get(uri: &str, user: Uuid) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(USER_ID_HEADER, user.to_string())
            .body(Body::empty())
            .unwrap()
    }

    async fn json_body(res: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    /// Logs `count` entries for `user`, named "<prefix> <i>", one minute apart
    /// starting `minutes_ago` minutes before now.
    async fn seed_logs(catalog: &InMemoryCatalog, user: Uuid, prefix: &str, count: usize, minutes_ago: i64) {
        let start = OffsetDateTime::now_utc() - Duration::minutes(minutes_ago);
        for i in 0..count {
            let entry = ConsumptionLogEntry {
                user_id: user,
                consumed_at: start + Duration::minutes(i as i64),
                food_id: Some(1),
                food_name: format!("{prefix} {i}"),
                amount_g: 100.0,
                meal_type: None,
                note: None,
                nutrients: Some(macros(52.0, 0.3, 0.2, 14.0)),
            };
            catalog.add_consumption_log(&entry).await.unwrap();
        }
    }

    fn names(json: &serde_json::Value) -> Vec<String> {
        json.as_array()
            .unwrap()
            .iter()
            .map(|e| e["food_name"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn batch_log_round_trip() {
        let (router, catalog) = app();
        let body = r#"{"consumed_items": [{"food_id": 1, "amount_g": 150}, {"name": "kiwi", "amount_g": 50}]}"#;

        let res = router
            .oneshot(post_json("/consumption/log", Some(Uuid::new_v4()), body))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["added_items"][0]["food_id"], 1);
        assert_eq!(json["added_items"][0]["nutrients"]["calories"], 78.0);
        assert_eq!(json["added_items"][0]["food"]["name"], "apple");
        assert_eq!(json["not_found_items"][0]["reason"], "name_not_found");
        assert_eq!(catalog.logs().len(), 1);
    }

    #[tokio::test]
    async fn invalid_batch_is_bad_request() {
        let (router, _) = app();
        let res = router
            .oneshot(post_json("/consumption/log", Some(Uuid::new_v4()), r#"{"consumed_items": []}"#))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn caller_header_is_required() {
        let (router, _) = app();
        let res = router
            .oneshot(post_json("/consumption/log/by-id", None, r#"{"food_id": 1, "amount_g": 10}"#))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn list_logs_is_newest_first_and_scoped_to_caller() {
        let (router, catalog) = app();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
        seed_logs(&catalog, alice, "alice", 3, 60).await;
        seed_logs(&catalog, bob, "bob", 2, 30).await;

        let res = router.clone().oneshot(get("/consumption/log", alice)).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(names(&json_body(res).await), vec!["alice 2", "alice 1", "alice 0"]);

        let res = router
            .oneshot(get("/consumption/log?limit=1&offset=1", alice))
            .await
            .unwrap();
        assert_eq!(names(&json_body(res).await), vec!["alice 1"]);
    }

    #[tokio::test]
    async fn list_logs_defaults_to_twenty() {
        let (router, catalog) = app();
        let user = Uuid::new_v4();
        seed_logs(&catalog, user, "meal", 25, 120).await;

        let res = router.clone().oneshot(get("/consumption/log", user)).await.unwrap();
        let listed = names(&json_body(res).await);
        assert_eq!(listed.len(), 20);
        assert_eq!(listed[0], "meal 24");
        assert_eq!(listed[19], "meal 5");

        let res = router
            .oneshot(get("/consumption/log?offset=20", user))
            .await
            .unwrap();
        assert_eq!(names(&json_body(res).await), vec!["meal 4", "meal 3", "meal 2", "meal 1", "meal 0"]);
    }

    #[tokio::test]
    async fn list_logs_rejects_negative_paging() {
        let (router, _) = app();
        let user = Uuid::new_v4();

        let res = router.clone().oneshot(get("/consumption/log?limit=-1", user)).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = router.oneshot(get("/consumption/log?offset=-5", user)).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn stats_and_top_products_for_caller() {
        let (router, catalog) = app();
        let user = Uuid::new_v4();
        seed_logs(&catalog, user, "apple", 2, 10).await;
        seed_logs(&catalog, Uuid::new_v4(), "other", 3, 10).await;

        let res = router.clone().oneshot(get("/consumption/stats", user)).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let json = json_body(res).await;
        assert_eq!(json["last_meal"]["total_calories"], 104.0);
        assert_eq!(json["last_meal"]["total_weight"], 200.0);
        assert!(!json["last_4_days"].as_array().unwrap().is_empty());

        let res = router.oneshot(get("/consumption/top-products", user)).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let json = json_body(res).await;
        assert_eq!(json["products"][0]["food_id"], 1);
        assert_eq!(json["products"][0]["food_name"], "apple");
        assert_eq!(json["products"][0]["log_count"], 2);
    }
}
