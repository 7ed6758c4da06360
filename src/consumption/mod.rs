mod amount;
mod assemble;
mod classify;
pub mod dto;
mod error;
pub mod handlers;
mod resolve;
pub mod services;
pub mod single;
pub mod stats;

use crate::state::AppState;
use axum::Router;

pub use error::{ItemError, LogFoodError};
pub use resolve::BarcodePolicy;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::consumption_routes())
}
