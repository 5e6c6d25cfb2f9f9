use axum::{
    routing::{get, post},
    Router,
};

use crate::modules::reflection::controller;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/reflections/ask", post(controller::ask))
        .route(
            "/api/reflections/{journey_id}/{day_index}",
            get(controller::get_thread),
        )
}
