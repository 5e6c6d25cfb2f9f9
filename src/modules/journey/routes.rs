use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::modules::journey::controller;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/journeys", post(controller::create_journey))
        .route("/api/journeys", get(controller::list_journeys))
        .route("/api/journeys/{id}", get(controller::get_journey))
        .route("/api/journeys/{id}", delete(controller::delete_journey))
        .route("/api/journeys/{id}/days/{day_index}", get(controller::daily_verse))
        .route(
            "/api/journeys/{id}/days/{day_index}/feedback",
            post(controller::day_feedback),
        )
        .route(
            "/api/journeys/{id}/days/{day_index}/complete",
            post(controller::complete_day),
        )
}
