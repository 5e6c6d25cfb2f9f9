use axum::http::StatusCode;
use axum::Router;
use axum_test::TestServer;
use emmaus::{config, modules, AppState};
use serde_json::json;

// Validation-layer tests: every request here is rejected before any upstream
// or store traffic, so no live MongoDB or API key is needed.
async fn setup_test_server() -> TestServer {
    dotenvy::dotenv().ok();

    let db = config::database::connect().await;
    let llm = config::llm::LlmConfig::from_env();

    let state = AppState { db, llm };

    let app = Router::new()
        .merge(modules::journey::routes::routes())
        .merge(modules::reflection::routes::routes())
        .with_state(state);

    TestServer::new(app).unwrap()
}

const VALID_OID: &str = "0123456789abcdef01234567";

#[tokio::test]
async fn test_create_journey_empty_goal_fails() {
    let server = setup_test_server().await;

    let response = server
        .post("/api/journeys")
        .json(&json!({
            "user_id": "user-1",
            "goal": "",
            "maturity_level": "Beginner"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_journey_empty_user_id_fails() {
    let server = setup_test_server().await;

    let response = server
        .post("/api/journeys")
        .json(&json!({
            "user_id": "",
            "goal": "growing in patience",
            "maturity_level": "Beginner"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_journey_empty_maturity_level_fails() {
    let server = setup_test_server().await;

    let response = server
        .post("/api/journeys")
        .json(&json!({
            "user_id": "user-1",
            "goal": "growing in patience",
            "maturity_level": ""
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_journey_invalid_id_fails() {
    let server = setup_test_server().await;

    let response = server.get("/api/journeys/not-an-id").await;

    response.assert_status(StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "Invalid ID format");
}

#[tokio::test]
async fn test_daily_verse_invalid_id_fails() {
    let server = setup_test_server().await;

    let response = server.get("/api/journeys/not-an-id/days/0").await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_feedback_rating_out_of_range_fails() {
    let server = setup_test_server().await;

    for rating in [0, 6, 9] {
        let response = server
            .post(&format!("/api/journeys/{}/days/0/feedback", VALID_OID))
            .json(&json!({ "rating": rating }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_feedback_invalid_id_fails() {
    let server = setup_test_server().await;

    let response = server
        .post("/api/journeys/not-an-id/days/0/feedback")
        .json(&json!({ "rating": 4 }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_complete_day_invalid_id_fails() {
    let server = setup_test_server().await;

    let response = server
        .post("/api/journeys/not-an-id/days/2/complete")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_journey_invalid_id_fails() {
    let server = setup_test_server().await;

    let response = server.delete("/api/journeys/not-an-id").await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reflection_empty_question_fails() {
    let server = setup_test_server().await;

    let response = server
        .post("/api/reflections/ask")
        .json(&json!({
            "journey_id": VALID_OID,
            "day_index": 0,
            "question": ""
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reflection_invalid_journey_id_fails() {
    let server = setup_test_server().await;

    let response = server
        .post("/api/reflections/ask")
        .json(&json!({
            "journey_id": "not-an-id",
            "day_index": 0,
            "question": "What does this mean?"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reflection_thread_invalid_id_fails() {
    let server = setup_test_server().await;

    let response = server.get("/api/reflections/not-an-id/0").await;

    response.assert_status(StatusCode::BAD_REQUEST);
}
