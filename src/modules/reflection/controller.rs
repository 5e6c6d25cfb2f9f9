use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use bson::oid::ObjectId;
use validator::Validate;

use crate::modules::journey::crud::JourneyCrud;
use crate::modules::reflection::{
    crud::ReflectionCrud,
    model::{Exchange, ReflectionThread},
    schema::{
        AskReflectionRequest, ExchangeResponse, MessageResponse, ReflectionAnswerResponse,
        ThreadResponse,
    },
};
use crate::services::journey::JourneyGenerator;
use crate::AppState;

const CONTEXT_LIMIT: usize = 10;

fn to_exchange_response(e: &Exchange) -> ExchangeResponse {
    ExchangeResponse {
        question: e.question.clone(),
        answer: e.answer.clone(),
        timestamp: e.timestamp_rfc3339(),
    }
}

fn to_thread_response(t: &ReflectionThread) -> ThreadResponse {
    ThreadResponse {
        journey_id: t.journey_id.to_hex(),
        day_index: t.day_index,
        exchanges: t.exchanges.iter().map(to_exchange_response).collect(),
        exchange_count: t.exchanges.len(),
        created_at: t.created_at_rfc3339(),
        updated_at: t.updated_at_rfc3339(),
    }
}

pub async fn ask(
    State(state): State<AppState>,
    Json(payload): Json<AskReflectionRequest>,
) -> Result<Json<ReflectionAnswerResponse>, (StatusCode, Json<MessageResponse>)> {
    if let Err(e) = payload.validate() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(MessageResponse { message: e.to_string() }),
        ));
    }

    let journey_id = ObjectId::parse_str(&payload.journey_id).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(MessageResponse { message: "Invalid ID format".to_string() }),
        )
    })?;

    let journeys = JourneyCrud::new(&state.db);
    match journeys.find_by_id(&journey_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Err((
                StatusCode::NOT_FOUND,
                Json(MessageResponse { message: "Journey not found".to_string() }),
            ))
        }
        Err(e) => {
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(MessageResponse { message: e.to_string() }),
            ))
        }
    }

    let crud = ReflectionCrud::new(&state.db);
    let mut thread = crud
        .find_or_create(&journey_id, payload.day_index)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(MessageResponse { message: e.to_string() }),
            )
        })?;

    let prior: Vec<(String, String)> = thread
        .context_window(CONTEXT_LIMIT)
        .iter()
        .map(|e| (e.question.clone(), e.answer.clone()))
        .collect();

    let generator = JourneyGenerator::new(state.llm.clone()).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(MessageResponse { message: e.to_string() }),
        )
    })?;

    let answer = generator
        .ask_reflection(&prior, &payload.question)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(MessageResponse { message: e.to_string() }),
            )
        })?;

    let exchange = Exchange::new(payload.question.clone(), answer.clone());
    if let Some(id) = thread.id {
        crud.add_exchange(&id, &exchange).await.map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(MessageResponse { message: e.to_string() }),
            )
        })?;
    }
    thread.add_exchange(exchange);

    Ok(Json(ReflectionAnswerResponse {
        journey_id: payload.journey_id,
        day_index: payload.day_index,
        question: payload.question,
        answer,
        exchange_count: thread.exchanges.len(),
    }))
}

pub async fn get_thread(
    State(state): State<AppState>,
    Path((journey_id, day_index)): Path<(String, u32)>,
) -> Result<Json<ThreadResponse>, (StatusCode, Json<MessageResponse>)> {
    let journey_id = ObjectId::parse_str(&journey_id).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(MessageResponse { message: "Invalid ID format".to_string() }),
        )
    })?;

    let crud = ReflectionCrud::new(&state.db);

    match crud.find(&journey_id, day_index).await {
        Ok(Some(thread)) => Ok(Json(to_thread_response(&thread))),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(MessageResponse { message: "Reflection thread not found".to_string() }),
        )),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(MessageResponse { message: e.to_string() }),
        )),
    }
}
