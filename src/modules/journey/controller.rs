use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use bson::oid::ObjectId;
use tracing::warn;
use validator::Validate;

use crate::modules::journey::{
    crud::JourneyCrud,
    model::{DayFeedback, JourneyDocument, SOURCE_FALLBACK, SOURCE_GENERATED},
    schema::{
        CompleteDayResponse, CreateJourneyRequest, DailyVerseResponse, DayFeedbackRequest,
        FeedbackResponse, JourneyListResponse, JourneyResponse, JourneySummary,
        ListJourneysQuery, MessageResponse,
    },
};
use crate::modules::reflection::crud::ReflectionCrud;
use crate::services::journey::{mock_journey, JourneyGenerator};
use crate::AppState;

const FALLBACK_JOURNEY_DAYS: usize = 7;
const LIST_LIMIT: i64 = 50;

fn to_journey_response(d: &JourneyDocument) -> JourneyResponse {
    JourneyResponse {
        id: d.id.map(|id| id.to_hex()).unwrap_or_default(),
        user_id: d.user_id.clone(),
        goal: d.goal.clone(),
        maturity_level: d.maturity_level.clone(),
        source: d.source.clone(),
        total_days: d.journey.total_days(),
        journey: d.journey.clone(),
        completed_days: d.completed_days.keys().cloned().collect(),
        created_at: d.created_at_rfc3339(),
        updated_at: d.updated_at_rfc3339(),
    }
}

fn to_journey_summary(d: &JourneyDocument) -> JourneySummary {
    JourneySummary {
        id: d.id.map(|id| id.to_hex()).unwrap_or_default(),
        goal: d.goal.clone(),
        maturity_level: d.maturity_level.clone(),
        source: d.source.clone(),
        total_days: d.journey.total_days(),
        created_at: d.created_at_rfc3339(),
    }
}

fn parse_object_id(id: &str) -> Result<ObjectId, (StatusCode, Json<MessageResponse>)> {
    ObjectId::parse_str(id).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(MessageResponse { message: "Invalid ID format".to_string() }),
        )
    })
}

pub async fn create_journey(
    State(state): State<AppState>,
    Json(payload): Json<CreateJourneyRequest>,
) -> Result<(StatusCode, Json<JourneyResponse>), (StatusCode, Json<MessageResponse>)> {
    if let Err(e) = payload.validate() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(MessageResponse { message: e.to_string() }),
        ));
    }

    // Live generation with the local mock as a last resort: the user always
    // gets a journey, and the document records which one they got.
    let (journey, source) = match JourneyGenerator::new(state.llm.clone()) {
        Ok(generator) => match generator
            .generate(&payload.goal, &payload.maturity_level)
            .await
        {
            Ok(journey) => (journey, SOURCE_GENERATED),
            Err(e) => {
                warn!(error = %e, "journey generation failed, serving fallback journey");
                (mock_journey(&payload.goal, FALLBACK_JOURNEY_DAYS), SOURCE_FALLBACK)
            }
        },
        Err(e) => {
            warn!(error = %e, "LLM client unavailable, serving fallback journey");
            (mock_journey(&payload.goal, FALLBACK_JOURNEY_DAYS), SOURCE_FALLBACK)
        }
    };

    let crud = JourneyCrud::new(&state.db);
    let document = JourneyDocument::new(
        payload.user_id,
        payload.goal,
        payload.maturity_level,
        journey,
        source,
    );

    let id = crud.create(document.clone()).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(MessageResponse { message: e.to_string() }),
        )
    })?;

    let mut response = to_journey_response(&document);
    response.id = id.to_hex();

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn get_journey(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JourneyResponse>, (StatusCode, Json<MessageResponse>)> {
    let oid = parse_object_id(&id)?;

    let crud = JourneyCrud::new(&state.db);

    match crud.find_by_id(&oid).await {
        Ok(Some(document)) => Ok(Json(to_journey_response(&document))),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(MessageResponse { message: "Journey not found".to_string() }),
        )),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(MessageResponse { message: e.to_string() }),
        )),
    }
}

pub async fn list_journeys(
    State(state): State<AppState>,
    Query(query): Query<ListJourneysQuery>,
) -> Result<Json<JourneyListResponse>, (StatusCode, Json<MessageResponse>)> {
    let crud = JourneyCrud::new(&state.db);

    let documents = crud
        .find_by_user(&query.user_id, LIST_LIMIT)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(MessageResponse { message: e.to_string() }),
            )
        })?;

    let total = crud.count_for_user(&query.user_id).await.unwrap_or(0);

    Ok(Json(JourneyListResponse {
        data: documents.iter().map(to_journey_summary).collect(),
        total,
    }))
}

/// The daily reading. Structural problems in the stored journey never surface
/// here; the selection falls back to a fixed verse/reflection pair.
pub async fn daily_verse(
    State(state): State<AppState>,
    Path((id, day_index)): Path<(String, usize)>,
) -> Result<Json<DailyVerseResponse>, (StatusCode, Json<MessageResponse>)> {
    let oid = parse_object_id(&id)?;

    let crud = JourneyCrud::new(&state.db);

    match crud.find_by_id(&oid).await {
        Ok(Some(document)) => {
            let (verse, reflection) = document.journey.daily_verse(day_index);
            Ok(Json(DailyVerseResponse { day_index, verse, reflection }))
        }
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(MessageResponse { message: "Journey not found".to_string() }),
        )),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(MessageResponse { message: e.to_string() }),
        )),
    }
}

pub async fn day_feedback(
    State(state): State<AppState>,
    Path((id, day_index)): Path<(String, usize)>,
    Json(payload): Json<DayFeedbackRequest>,
) -> Result<Json<FeedbackResponse>, (StatusCode, Json<MessageResponse>)> {
    if let Err(e) = payload.validate() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(MessageResponse { message: e.to_string() }),
        ));
    }

    let oid = parse_object_id(&id)?;

    let crud = JourneyCrud::new(&state.db);

    let document = match crud.find_by_id(&oid).await {
        Ok(Some(document)) => document,
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
    };

    let feedback = DayFeedback::new(payload.rating, payload.reason.clone());
    crud.set_day_feedback(&oid, day_index, &feedback)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(MessageResponse { message: e.to_string() }),
            )
        })?;

    // A low rating with a stated reason triggers regeneration of that day.
    // Revision failures keep the original content; the feedback is already
    // stored either way.
    let mut revised_day = None;
    if payload.rating <= 2 {
        let reason = payload
            .reason
            .as_deref()
            .map(str::trim)
            .filter(|reason| !reason.is_empty());

        if let (Some(reason), Some(current)) = (reason, document.journey.day(day_index).cloned()) {
            match JourneyGenerator::new(state.llm.clone()) {
                Ok(generator) => match generator.revise_day(&current, reason).await {
                    Ok(day) => {
                        let mut journey = document.journey.clone();
                        if journey.replace_day(day_index, day.clone()) {
                            crud.replace_journey(&oid, &journey).await.map_err(|e| {
                                (
                                    StatusCode::INTERNAL_SERVER_ERROR,
                                    Json(MessageResponse { message: e.to_string() }),
                                )
                            })?;
                            revised_day = Some(day);
                        }
                    }
                    Err(e) => warn!(error = %e, "day revision failed, keeping original day"),
                },
                Err(e) => warn!(error = %e, "LLM client unavailable, keeping original day"),
            }
        }
    }

    Ok(Json(FeedbackResponse {
        day_index,
        rating: feedback.rating,
        reason: feedback.reason.clone(),
        revised_day,
    }))
}

pub async fn complete_day(
    State(state): State<AppState>,
    Path((id, day_index)): Path<(String, usize)>,
) -> Result<Json<CompleteDayResponse>, (StatusCode, Json<MessageResponse>)> {
    let oid = parse_object_id(&id)?;

    let crud = JourneyCrud::new(&state.db);

    match crud.set_day_completed(&oid, day_index).await {
        Ok(true) => Ok(Json(CompleteDayResponse { day_index, completed: true })),
        Ok(false) => Err((
            StatusCode::NOT_FOUND,
            Json(MessageResponse { message: "Journey not found".to_string() }),
        )),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(MessageResponse { message: e.to_string() }),
        )),
    }
}

pub async fn delete_journey(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, (StatusCode, Json<MessageResponse>)> {
    let oid = parse_object_id(&id)?;

    let crud = JourneyCrud::new(&state.db);

    match crud.delete(&oid).await {
        Ok(true) => {
            // Best-effort cleanup of the journey's reflection threads.
            let reflections = ReflectionCrud::new(&state.db);
            if let Err(e) = reflections.delete_for_journey(&oid).await {
                warn!(error = %e, "failed to delete reflection threads for journey");
            }
            Ok(Json(MessageResponse { message: "Journey deleted".to_string() }))
        }
        Ok(false) => Err((
            StatusCode::NOT_FOUND,
            Json(MessageResponse { message: "Journey not found".to_string() }),
        )),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(MessageResponse { message: e.to_string() }),
        )),
    }
}
