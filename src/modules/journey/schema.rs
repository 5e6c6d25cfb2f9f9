use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::modules::journey::model::{Day, Journey};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateJourneyRequest {
    #[validate(length(min = 1, message = "User id cannot be empty"))]
    pub user_id: String,
    #[validate(length(min = 1, message = "Goal cannot be empty"))]
    pub goal: String,
    #[validate(length(min = 1, message = "Maturity level cannot be empty"))]
    pub maturity_level: String,
}

#[derive(Debug, Deserialize)]
pub struct ListJourneysQuery {
    pub user_id: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct DayFeedbackRequest {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: u8,
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct JourneyResponse {
    pub id: String,
    pub user_id: String,
    pub goal: String,
    pub maturity_level: String,
    pub source: String,
    pub total_days: usize,
    pub journey: Journey,
    pub completed_days: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize)]
pub struct JourneySummary {
    pub id: String,
    pub goal: String,
    pub maturity_level: String,
    pub source: String,
    pub total_days: usize,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct JourneyListResponse {
    pub data: Vec<JourneySummary>,
    pub total: u64,
}

#[derive(Debug, Serialize)]
pub struct DailyVerseResponse {
    pub day_index: usize,
    pub verse: String,
    pub reflection: String,
}

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub day_index: usize,
    pub rating: u8,
    pub reason: Option<String>,
    pub revised_day: Option<Day>,
}

#[derive(Debug, Serialize)]
pub struct CompleteDayResponse {
    pub day_index: usize,
    pub completed: bool,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
