use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct AskReflectionRequest {
    #[validate(length(min = 1, message = "Journey id cannot be empty"))]
    pub journey_id: String,
    pub day_index: u32,
    #[validate(length(min = 1, message = "Question cannot be empty"))]
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct ReflectionAnswerResponse {
    pub journey_id: String,
    pub day_index: u32,
    pub question: String,
    pub answer: String,
    pub exchange_count: usize,
}

#[derive(Debug, Serialize, Clone)]
pub struct ExchangeResponse {
    pub question: String,
    pub answer: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct ThreadResponse {
    pub journey_id: String,
    pub day_index: u32,
    pub exchanges: Vec<ExchangeResponse>,
    pub exchange_count: usize,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
