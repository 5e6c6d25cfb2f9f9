use mongodb::Database;

pub mod config;
pub mod modules;
pub mod services;

use crate::config::llm::LlmConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub llm: LlmConfig,
}
