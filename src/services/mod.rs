pub mod journey;
pub mod llm;
