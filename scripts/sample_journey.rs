//! Run with: cargo run --bin sample_journey -- "a goal" "a maturity level"

use emmaus::config::llm::LlmConfig;
use emmaus::services::journey::JourneyGenerator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = LlmConfig::from_env();
    anyhow::ensure!(
        config.credential.is_configured(),
        "OPENAI_API_KEY must be set"
    );

    let goal = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "growing in patience".to_string());
    let maturity = std::env::args()
        .nth(2)
        .unwrap_or_else(|| "Beginner".to_string());

    println!("\n🕊  Generating a journey for \"{}\" ({})...\n", goal, maturity);

    let generator = JourneyGenerator::new(config)?;
    let journey = generator.generate(&goal, &maturity).await?;

    println!("✓ {} days generated\n", journey.total_days());
    println!("{:-<80}", "");

    for (i, day) in journey.days().iter().enumerate() {
        println!("Day {}: {}", i + 1, day.title.as_deref().unwrap_or("(untitled)"));
        println!("  {}", day.verse);
        if let Some(text) = day.reflection_text() {
            println!("  {}", text);
        }
        if let Some(question) = day.commentary().and_then(|c| c.qa_prompt.as_deref()) {
            println!("  ? {}", question);
        }
        println!();
    }

    Ok(())
}
