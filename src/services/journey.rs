use serde_json::Value;

use crate::config::llm::LlmConfig;
use crate::modules::journey::model::{Day, Devotional, Journey, JourneyPath};
use crate::services::llm::{LlmClient, LlmError};

const REFLECTION_CONTEXT_LIMIT: usize = 10;

/// Generates devotional journeys through the chat-completion API. Holds no
/// journey data between calls; every response is parsed fresh and handed to
/// the caller to persist.
#[derive(Clone)]
pub struct JourneyGenerator {
    llm: LlmClient,
}

impl JourneyGenerator {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        Ok(Self {
            llm: LlmClient::new(config)?,
        })
    }

    /// Full journey generation, retrying rate limits per the client's policy.
    pub async fn generate(&self, goal: &str, maturity_level: &str) -> Result<Journey, LlmError> {
        let prompt = generation_prompt(goal, maturity_level);
        let content = self.llm.chat_json(&prompt).await?;
        parse_journey(&content)
    }

    /// Regenerates a single day from feedback. One attempt, no retry loop.
    pub async fn revise_day(&self, day: &Day, feedback_reason: &str) -> Result<Day, LlmError> {
        let prompt = revision_prompt(day, feedback_reason);
        let content = self.llm.chat_json_once(&prompt).await?;
        parse_revised_day(&content)
    }

    /// Free-text pastoral answer to a follow-up question, in the context of
    /// the prior exchanges. One attempt, raw text back.
    pub async fn ask_reflection(
        &self,
        prior_exchanges: &[(String, String)],
        question: &str,
    ) -> Result<String, LlmError> {
        let prompt = reflection_prompt(prior_exchanges, question);
        self.llm.chat_text(&prompt).await
    }
}

fn generation_prompt(goal: &str, maturity_level: &str) -> String {
    format!(
        "You are a devotional writing assistant. Create a 7-day Bible journey for a believer \
         whose goal is: \"{goal}\". Their spiritual maturity level is: \"{maturity_level}\"; \
         match your tone and depth to it.\n\
         Respond with a single JSON object of exactly this shape:\n\
         {{\"path\":{{\"days\":[{{\"title\":\"...\",\"verse\":\"...\",\
         \"devotional\":{{\"context\":\"...\",\"meaning\":\"...\",\"qaPrompt\":\"...\"}}}}]}}}}\n\
         Every \"verse\" must be a direct scripture citation from the King James Version only, \
         formatted as \"Book Chapter:Verse - text\". \"context\" sets the passage's background, \
         \"meaning\" applies it to the goal, and \"qaPrompt\" is one reflective question for \
         the reader. Output only the JSON object, no prose."
    )
}

fn revision_prompt(day: &Day, feedback_reason: &str) -> String {
    let commentary = day.commentary();
    let context = commentary.and_then(|c| c.context.as_deref()).unwrap_or("");
    let meaning = commentary.and_then(|c| c.meaning.as_deref()).unwrap_or("");
    let qa_prompt = commentary.and_then(|c| c.qa_prompt.as_deref()).unwrap_or("");

    format!(
        "A reader was unhappy with this day of their devotional journey.\n\
         Current title: \"{title}\"\n\
         Current verse: \"{verse}\"\n\
         Current context: \"{context}\"\n\
         Current meaning: \"{meaning}\"\n\
         Current question: \"{qa_prompt}\"\n\
         Their feedback: \"{feedback_reason}\"\n\
         Write a replacement day that addresses the feedback. Respond with a single JSON object \
         of exactly this shape:\n\
         {{\"title\":\"...\",\"verse\":\"...\",\
         \"devotional\":{{\"context\":\"...\",\"meaning\":\"...\",\"qaPrompt\":\"...\"}}}}\n\
         The verse must be a King James Version citation formatted as \
         \"Book Chapter:Verse - text\". Output only the JSON object, no prose.",
        title = day.title.as_deref().unwrap_or(""),
        verse = day.verse,
    )
}

fn reflection_prompt(prior_exchanges: &[(String, String)], question: &str) -> String {
    let mut context = String::new();
    for (asked, answered) in prior_exchanges
        .iter()
        .rev()
        .take(REFLECTION_CONTEXT_LIMIT)
        .rev()
    {
        context.push_str(&format!("Q: {asked}\nA: {answered}\n\n"));
    }

    let context_block = if context.is_empty() {
        String::new()
    } else {
        format!("Earlier conversation:\n{context}")
    };

    format!(
        "You are a gentle, biblically grounded pastoral guide answering a reader's question \
         about their daily devotional.\n\
         {context_block}\
         New question: {question}\n\
         Answer warmly and plainly, in under 200 words."
    )
}

// Pipeline steps after content extraction: the content string must be a
// non-empty JSON object, and it must carry path.days (or legacy path.weeks)
// as a non-empty array. The parsed structure is returned untransformed.
fn parse_journey(content: &str) -> Result<Journey, LlmError> {
    let value = parse_content_object(content)?;

    let journey: Journey = serde_json::from_value(value)
        .map_err(|e| LlmError::InvalidResponse(format!("journey payload: {e}")))?;

    if journey.total_days() == 0 {
        return Err(LlmError::InvalidResponse(
            "journey contains no days".to_string(),
        ));
    }

    Ok(journey)
}

fn parse_revised_day(content: &str) -> Result<Day, LlmError> {
    let value = parse_content_object(content)?;

    let day: Day = serde_json::from_value(value)
        .map_err(|e| LlmError::InvalidResponse(format!("day payload: {e}")))?;

    let title_missing = day
        .title
        .as_deref()
        .map(str::trim)
        .unwrap_or("")
        .is_empty();
    if title_missing || day.verse.trim().is_empty() {
        return Err(LlmError::InvalidResponse(
            "revised day is missing title or verse".to_string(),
        ));
    }

    Ok(day)
}

fn parse_content_object(content: &str) -> Result<Value, LlmError> {
    let value: Value = serde_json::from_str(content)
        .map_err(|e| LlmError::JsonParsingFailed(e.to_string()))?;

    match value.as_object() {
        Some(object) if !object.is_empty() => Ok(value),
        _ => Err(LlmError::JsonParsingFailed(
            "model output is not a non-empty JSON object".to_string(),
        )),
    }
}

/// Locally generated stand-in journey for when live generation fails
/// entirely. Fixed, well-known verses; the caller records the document as a
/// fallback.
pub fn mock_journey(goal: &str, days: usize) -> Journey {
    const VERSES: [(&str, &str, &str); 7] = [
        (
            "Psalm 23:1 - The LORD is my shepherd; I shall not want.",
            "David writes from his years tending sheep.",
            "God provides for every need along the way.",
        ),
        (
            "Proverbs 3:5 - Trust in the LORD with all thine heart; and lean not unto thine own understanding.",
            "Solomon's counsel to his son.",
            "Trust grows when we stop relying on our own view.",
        ),
        (
            "Isaiah 41:10 - Fear thou not; for I am with thee: be not dismayed; for I am thy God.",
            "Spoken to Israel in exile.",
            "God's presence is the answer to fear.",
        ),
        (
            "Philippians 4:13 - I can do all things through Christ which strengtheneth me.",
            "Paul writes from prison, content in every state.",
            "Strength for the goal comes from Christ, not circumstance.",
        ),
        (
            "Psalm 119:105 - Thy word is a lamp unto my feet, and a light unto my path.",
            "The psalmist's love for God's instruction.",
            "Scripture lights the next step, not the whole road.",
        ),
        (
            "Matthew 11:28 - Come unto me, all ye that labour and are heavy laden, and I will give you rest.",
            "Jesus' invitation to the weary.",
            "Rest is received, not achieved.",
        ),
        (
            "Joshua 1:9 - Be strong and of a good courage; be not afraid, neither be thou dismayed: for the LORD thy God is with thee whithersoever thou goest.",
            "God commissions Joshua after Moses' death.",
            "Courage rests on God going with you.",
        ),
    ];

    let days = (0..days.max(1))
        .map(|i| {
            let (verse, context, meaning) = VERSES[i % VERSES.len()];
            Day {
                title: Some(format!("Day {}: {}", i + 1, goal)),
                verse: verse.to_string(),
                devotional: Some(Devotional {
                    context: Some(context.to_string()),
                    meaning: Some(meaning.to_string()),
                    qa_prompt: Some("How does this verse speak to your goal today?".to_string()),
                }),
                reflection: None,
            }
        })
        .collect();

    Journey {
        path: JourneyPath::Days { days },
    }
}
