use std::collections::BTreeMap;

use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

pub const FALLBACK_VERSE: &str = "Psalm 23:1 - The Lord is my shepherd; I shall not want.";
pub const FALLBACK_REFLECTION: &str =
    "God is with you today. Rest in His care and trust Him to provide what you need.";

pub const SOURCE_GENERATED: &str = "generated";
pub const SOURCE_FALLBACK: &str = "fallback";

/// Commentary attached to a day. The upstream model emits this either under
/// `devotional` (current) or `reflection` (legacy).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Devotional {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meaning: Option<String>,
    #[serde(default, rename = "qaPrompt", skip_serializing_if = "Option::is_none")]
    pub qa_prompt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Day {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub verse: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub devotional: Option<Devotional>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reflection: Option<Devotional>,
}

impl Day {
    pub fn commentary(&self) -> Option<&Devotional> {
        self.devotional.as_ref().or(self.reflection.as_ref())
    }

    /// Readable reflection text for the day: the commentary's meaning, or its
    /// context when no meaning is present.
    pub fn reflection_text(&self) -> Option<String> {
        let commentary = self.commentary()?;
        [&commentary.meaning, &commentary.context]
            .into_iter()
            .flatten()
            .map(|text| text.trim())
            .find(|text| !text.is_empty())
            .map(str::to_string)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Week {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub days: Vec<Day>,
}

/// The two wire shapes a journey arrives in: the current flat day list and
/// the legacy week grouping. Normalization happens once, in [`Journey::days`];
/// callers never re-probe the shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JourneyPath {
    Days { days: Vec<Day> },
    Weeks { weeks: Vec<Week> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Journey {
    pub path: JourneyPath,
}

impl Journey {
    /// Days in reading order, weeks flattened in sequence.
    pub fn days(&self) -> Vec<&Day> {
        match &self.path {
            JourneyPath::Days { days } => days.iter().collect(),
            JourneyPath::Weeks { weeks } => {
                weeks.iter().flat_map(|week| week.days.iter()).collect()
            }
        }
    }

    pub fn total_days(&self) -> usize {
        match &self.path {
            JourneyPath::Days { days } => days.len(),
            JourneyPath::Weeks { weeks } => weeks.iter().map(|week| week.days.len()).sum(),
        }
    }

    pub fn day(&self, day_index: usize) -> Option<&Day> {
        match &self.path {
            JourneyPath::Days { days } => days.get(day_index),
            JourneyPath::Weeks { weeks } => {
                let mut remaining = day_index;
                for week in weeks {
                    if remaining < week.days.len() {
                        return week.days.get(remaining);
                    }
                    remaining -= week.days.len();
                }
                None
            }
        }
    }

    /// Verse/reflection pair for a day. Any structural anomaly (an index past
    /// the end, a blank verse, missing reflection text) yields the fixed
    /// fallback pair instead of an error, so the daily reading always renders.
    pub fn daily_verse(&self, day_index: usize) -> (String, String) {
        let Some(day) = self.day(day_index) else {
            return fallback_pair();
        };

        let verse = day.verse.trim();
        if verse.is_empty() {
            return fallback_pair();
        }

        match day.reflection_text() {
            Some(reflection) => (verse.to_string(), reflection),
            None => fallback_pair(),
        }
    }

    /// Positional replacement of one day; false when the index is out of range.
    pub fn replace_day(&mut self, day_index: usize, day: Day) -> bool {
        match &mut self.path {
            JourneyPath::Days { days } => {
                if let Some(slot) = days.get_mut(day_index) {
                    *slot = day;
                    return true;
                }
                false
            }
            JourneyPath::Weeks { weeks } => {
                let mut remaining = day_index;
                for week in weeks {
                    if remaining < week.days.len() {
                        week.days[remaining] = day;
                        return true;
                    }
                    remaining -= week.days.len();
                }
                false
            }
        }
    }
}

pub fn fallback_pair() -> (String, String) {
    (FALLBACK_VERSE.to_string(), FALLBACK_REFLECTION.to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayFeedback {
    pub rating: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub created_at: bson::DateTime,
}

impl DayFeedback {
    pub fn new(rating: u8, reason: Option<String>) -> Self {
        Self {
            rating,
            reason,
            created_at: bson::DateTime::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JourneyDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: String,
    pub goal: String,
    pub maturity_level: String,
    pub journey: Journey,
    /// Per-day star feedback, keyed `day_<index>`.
    #[serde(default)]
    pub feedback: BTreeMap<String, DayFeedback>,
    /// Per-day completion flags, keyed by the day index.
    #[serde(default)]
    pub completed_days: BTreeMap<String, bool>,
    pub source: String,
    pub created_at: bson::DateTime,
    pub updated_at: bson::DateTime,
}

impl JourneyDocument {
    pub fn new(
        user_id: String,
        goal: String,
        maturity_level: String,
        journey: Journey,
        source: &str,
    ) -> Self {
        let now = bson::DateTime::now();
        Self {
            id: None,
            user_id,
            goal,
            maturity_level,
            journey,
            feedback: BTreeMap::new(),
            completed_days: BTreeMap::new(),
            source: source.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn feedback_key(day_index: usize) -> String {
        format!("day_{}", day_index)
    }

    pub fn created_at_rfc3339(&self) -> String {
        self.created_at.try_to_rfc3339_string().unwrap_or_default()
    }

    pub fn updated_at_rfc3339(&self) -> String {
        self.updated_at.try_to_rfc3339_string().unwrap_or_default()
    }
}
