use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Exchange {
    pub question: String,
    pub answer: String,
    pub timestamp: bson::DateTime,
}

impl Exchange {
    pub fn new(question: String, answer: String) -> Self {
        Self {
            question,
            answer,
            timestamp: bson::DateTime::now(),
        }
    }

    pub fn timestamp_rfc3339(&self) -> String {
        self.timestamp.try_to_rfc3339_string().unwrap_or_default()
    }
}

/// One reader's Q&A conversation about a single day of a journey.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ReflectionThread {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub journey_id: ObjectId,
    pub day_index: u32,
    pub exchanges: Vec<Exchange>,
    pub created_at: bson::DateTime,
    pub updated_at: bson::DateTime,
}

impl ReflectionThread {
    pub fn new(journey_id: ObjectId, day_index: u32) -> Self {
        let now = bson::DateTime::now();
        Self {
            id: None,
            journey_id,
            day_index,
            exchanges: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn add_exchange(&mut self, exchange: Exchange) {
        self.exchanges.push(exchange);
        self.updated_at = bson::DateTime::now();
    }

    /// The most recent exchanges, oldest first.
    pub fn context_window(&self, limit: usize) -> Vec<&Exchange> {
        let len = self.exchanges.len();
        if len <= limit {
            self.exchanges.iter().collect()
        } else {
            self.exchanges.iter().skip(len - limit).collect()
        }
    }

    pub fn created_at_rfc3339(&self) -> String {
        self.created_at.try_to_rfc3339_string().unwrap_or_default()
    }

    pub fn updated_at_rfc3339(&self) -> String {
        self.updated_at.try_to_rfc3339_string().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_window_keeps_latest_exchanges() {
        let mut thread = ReflectionThread::new(ObjectId::new(), 0);
        for i in 0..5 {
            thread.add_exchange(Exchange::new(format!("q{i}"), format!("a{i}")));
        }

        let window = thread.context_window(3);

        assert_eq!(window.len(), 3);
        assert_eq!(window[0].question, "q2");
        assert_eq!(window[2].question, "q4");
    }

    #[test]
    fn context_window_shorter_than_limit() {
        let mut thread = ReflectionThread::new(ObjectId::new(), 1);
        thread.add_exchange(Exchange::new("q".to_string(), "a".to_string()));

        assert_eq!(thread.context_window(10).len(), 1);
    }
}
