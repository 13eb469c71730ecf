use serde::{Deserialize, Serialize};

/// Lowest and highest difficulty a question can carry
pub const MIN_DIFFICULTY: f64 = 1.0;
pub const MAX_DIFFICULTY: f64 = 5.0;

/// A question fetched from the repository, not yet ordered or annotated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateQuestion {
    pub id: String,
    pub category_id: String,
    #[serde(default)]
    pub topics: Vec<String>,
    /// Continuous difficulty in 1.0..=5.0
    pub difficulty: f64,
    pub content: QuestionContent,
    /// Set only when the question was sourced via the review path
    #[serde(default)]
    pub is_review: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionContent {
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    pub explanation: Option<String>,
}

impl CandidateQuestion {
    pub fn has_any_topic<'a, I>(&self, topics: I) -> bool
    where
        I: IntoIterator<Item = &'a String>,
    {
        topics
            .into_iter()
            .any(|topic| self.topics.iter().any(|own| own == topic))
    }
}
