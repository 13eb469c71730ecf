use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Aggregate progress of a user inside one category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub total_questions: u32,
    pub correct_answers: u32,
    pub accuracy: f64,
    pub last_played_at: Option<DateTime<Utc>>,
    pub play_streak_days: u32,
    /// Progress towards the next level, 0..=1
    pub level_progress: f64,
}

/// One stored answer, newest first when returned by the history repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question_id: String,
    pub is_correct: bool,
    pub time_spent_seconds: f64,
    pub difficulty: f64,
    #[serde(default)]
    pub topics: Vec<String>,
    pub answered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicPatternEntry {
    pub question_id: String,
    pub is_correct: bool,
    #[serde(default)]
    pub topics: Vec<String>,
}

/// Raw answer pattern window; weak/strong topics are derived by the engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicPatternSnapshot {
    pub entries: Vec<TopicPatternEntry>,
}

/// Cached per-(user, category) snapshot driving selection, ordering and rewards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserContext {
    /// 1..=5
    pub skill_level: u8,
    pub is_struggling: bool,
    pub is_excelling: bool,
    pub is_new: bool,
    pub accuracy: f64,
    pub avg_time_per_question: f64,
    pub weak_topics: BTreeSet<String>,
    pub strong_topics: BTreeSet<String>,
    /// Unique, most recent first, at most five
    pub common_mistake_ids: Vec<String>,
    pub last_played_at: Option<DateTime<Utc>>,
    pub play_streak_days: u32,
    /// 0..=1
    pub motivation: f64,
}

impl Default for UserContext {
    /// Context of a user with no recorded activity
    fn default() -> Self {
        Self {
            skill_level: 1,
            is_struggling: false,
            is_excelling: false,
            is_new: true,
            accuracy: 0.0,
            avg_time_per_question: 30.0,
            weak_topics: BTreeSet::new(),
            strong_topics: BTreeSet::new(),
            common_mistake_ids: Vec::new(),
            last_played_at: None,
            play_streak_days: 0,
            motivation: 0.5,
        }
    }
}

impl UserContext {
    pub fn skill(&self) -> f64 {
        f64::from(self.skill_level)
    }
}
