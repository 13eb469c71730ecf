//! Repository contracts consumed by the engine.
//!
//! Storage is owned by the surrounding application; the engine only sees
//! these two traits. `memory` provides an in-process implementation used by
//! the binary and by tests.

use async_trait::async_trait;
use std::collections::HashSet;

use crate::error::RepositoryResult;
use crate::models::{
    AnswerEvent, AnswerRecord, CandidateQuestion, ProgressSnapshot, TopicPatternSnapshot,
};

pub mod memory;

pub use memory::InMemoryRepository;

/// Half-width of a difficulty band around its centre
pub const BAND_HALF_WIDTH: f64 = 0.5;

/// Parameters of a difficulty band lookup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BandQuery {
    pub category_id: String,
    pub center_difficulty: f64,
    pub limit: usize,
    pub exclude_ids: HashSet<String>,
    /// Questions carrying any of these topics come first
    pub prefer_topics: Vec<String>,
    /// Questions carrying any of these topics are skipped
    pub avoid_topics: Vec<String>,
}

impl BandQuery {
    pub fn contains(&self, difficulty: f64) -> bool {
        (difficulty - self.center_difficulty).abs() <= BAND_HALF_WIDTH
    }
}

/// Parameters of a review lookup for one learner
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewQuery {
    pub user_id: String,
    pub category_id: String,
    pub mistake_ids: Vec<String>,
    pub limit: usize,
    pub days_back: i64,
}

#[async_trait]
pub trait QuestionRepository: Send + Sync {
    async fn query_by_difficulty_band(
        &self,
        query: &BandQuery,
    ) -> RepositoryResult<Vec<CandidateQuestion>>;

    /// Questions among `mistake_ids` the same user answered incorrectly
    /// within `days_back` days
    async fn query_review_candidates(
        &self,
        query: &ReviewQuery,
    ) -> RepositoryResult<Vec<CandidateQuestion>>;

    async fn query_surprise(
        &self,
        category_id: &str,
        exclude_ids: &HashSet<String>,
    ) -> RepositoryResult<Option<CandidateQuestion>>;
}

#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// `None` when the user has no progress row for the category
    async fn get_progress(
        &self,
        user_id: &str,
        category_id: &str,
    ) -> RepositoryResult<Option<ProgressSnapshot>>;

    /// Newest first
    async fn get_recent_answers(
        &self,
        user_id: &str,
        category_id: &str,
        limit: usize,
    ) -> RepositoryResult<Vec<AnswerRecord>>;

    async fn get_topic_patterns(
        &self,
        user_id: &str,
        category_id: &str,
        limit: usize,
    ) -> RepositoryResult<TopicPatternSnapshot>;

    async fn record_answer(&self, event: &AnswerEvent) -> RepositoryResult<()>;
}
