#![allow(dead_code)]

use adaptive_quiz_api::{
    config::Config,
    create_router,
    error::{RepositoryError, RepositoryResult},
    models::{
        AnswerEvent, AnswerRecord, CandidateQuestion, ProgressSnapshot, QuestionContent,
        TopicPatternSnapshot,
    },
    repositories::{
        BandQuery, HistoryRepository, InMemoryRepository, QuestionRepository, ReviewQuery,
    },
    services::{
        error_sink::{ErrorSink, TracingErrorSink},
        AppState,
    },
    utils::time::SystemClock,
};
use async_trait::async_trait;
use axum::Router;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const CATEGORY: &str = "math";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub fn question(id: &str, difficulty: f64, topics: &[&str]) -> CandidateQuestion {
    CandidateQuestion {
        id: id.to_string(),
        category_id: CATEGORY.to_string(),
        topics: topics.iter().map(|t| t.to_string()).collect(),
        difficulty,
        content: QuestionContent {
            prompt: format!("Question {}", id),
            options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            correct_index: 0,
            explanation: Some("Because A".to_string()),
        },
        is_review: false,
    }
}

/// Four questions at every whole difficulty plus four at every half step
pub fn full_bank() -> Vec<CandidateQuestion> {
    let mut bank = Vec::new();
    for step in 2..=10 {
        let difficulty = f64::from(step) / 2.0;
        for n in 0..4 {
            bank.push(question(&format!("q-{}-{}", step, n), difficulty, &[]));
        }
    }
    bank
}

pub fn answer(question_id: &str, is_correct: bool) -> AnswerEvent {
    AnswerEvent {
        user_id: "learner-1".to_string(),
        category_id: CATEGORY.to_string(),
        question_id: question_id.to_string(),
        is_correct,
        elapsed_seconds: 12.0,
        difficulty: 2.0,
        streak: 0,
        topics: vec!["fractions".to_string()],
    }
}

pub fn test_config() -> Config {
    Config {
        record_answer_attempts: 2,
        ..Config::default()
    }
}

pub fn create_test_app(repository: Arc<InMemoryRepository>) -> Router {
    init_tracing();
    let state = AppState::new(test_config(), repository.clone(), repository);
    create_router(Arc::new(state))
}

pub fn create_test_app_with(
    questions: Arc<dyn QuestionRepository>,
    history: Arc<dyn HistoryRepository>,
    error_sink: Arc<dyn ErrorSink>,
) -> Router {
    init_tracing();
    let state = AppState::with_dependencies(
        test_config(),
        questions,
        history,
        Arc::new(SystemClock),
        error_sink,
    );
    create_router(Arc::new(state))
}

pub fn default_sink() -> Arc<dyn ErrorSink> {
    Arc::new(TracingErrorSink)
}

/// History store that counts read calls
pub struct CountingHistory {
    inner: InMemoryRepository,
    pub progress_calls: AtomicUsize,
    pub recent_calls: AtomicUsize,
    pub pattern_calls: AtomicUsize,
}

impl CountingHistory {
    pub fn new(inner: InMemoryRepository) -> Self {
        Self {
            inner,
            progress_calls: AtomicUsize::new(0),
            recent_calls: AtomicUsize::new(0),
            pattern_calls: AtomicUsize::new(0),
        }
    }

    pub fn inner(&self) -> &InMemoryRepository {
        &self.inner
    }

    pub fn read_calls(&self) -> usize {
        self.progress_calls.load(Ordering::SeqCst)
            + self.recent_calls.load(Ordering::SeqCst)
            + self.pattern_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HistoryRepository for CountingHistory {
    async fn get_progress(
        &self,
        user_id: &str,
        category_id: &str,
    ) -> RepositoryResult<Option<ProgressSnapshot>> {
        self.progress_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get_progress(user_id, category_id).await
    }

    async fn get_recent_answers(
        &self,
        user_id: &str,
        category_id: &str,
        limit: usize,
    ) -> RepositoryResult<Vec<AnswerRecord>> {
        self.recent_calls.fetch_add(1, Ordering::SeqCst);
        self.inner
            .get_recent_answers(user_id, category_id, limit)
            .await
    }

    async fn get_topic_patterns(
        &self,
        user_id: &str,
        category_id: &str,
        limit: usize,
    ) -> RepositoryResult<TopicPatternSnapshot> {
        self.pattern_calls.fetch_add(1, Ordering::SeqCst);
        self.inner
            .get_topic_patterns(user_id, category_id, limit)
            .await
    }

    async fn record_answer(&self, event: &AnswerEvent) -> RepositoryResult<()> {
        self.inner.record_answer(event).await
    }
}

/// Every history call fails; `record_answer` calls are counted
#[derive(Default)]
pub struct FailingHistory {
    pub record_calls: AtomicUsize,
}

#[async_trait]
impl HistoryRepository for FailingHistory {
    async fn get_progress(&self, _: &str, _: &str) -> RepositoryResult<Option<ProgressSnapshot>> {
        Err(RepositoryError::Unavailable("progress store down".into()))
    }

    async fn get_recent_answers(
        &self,
        _: &str,
        _: &str,
        _: usize,
    ) -> RepositoryResult<Vec<AnswerRecord>> {
        Err(RepositoryError::Timeout)
    }

    async fn get_topic_patterns(
        &self,
        _: &str,
        _: &str,
        _: usize,
    ) -> RepositoryResult<TopicPatternSnapshot> {
        Err(RepositoryError::Unavailable("pattern store down".into()))
    }

    async fn record_answer(&self, _: &AnswerEvent) -> RepositoryResult<()> {
        self.record_calls.fetch_add(1, Ordering::SeqCst);
        Err(RepositoryError::Unavailable("write rejected".into()))
    }
}

/// Question store whose band queries fail; review and surprise pass through
pub struct FlakyQuestions {
    inner: InMemoryRepository,
}

impl FlakyQuestions {
    pub fn new(inner: InMemoryRepository) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl QuestionRepository for FlakyQuestions {
    async fn query_by_difficulty_band(
        &self,
        _: &BandQuery,
    ) -> RepositoryResult<Vec<CandidateQuestion>> {
        Err(RepositoryError::Timeout)
    }

    async fn query_review_candidates(
        &self,
        query: &ReviewQuery,
    ) -> RepositoryResult<Vec<CandidateQuestion>> {
        self.inner.query_review_candidates(query).await
    }

    async fn query_surprise(
        &self,
        category_id: &str,
        exclude_ids: &HashSet<String>,
    ) -> RepositoryResult<Option<CandidateQuestion>> {
        self.inner.query_surprise(category_id, exclude_ids).await
    }
}
