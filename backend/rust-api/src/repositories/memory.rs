use anyhow::Context;
use async_trait::async_trait;
use chrono::Duration;
use rand::seq::{IndexedRandom, SliceRandom};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{BandQuery, HistoryRepository, QuestionRepository, ReviewQuery};
use crate::error::{RepositoryError, RepositoryResult};
use crate::models::{
    AnswerEvent, AnswerRecord, CandidateQuestion, ProgressSnapshot, TopicPatternEntry,
    TopicPatternSnapshot,
};
use crate::utils::time::{Clock, SystemClock};

type ProgressKey = (String, String);

#[derive(Debug, Clone)]
struct StoredAnswer {
    user_id: String,
    category_id: String,
    record: AnswerRecord,
}

/// Process-local question bank and answer history.
///
/// Implements both repository contracts. Progress rows are maintained from
/// recorded answers; seeded rows are kept as given.
pub struct InMemoryRepository {
    questions: RwLock<Vec<CandidateQuestion>>,
    answers: RwLock<Vec<StoredAnswer>>,
    progress: RwLock<HashMap<ProgressKey, ProgressSnapshot>>,
    clock: Arc<dyn Clock>,
    shuffle: bool,
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            questions: RwLock::new(Vec::new()),
            answers: RwLock::new(Vec::new()),
            progress: RwLock::new(HashMap::new()),
            clock,
            shuffle: true,
        }
    }

    /// Keeps insertion order in band queries and surprise picks
    pub fn without_shuffle(mut self) -> Self {
        self.shuffle = false;
        self
    }

    pub fn with_questions(self, questions: Vec<CandidateQuestion>) -> Self {
        if let Ok(mut bank) = self.questions.write() {
            bank.extend(questions);
        }
        self
    }

    /// Loads a JSON array of questions
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read question bank {}", path.display()))?;
        let questions: Vec<CandidateQuestion> = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse question bank {}", path.display()))?;

        tracing::info!(
            "Loaded {} questions from {}",
            questions.len(),
            path.display()
        );
        Ok(Self::new().with_questions(questions))
    }

    pub fn question_count(&self) -> usize {
        self.questions.read().map(|bank| bank.len()).unwrap_or(0)
    }

    pub fn insert_question(&self, question: CandidateQuestion) -> RepositoryResult<()> {
        write(&self.questions)?.push(question);
        Ok(())
    }

    pub fn set_progress(
        &self,
        user_id: &str,
        category_id: &str,
        snapshot: ProgressSnapshot,
    ) -> RepositoryResult<()> {
        write(&self.progress)?.insert(key(user_id, category_id), snapshot);
        Ok(())
    }

    /// Appends a history record without touching progress
    pub fn push_answer(
        &self,
        user_id: &str,
        category_id: &str,
        record: AnswerRecord,
    ) -> RepositoryResult<()> {
        write(&self.answers)?.push(StoredAnswer {
            user_id: user_id.to_string(),
            category_id: category_id.to_string(),
            record,
        });
        Ok(())
    }

    /// Stored answers of a user, newest first
    pub fn answers_for(&self, user_id: &str, category_id: &str) -> Vec<AnswerRecord> {
        self.history(user_id, category_id, usize::MAX)
            .unwrap_or_default()
    }

    fn history(
        &self,
        user_id: &str,
        category_id: &str,
        limit: usize,
    ) -> RepositoryResult<Vec<AnswerRecord>> {
        let answers = read(&self.answers)?;
        let mut records: Vec<AnswerRecord> = answers
            .iter()
            .filter(|a| a.user_id == user_id && a.category_id == category_id)
            .map(|a| a.record.clone())
            .collect();
        // Stable sort keeps later inserts ahead on equal timestamps
        records.reverse();
        records.sort_by(|a, b| b.answered_at.cmp(&a.answered_at));
        records.truncate(limit);
        Ok(records)
    }
}

#[async_trait]
impl QuestionRepository for InMemoryRepository {
    async fn query_by_difficulty_band(
        &self,
        query: &BandQuery,
    ) -> RepositoryResult<Vec<CandidateQuestion>> {
        let bank = read(&self.questions)?;

        let (mut preferred, mut rest): (Vec<CandidateQuestion>, Vec<CandidateQuestion>) = bank
            .iter()
            .filter(|q| q.category_id == query.category_id)
            .filter(|q| query.contains(q.difficulty))
            .filter(|q| !query.exclude_ids.contains(&q.id))
            .filter(|q| !q.has_any_topic(&query.avoid_topics))
            .cloned()
            .partition(|q| q.has_any_topic(&query.prefer_topics));

        if self.shuffle {
            let mut rng = rand::rng();
            preferred.shuffle(&mut rng);
            rest.shuffle(&mut rng);
        }

        preferred.extend(rest);
        preferred.truncate(query.limit);
        Ok(preferred)
    }

    async fn query_review_candidates(
        &self,
        query: &ReviewQuery,
    ) -> RepositoryResult<Vec<CandidateQuestion>> {
        let since = self.clock.now() - Duration::days(query.days_back);
        let recent_misses: HashSet<String> = read(&self.answers)?
            .iter()
            .filter(|a| a.user_id == query.user_id)
            .filter(|a| a.category_id == query.category_id)
            .filter(|a| !a.record.is_correct && a.record.answered_at >= since)
            .map(|a| a.record.question_id.clone())
            .collect();

        let bank = read(&self.questions)?;
        let candidates = query
            .mistake_ids
            .iter()
            .filter(|id| recent_misses.contains(*id))
            .filter_map(|id| {
                bank.iter()
                    .find(|q| &q.id == id && q.category_id == query.category_id)
            })
            .take(query.limit)
            .map(|q| CandidateQuestion {
                is_review: true,
                ..q.clone()
            })
            .collect();
        Ok(candidates)
    }

    async fn query_surprise(
        &self,
        category_id: &str,
        exclude_ids: &HashSet<String>,
    ) -> RepositoryResult<Option<CandidateQuestion>> {
        let bank = read(&self.questions)?;
        let pool: Vec<&CandidateQuestion> = bank
            .iter()
            .filter(|q| q.category_id == category_id && !exclude_ids.contains(&q.id))
            .collect();

        let pick = if self.shuffle {
            pool.choose(&mut rand::rng()).copied()
        } else {
            pool.first().copied()
        };
        Ok(pick.cloned())
    }
}

#[async_trait]
impl HistoryRepository for InMemoryRepository {
    async fn get_progress(
        &self,
        user_id: &str,
        category_id: &str,
    ) -> RepositoryResult<Option<ProgressSnapshot>> {
        Ok(read(&self.progress)?
            .get(&key(user_id, category_id))
            .cloned())
    }

    async fn get_recent_answers(
        &self,
        user_id: &str,
        category_id: &str,
        limit: usize,
    ) -> RepositoryResult<Vec<AnswerRecord>> {
        self.history(user_id, category_id, limit)
    }

    async fn get_topic_patterns(
        &self,
        user_id: &str,
        category_id: &str,
        limit: usize,
    ) -> RepositoryResult<TopicPatternSnapshot> {
        let entries = self
            .history(user_id, category_id, limit)?
            .into_iter()
            .map(|record| TopicPatternEntry {
                question_id: record.question_id,
                is_correct: record.is_correct,
                topics: record.topics,
            })
            .collect();
        Ok(TopicPatternSnapshot { entries })
    }

    async fn record_answer(&self, event: &AnswerEvent) -> RepositoryResult<()> {
        let now = self.clock.now();
        self.push_answer(
            &event.user_id,
            &event.category_id,
            AnswerRecord {
                question_id: event.question_id.clone(),
                is_correct: event.is_correct,
                time_spent_seconds: event.elapsed_seconds,
                difficulty: event.difficulty,
                topics: event.topics.clone(),
                answered_at: now,
            },
        )?;

        let mut progress = write(&self.progress)?;
        let row = progress
            .entry(key(&event.user_id, &event.category_id))
            .or_default();

        row.total_questions += 1;
        if event.is_correct {
            row.correct_answers += 1;
        }
        row.accuracy = f64::from(row.correct_answers) / f64::from(row.total_questions);

        let today = now.date_naive();
        row.play_streak_days = match row.last_played_at.map(|at| at.date_naive()) {
            Some(day) if day == today => row.play_streak_days.max(1),
            Some(day) if day.succ_opt() == Some(today) => row.play_streak_days + 1,
            _ => 1,
        };
        row.last_played_at = Some(now);

        Ok(())
    }
}

fn key(user_id: &str, category_id: &str) -> ProgressKey {
    (user_id.to_string(), category_id.to_string())
}

fn read<T>(lock: &RwLock<T>) -> RepositoryResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| RepositoryError::Unavailable("in-memory store lock poisoned".to_string()))
}

fn write<T>(lock: &RwLock<T>) -> RepositoryResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| RepositoryError::Unavailable("in-memory store lock poisoned".to_string()))
}
