use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock};

use crate::metrics::{record_cache_hit, record_cache_miss, track_repository_call};
use crate::models::{AnswerRecord, ProgressSnapshot, TopicPatternSnapshot, UserContext};
use crate::repositories::HistoryRepository;
use crate::utils::time::{days_between, Clock};

pub const DEFAULT_CONTEXT_TTL_SECONDS: i64 = 300;

/// Recent answers inspected for streaks and pacing
pub const RECENT_HISTORY_LIMIT: usize = 10;
/// Answers inspected for topic strengths and mistakes
pub const PATTERN_HISTORY_LIMIT: usize = 50;

const CORRECT_STREAK_THRESHOLD: u32 = 3;
const WRONG_STREAK_THRESHOLD: u32 = 2;
const DEFAULT_AVG_TIME_SECONDS: f64 = 30.0;
const MAX_MISTAKE_IDS: usize = 5;
const WEAK_TOPIC_ACCURACY: f64 = 0.5;
const STRONG_TOPIC_ACCURACY: f64 = 0.8;
const INACTIVE_DAYS_THRESHOLD: i64 = 3;
/// Above this many entries, expired ones are swept on insert
const CACHE_SWEEP_THRESHOLD: usize = 1024;

type CacheKey = (String, String);

#[derive(Debug, Clone)]
struct CachedContext {
    context: UserContext,
    cached_at: DateTime<Utc>,
}

/// Per-(user, category) context cache with wall-clock expiry.
///
/// Last writer wins; two concurrent rebuilds for the same key are harmless.
pub struct ContextCache {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: RwLock<HashMap<CacheKey, CachedContext>>,
}

impl ContextCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, user_id: &str, category_id: &str) -> Option<UserContext> {
        let entries = self.entries.read().ok()?;
        let cached = entries.get(&(user_id.to_string(), category_id.to_string()))?;
        if self.is_fresh(cached) {
            Some(cached.context.clone())
        } else {
            None
        }
    }

    pub fn insert(&self, user_id: &str, category_id: &str, context: UserContext) {
        let now = self.clock.now();
        let Ok(mut entries) = self.entries.write() else {
            tracing::warn!("Context cache lock poisoned, skipping insert");
            return;
        };

        if entries.len() >= CACHE_SWEEP_THRESHOLD {
            let ttl = self.ttl;
            entries.retain(|_, cached| now - cached.cached_at < ttl);
        }

        entries.insert(
            (user_id.to_string(), category_id.to_string()),
            CachedContext {
                context,
                cached_at: now,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_fresh(&self, cached: &CachedContext) -> bool {
        self.clock.now() - cached.cached_at < self.ttl
    }
}

/// Streak and pacing derived from the most recent answers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecentSummary {
    pub correct_streak: u32,
    pub wrong_streak: u32,
    pub avg_time_seconds: f64,
}

impl Default for RecentSummary {
    fn default() -> Self {
        Self {
            correct_streak: 0,
            wrong_streak: 0,
            avg_time_seconds: DEFAULT_AVG_TIME_SECONDS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatternSummary {
    pub weak_topics: BTreeSet<String>,
    pub strong_topics: BTreeSet<String>,
    pub common_mistake_ids: Vec<String>,
}

/// Builds `UserContext` snapshots from the history repository.
pub struct ContextBuilder {
    history: Arc<dyn HistoryRepository>,
    cache: ContextCache,
    clock: Arc<dyn Clock>,
}

impl ContextBuilder {
    pub fn new(history: Arc<dyn HistoryRepository>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            history,
            cache: ContextCache::new(ttl, clock.clone()),
            clock,
        }
    }

    pub fn cache(&self) -> &ContextCache {
        &self.cache
    }

    /// Cached snapshot if fresh, otherwise rebuilt. Repository failures
    /// degrade to empty data, so this never fails.
    pub async fn build(&self, user_id: &str, category_id: &str) -> UserContext {
        if let Some(context) = self.cache.get(user_id, category_id) {
            record_cache_hit();
            tracing::debug!(
                "Context cache hit: user={}, category={}",
                user_id,
                category_id
            );
            return context;
        }
        record_cache_miss();

        let (progress, recent, patterns) = tokio::join!(
            track_repository_call(
                "get_progress",
                self.history.get_progress(user_id, category_id)
            ),
            track_repository_call(
                "get_recent_answers",
                self.history
                    .get_recent_answers(user_id, category_id, RECENT_HISTORY_LIMIT)
            ),
            track_repository_call(
                "get_topic_patterns",
                self.history
                    .get_topic_patterns(user_id, category_id, PATTERN_HISTORY_LIMIT)
            ),
        );

        let progress = match progress {
            Ok(row) => row.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(
                    "Progress unavailable for user={}, category={}: {}",
                    user_id,
                    category_id,
                    e
                );
                ProgressSnapshot::default()
            }
        };
        let recent = recent.unwrap_or_else(|e| {
            tracing::warn!("Recent answers unavailable for user={}: {}", user_id, e);
            Vec::new()
        });
        let patterns = patterns.unwrap_or_else(|e| {
            tracing::warn!("Topic patterns unavailable for user={}: {}", user_id, e);
            TopicPatternSnapshot::default()
        });

        let context = assemble_context(
            &progress,
            &summarize_recent(&recent),
            analyze_patterns(&patterns),
            self.clock.now(),
        );

        tracing::debug!(
            "Context built: user={}, category={}, level={}, struggling={}, excelling={}, new={}",
            user_id,
            category_id,
            context.skill_level,
            context.is_struggling,
            context.is_excelling,
            context.is_new
        );

        self.cache.insert(user_id, category_id, context.clone());
        context
    }
}

pub fn assemble_context(
    progress: &ProgressSnapshot,
    recent: &RecentSummary,
    patterns: PatternSummary,
    now: DateTime<Utc>,
) -> UserContext {
    let days_inactive = progress
        .last_played_at
        .map(|at| days_between(at, now))
        .unwrap_or(0);

    UserContext {
        skill_level: calculate_level(progress),
        is_struggling: recent.wrong_streak >= WRONG_STREAK_THRESHOLD,
        is_excelling: recent.correct_streak >= CORRECT_STREAK_THRESHOLD,
        is_new: progress.total_questions < 10,
        accuracy: progress.accuracy,
        avg_time_per_question: recent.avg_time_seconds,
        weak_topics: patterns.weak_topics,
        strong_topics: patterns.strong_topics,
        common_mistake_ids: patterns.common_mistake_ids,
        last_played_at: progress.last_played_at,
        play_streak_days: progress.play_streak_days,
        motivation: calculate_motivation(progress, recent, days_inactive),
    }
}

/// Skill level 1..=5 from overall accuracy; 1 until five questions are answered
pub fn calculate_level(progress: &ProgressSnapshot) -> u8 {
    if progress.total_questions < 5 {
        return 1;
    }

    match progress.accuracy {
        a if a >= 0.9 => 5,
        a if a >= 0.8 => 4,
        a if a >= 0.7 => 3,
        a if a >= 0.6 => 2,
        _ => 1,
    }
}

/// Walks newest-first until one of the streaks qualifies
pub fn summarize_recent(records: &[AnswerRecord]) -> RecentSummary {
    if records.is_empty() {
        return RecentSummary::default();
    }

    let mut correct_streak = 0;
    let mut wrong_streak = 0;
    for record in records {
        if record.is_correct {
            correct_streak += 1;
            wrong_streak = 0;
        } else {
            wrong_streak += 1;
            correct_streak = 0;
        }
        if correct_streak >= CORRECT_STREAK_THRESHOLD || wrong_streak >= WRONG_STREAK_THRESHOLD {
            break;
        }
    }

    let total_time: f64 = records.iter().map(|r| r.time_spent_seconds).sum();

    RecentSummary {
        correct_streak,
        wrong_streak,
        avg_time_seconds: total_time / records.len() as f64,
    }
}

pub fn analyze_patterns(snapshot: &TopicPatternSnapshot) -> PatternSummary {
    let mut per_topic: HashMap<&str, (u32, u32)> = HashMap::new();
    let mut mistakes: Vec<String> = Vec::new();

    for entry in &snapshot.entries {
        for topic in &entry.topics {
            let (correct, total) = per_topic.entry(topic.as_str()).or_insert((0, 0));
            *total += 1;
            if entry.is_correct {
                *correct += 1;
            }
        }
        if !entry.is_correct
            && mistakes.len() < MAX_MISTAKE_IDS
            && !mistakes.contains(&entry.question_id)
        {
            mistakes.push(entry.question_id.clone());
        }
    }

    let mut summary = PatternSummary {
        common_mistake_ids: mistakes,
        ..PatternSummary::default()
    };
    for (topic, (correct, total)) in per_topic {
        let accuracy = f64::from(correct) / f64::from(total);
        if accuracy < WEAK_TOPIC_ACCURACY {
            summary.weak_topics.insert(topic.to_string());
        }
        if accuracy > STRONG_TOPIC_ACCURACY {
            summary.strong_topics.insert(topic.to_string());
        }
    }
    summary
}

pub fn calculate_motivation(
    progress: &ProgressSnapshot,
    recent: &RecentSummary,
    days_inactive: i64,
) -> f64 {
    let mut motivation = 0.5;

    if recent.correct_streak >= CORRECT_STREAK_THRESHOLD {
        motivation += 0.2;
    }
    if recent.wrong_streak >= WRONG_STREAK_THRESHOLD {
        motivation -= 0.2;
    }
    if progress.play_streak_days >= 3 {
        motivation += 0.1;
    }
    if days_inactive >= INACTIVE_DAYS_THRESHOLD {
        motivation -= 0.1;
    }
    if progress.level_progress > 0.7 {
        motivation += 0.1;
    }

    f64::clamp(motivation, 0.0, 1.0)
}
