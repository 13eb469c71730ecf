use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{EngineError, RepositoryResult};
use crate::metrics::track_repository_call;
use crate::models::question::{MAX_DIFFICULTY, MIN_DIFFICULTY};
use crate::models::{CandidateQuestion, DistributionPlan, UserContext};
use crate::repositories::{BandQuery, QuestionRepository, ReviewQuery};

/// Only mistakes this recent are eligible for review
pub const REVIEW_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Easy,
    Review,
    Normal,
    Hard,
    Surprise,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Easy => "easy",
            Tier::Review => "review",
            Tier::Normal => "normal",
            Tier::Hard => "hard",
            Tier::Surprise => "surprise",
        }
    }
}

/// Accumulates picks in tier order and keeps the exclusion set in sync
#[derive(Debug, Default)]
struct Selection {
    questions: Vec<CandidateQuestion>,
    chosen: HashSet<String>,
}

impl Selection {
    /// Adds questions not chosen yet; returns how many were kept
    fn extend(&mut self, candidates: Vec<CandidateQuestion>, is_review: bool) -> usize {
        let before = self.questions.len();
        for mut question in candidates {
            if self.chosen.insert(question.id.clone()) {
                question.is_review = is_review;
                self.questions.push(question);
            }
        }
        self.questions.len() - before
    }
}

/// Resolves a distribution plan into concrete questions.
///
/// Tiers are filled sequentially (easy, review, normal, hard, surprise)
/// because each tier excludes what earlier tiers picked.
pub struct QuestionSelector {
    questions: Arc<dyn QuestionRepository>,
}

impl QuestionSelector {
    pub fn new(questions: Arc<dyn QuestionRepository>) -> Self {
        Self { questions }
    }

    pub async fn select(
        &self,
        user_id: &str,
        category_id: &str,
        total_count: usize,
        context: &UserContext,
        plan: &DistributionPlan,
    ) -> Result<Vec<CandidateQuestion>, EngineError> {
        let mut selection = Selection::default();
        let skill = context.skill();

        if plan.easy > 0 {
            let query = BandQuery {
                category_id: category_id.to_string(),
                center_difficulty: (skill - 1.0).max(MIN_DIFFICULTY),
                limit: plan.easy,
                exclude_ids: selection.chosen.clone(),
                // Build on strengths
                prefer_topics: context.strong_topics.iter().cloned().collect(),
                avoid_topics: Vec::new(),
            };
            let found = self.band(Tier::Easy, &query).await;
            self.keep(Tier::Easy, &mut selection, found, false);
        }

        if plan.review > 0 && !context.common_mistake_ids.is_empty() {
            let query = ReviewQuery {
                user_id: user_id.to_string(),
                category_id: category_id.to_string(),
                mistake_ids: context.common_mistake_ids.clone(),
                limit: plan.review,
                days_back: REVIEW_WINDOW_DAYS,
            };
            let found = self
                .tier_result(
                    Tier::Review,
                    track_repository_call(
                        "query_review_candidates",
                        self.questions.query_review_candidates(&query),
                    )
                    .await,
                )
                .into_iter()
                .take(plan.review)
                .collect();
            self.keep(Tier::Review, &mut selection, found, true);
        }

        if plan.normal > 0 {
            let query = BandQuery {
                category_id: category_id.to_string(),
                center_difficulty: skill,
                limit: plan.normal,
                exclude_ids: selection.chosen.clone(),
                prefer_topics: Vec::new(),
                avoid_topics: if context.is_struggling {
                    context.weak_topics.iter().cloned().collect()
                } else {
                    Vec::new()
                },
            };
            let found = self.band(Tier::Normal, &query).await;
            self.keep(Tier::Normal, &mut selection, found, false);
        }

        if plan.hard > 0 {
            let query = BandQuery {
                category_id: category_id.to_string(),
                center_difficulty: (skill + 1.0).min(MAX_DIFFICULTY),
                limit: plan.hard,
                exclude_ids: selection.chosen.clone(),
                // Challenge weak areas when confident
                prefer_topics: context.weak_topics.iter().cloned().collect(),
                avoid_topics: Vec::new(),
            };
            let found = self.band(Tier::Hard, &query).await;
            self.keep(Tier::Hard, &mut selection, found, false);
        }

        if selection.questions.len() < total_count {
            let surprise = self.tier_result(
                Tier::Surprise,
                track_repository_call(
                    "query_surprise",
                    self.questions.query_surprise(category_id, &selection.chosen),
                )
                .await,
            );
            self.keep(Tier::Surprise, &mut selection, surprise.into_iter().collect(), false);
        }

        let mut questions = selection.questions;
        if questions.is_empty() {
            tracing::warn!("No questions available for category={}", category_id);
            return Err(EngineError::NoContentAvailable {
                category_id: category_id.to_string(),
            });
        }

        // Earlier tiers win when the plan over-asks
        questions.truncate(total_count);
        Ok(questions)
    }

    async fn band(&self, tier: Tier, query: &BandQuery) -> Vec<CandidateQuestion> {
        let result = track_repository_call(
            "query_by_difficulty_band",
            self.questions.query_by_difficulty_band(query),
        )
        .await;
        self.tier_result(tier, result)
            .into_iter()
            .take(query.limit)
            .collect()
    }

    /// A failed tier contributes nothing instead of failing the session
    fn tier_result<T: Default>(&self, tier: Tier, result: RepositoryResult<T>) -> T {
        result.unwrap_or_else(|e| {
            tracing::warn!("{} tier query failed, continuing without it: {}", tier.as_str(), e);
            T::default()
        })
    }

    fn keep(
        &self,
        tier: Tier,
        selection: &mut Selection,
        found: Vec<CandidateQuestion>,
        is_review: bool,
    ) {
        let offered = found.len();
        let kept = selection.extend(found, is_review);
        tracing::debug!(
            "{} tier: {} offered, {} kept, {} selected so far",
            tier.as_str(),
            offered,
            kept,
            selection.questions.len()
        );
    }
}
