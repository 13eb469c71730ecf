use std::sync::Arc;
use tokio::task::JoinHandle;

use super::context_service::ContextBuilder;
use super::error_sink::{ErrorSink, PersistenceFailure};
use crate::metrics::{track_repository_call, ANSWERS_EVALUATED_TOTAL, SPECIAL_REWARDS_TOTAL};
use crate::models::{AnswerEvent, RewardBundle, RewardKind, SpecialReward};
use crate::repositories::HistoryRepository;
use crate::utils::retry::{retry_async_with_config, RetryConfig};

/// Participation points for a wrong answer
const INCORRECT_XP: f64 = 5.0;
const CORRECT_BASE_XP: f64 = 10.0;
const XP_PER_DIFFICULTY: f64 = 5.0;
const STREAK_XP_STEP: f64 = 5.0;
const STREAK_XP_CAP: f64 = 50.0;
const SPEED_REWARD_SECONDS: f64 = 5.0;
const DIFFICULTY_REWARD_MIN: f64 = 4.0;

/// Scores answers and hands the answer record to storage in the background.
pub struct AnswerService {
    context: Arc<ContextBuilder>,
    history: Arc<dyn HistoryRepository>,
    error_sink: Arc<dyn ErrorSink>,
    retry: RetryConfig,
}

impl AnswerService {
    pub fn new(
        context: Arc<ContextBuilder>,
        history: Arc<dyn HistoryRepository>,
        error_sink: Arc<dyn ErrorSink>,
        retry: RetryConfig,
    ) -> Self {
        Self {
            context,
            history,
            error_sink,
            retry,
        }
    }

    /// Records the answer without waiting for storage and returns the reward
    pub async fn submit_answer(&self, event: AnswerEvent) -> RewardBundle {
        tracing::info!(
            "Processing answer: user={}, category={}, question={}, correct={}",
            event.user_id,
            event.category_id,
            event.question_id,
            event.is_correct
        );

        // Detached: the reward never waits on or fails because of storage
        drop(self.record_in_background(event.clone()));

        let reward = self.evaluate(&event).await;

        tracing::info!(
            "Answer scored: user={}, question={}, xp={}, stars={}, streak={}, special={}",
            event.user_id,
            event.question_id,
            reward.xp,
            reward.stars,
            reward.streak,
            reward.special_rewards.len()
        );
        reward
    }

    /// Pure scoring plus the comeback check against the learner's context
    pub async fn evaluate(&self, event: &AnswerEvent) -> RewardBundle {
        let correct_label = if event.is_correct { "true" } else { "false" };
        ANSWERS_EVALUATED_TOTAL
            .with_label_values(&[correct_label])
            .inc();

        if !event.is_correct {
            return RewardBundle {
                xp: INCORRECT_XP,
                stars: stars_for(INCORRECT_XP),
                special_rewards: Vec::new(),
                streak: 0,
            };
        }

        let xp = base_xp(event.difficulty, true, event.elapsed_seconds) + streak_bonus(event.streak);

        let mut special_rewards: Vec<SpecialReward> = Vec::new();
        if event.elapsed_seconds < SPEED_REWARD_SECONDS {
            special_rewards.push(RewardKind::Speed.into());
        }
        if event.difficulty >= DIFFICULTY_REWARD_MIN {
            special_rewards.push(RewardKind::Difficulty.into());
        }
        let context = self
            .context
            .build(&event.user_id, &event.category_id)
            .await;
        if context.is_struggling {
            special_rewards.push(RewardKind::Comeback.into());
        }

        for reward in &special_rewards {
            SPECIAL_REWARDS_TOTAL
                .with_label_values(&[reward.kind.as_str()])
                .inc();
        }

        RewardBundle {
            xp,
            stars: stars_for(xp),
            special_rewards,
            streak: event.streak.saturating_add(1),
        }
    }

    /// Spawns the storage write; failures go to the error sink
    pub fn record_in_background(&self, event: AnswerEvent) -> JoinHandle<()> {
        let history = self.history.clone();
        let error_sink = self.error_sink.clone();
        let retry = self.retry.clone();

        tokio::spawn(async move {
            let result = retry_async_with_config("record_answer", &retry, || {
                track_repository_call("record_answer", history.record_answer(&event))
            })
            .await;

            match result {
                Ok(()) => tracing::debug!(
                    "Answer recorded: user={}, question={}",
                    event.user_id,
                    event.question_id
                ),
                Err(e) => error_sink.report(PersistenceFailure {
                    error: e.to_string(),
                    attempts: retry.max_attempts,
                    event,
                }),
            }
        })
    }
}

/// 5 for a wrong answer; otherwise `10 + difficulty * 5` plus a time bonus
/// of 10 under ten seconds or 5 under twenty
pub fn base_xp(difficulty: f64, is_correct: bool, elapsed_seconds: f64) -> f64 {
    if !is_correct {
        return INCORRECT_XP;
    }

    let time_bonus = if elapsed_seconds < 10.0 {
        10.0
    } else if elapsed_seconds < 20.0 {
        5.0
    } else {
        0.0
    };
    CORRECT_BASE_XP + difficulty * XP_PER_DIFFICULTY + time_bonus
}

pub fn streak_bonus(streak: u32) -> f64 {
    (f64::from(streak) * STREAK_XP_STEP).min(STREAK_XP_CAP)
}

pub fn stars_for(xp: f64) -> u32 {
    (xp / 10.0).ceil().max(0.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_xp_time_bonus_steps() {
        assert_eq!(base_xp(2.0, true, 9.9), 30.0);
        assert_eq!(base_xp(2.0, true, 10.0), 25.0);
        assert_eq!(base_xp(2.0, true, 19.9), 25.0);
        assert_eq!(base_xp(2.0, true, 20.0), 20.0);
        assert_eq!(base_xp(5.0, false, 1.0), 5.0);
    }

    #[test]
    fn streak_bonus_is_capped() {
        assert_eq!(streak_bonus(0), 0.0);
        assert_eq!(streak_bonus(3), 15.0);
        assert_eq!(streak_bonus(10), 50.0);
        assert_eq!(streak_bonus(40), 50.0);
    }

    #[test]
    fn stars_round_up() {
        assert_eq!(stars_for(55.0), 6);
        assert_eq!(stars_for(50.0), 5);
        assert_eq!(stars_for(5.0), 1);
        assert_eq!(stars_for(22.5), 3);
    }
}
