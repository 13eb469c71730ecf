use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::context::UserContext;
use super::question::CandidateQuestion;

/// Seconds budgeted per question when estimating session length
pub const SECONDS_PER_QUESTION_ESTIMATE: u32 = 30;

/// Built-in session modes. Resolved once per session, read-only afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    Practice,
    Daily,
    Challenge,
    Speed,
}

impl SessionMode {
    pub const ALL: [SessionMode; 4] = [
        SessionMode::Practice,
        SessionMode::Daily,
        SessionMode::Challenge,
        SessionMode::Speed,
    ];

    /// Resolves a mode by name. Missing and unrecognised names fall back to
    /// `Daily`; this is product behaviour, not an error path.
    pub fn resolve(name: Option<&str>) -> Self {
        match name {
            Some("practice") => SessionMode::Practice,
            Some("daily") => SessionMode::Daily,
            Some("challenge") => SessionMode::Challenge,
            Some("speed") => SessionMode::Speed,
            Some(other) => {
                tracing::debug!("Unknown session mode '{}', using daily", other);
                SessionMode::Daily
            }
            None => SessionMode::Daily,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionMode::Practice => "practice",
            SessionMode::Daily => "daily",
            SessionMode::Challenge => "challenge",
            SessionMode::Speed => "speed",
        }
    }

    pub fn config(&self) -> SessionModeConfig {
        match self {
            // Zero pressure, pure learning
            SessionMode::Practice => SessionModeConfig {
                question_count: 5,
                lives: LivesBudget::Unlimited,
                seconds_per_question: None,
                hints_allowed: 3,
                skip_allowed: true,
                rewards: RewardKnobs {
                    base_xp: 5,
                    streak_multiplier: 1.1,
                    perfect_bonus: 50,
                },
                description: "Practice without pressure".to_string(),
            },
            SessionMode::Daily => SessionModeConfig {
                question_count: 7,
                lives: LivesBudget::Limited(5),
                seconds_per_question: Some(45),
                hints_allowed: 2,
                skip_allowed: false,
                rewards: RewardKnobs {
                    base_xp: 10,
                    streak_multiplier: 1.2,
                    perfect_bonus: 100,
                },
                description: "Your daily brain workout".to_string(),
            },
            // One mistake allowed
            SessionMode::Challenge => SessionModeConfig {
                question_count: 10,
                lives: LivesBudget::Limited(2),
                seconds_per_question: Some(30),
                hints_allowed: 1,
                skip_allowed: false,
                rewards: RewardKnobs {
                    base_xp: 20,
                    streak_multiplier: 1.5,
                    perfect_bonus: 500,
                },
                description: "Test your limits".to_string(),
            },
            SessionMode::Speed => SessionModeConfig {
                question_count: 15,
                lives: LivesBudget::Unlimited,
                seconds_per_question: Some(10),
                hints_allowed: 0,
                skip_allowed: true,
                rewards: RewardKnobs {
                    base_xp: 15,
                    streak_multiplier: 2.0,
                    perfect_bonus: 300,
                },
                description: "How fast can you go?".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LivesBudget {
    Limited(u32),
    Unlimited,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardKnobs {
    pub base_xp: u32,
    pub streak_multiplier: f64,
    pub perfect_bonus: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionModeConfig {
    pub question_count: usize,
    pub lives: LivesBudget,
    /// `None` means untimed
    pub seconds_per_question: Option<u32>,
    pub hints_allowed: u32,
    pub skip_allowed: bool,
    pub rewards: RewardKnobs,
    pub description: String,
}

/// Question counts per difficulty tier. Shares are rounded up independently,
/// so the total may exceed the requested count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionPlan {
    pub easy: usize,
    pub review: usize,
    pub normal: usize,
    pub hard: usize,
}

impl DistributionPlan {
    pub fn total(&self) -> usize {
        self.easy + self.review + self.normal + self.hard
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionRole {
    WarmUp,
    Peak,
    Cooldown,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DifficultyLabel {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionMetadata {
    pub position_role: PositionRole,
    pub difficulty_label: DifficultyLabel,
    pub encouragement: Option<String>,
    pub hints_available: u32,
    pub skip_available: bool,
    pub is_review: bool,
    pub is_challenge: bool,
    pub is_confidence_builder: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedQuestion {
    #[serde(flatten)]
    pub question: CandidateQuestion,
    pub metadata: QuestionMetadata,
}

/// Everything a caller needs to run one quiz session. Not persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionBundle {
    pub session_id: String,
    pub user_id: String,
    pub category_id: String,
    pub mode: SessionMode,
    pub config: SessionModeConfig,
    pub questions: Vec<AnnotatedQuestion>,
    pub user_context: UserContext,
    pub requested_count: usize,
    pub estimated_seconds: u32,
    pub created_at: DateTime<Utc>,
}

impl SessionBundle {
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// A short session is valid; it is surfaced, never padded
    pub fn is_underfilled(&self) -> bool {
        self.questions.len() < self.requested_count
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSessionRequest {
    #[validate(length(min = 1, message = "user_id must not be empty"))]
    pub user_id: String,
    #[validate(length(min = 1, message = "category_id must not be empty"))]
    pub category_id: String,
    pub mode: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_modes_resolve_by_name() {
        for mode in SessionMode::ALL {
            assert_eq!(SessionMode::resolve(Some(mode.as_str())), mode);
        }
    }

    #[test]
    fn unknown_or_missing_mode_falls_back_to_daily() {
        assert_eq!(SessionMode::resolve(Some("marathon")), SessionMode::Daily);
        assert_eq!(SessionMode::resolve(Some("")), SessionMode::Daily);
        assert_eq!(SessionMode::resolve(None), SessionMode::Daily);
    }

    #[test]
    fn mode_configs_match_catalogue() {
        let practice = SessionMode::Practice.config();
        assert_eq!(practice.question_count, 5);
        assert_eq!(practice.lives, LivesBudget::Unlimited);
        assert_eq!(practice.seconds_per_question, None);

        let daily = SessionMode::Daily.config();
        assert_eq!(daily.question_count, 7);
        assert_eq!(daily.lives, LivesBudget::Limited(5));
        assert_eq!(daily.seconds_per_question, Some(45));

        let challenge = SessionMode::Challenge.config();
        assert_eq!(challenge.question_count, 10);
        assert_eq!(challenge.rewards.perfect_bonus, 500);

        let speed = SessionMode::Speed.config();
        assert_eq!(speed.question_count, 15);
        assert_eq!(speed.hints_allowed, 0);
        assert!(speed.skip_allowed);
    }

    #[test]
    fn distribution_plan_total_sums_tiers() {
        let plan = DistributionPlan {
            easy: 5,
            review: 0,
            normal: 3,
            hard: 1,
        };
        assert_eq!(plan.total(), 9);
    }
}
