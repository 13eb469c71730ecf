use serde::{Deserialize, Serialize};
use validator::Validate;

/// A single answer as reported by the caller. Also the request body of
/// `POST /api/v1/answers`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct AnswerEvent {
    #[validate(length(min = 1, message = "user_id must not be empty"))]
    pub user_id: String,
    #[validate(length(min = 1, message = "category_id must not be empty"))]
    pub category_id: String,
    #[validate(length(min = 1, message = "question_id must not be empty"))]
    pub question_id: String,
    pub is_correct: bool,
    #[validate(range(min = 0.0, message = "elapsed_seconds must not be negative"))]
    pub elapsed_seconds: f64,
    #[validate(range(min = 1.0, max = 5.0, message = "difficulty must be within 1..=5"))]
    pub difficulty: f64,
    /// Running streak before this answer, tracked by the caller
    #[serde(default)]
    pub streak: u32,
    #[serde(default)]
    pub topics: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardKind {
    Speed,
    Difficulty,
    Comeback,
}

impl RewardKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RewardKind::Speed => "speed",
            RewardKind::Difficulty => "difficulty",
            RewardKind::Comeback => "comeback",
        }
    }

    pub fn bonus_xp(&self) -> f64 {
        match self {
            RewardKind::Speed => 10.0,
            RewardKind::Difficulty => 15.0,
            RewardKind::Comeback => 20.0,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            RewardKind::Speed => "Lightning Fast!",
            RewardKind::Difficulty => "Big Brain!",
            RewardKind::Comeback => "Great Comeback!",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialReward {
    pub kind: RewardKind,
    pub xp: f64,
    pub message: String,
}

impl From<RewardKind> for SpecialReward {
    fn from(kind: RewardKind) -> Self {
        Self {
            kind,
            xp: kind.bonus_xp(),
            message: kind.message().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardBundle {
    /// Base XP plus streak bonus; special reward XP is reported separately
    pub xp: f64,
    pub stars: u32,
    pub special_rewards: Vec<SpecialReward>,
    pub streak: u32,
}

impl RewardBundle {
    pub fn has_reward(&self, kind: RewardKind) -> bool {
        self.special_rewards.iter().any(|reward| reward.kind == kind)
    }
}
