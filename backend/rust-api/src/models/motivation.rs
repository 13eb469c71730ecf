use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Encouragement,
    Celebration,
    Streak,
    Greeting,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotivationalMessage {
    pub message: String,
    pub kind: MessageKind,
    pub action_hint: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct MotivationQuery {
    #[validate(length(min = 1, message = "user_id must not be empty"))]
    pub user_id: String,
    #[validate(length(min = 1, message = "category_id must not be empty"))]
    pub category_id: String,
    /// Share of correct answers in the current session
    #[validate(range(min = 0.0, max = 1.0, message = "correct_ratio must be within 0..=1"))]
    #[serde(default)]
    pub correct_ratio: f64,
}
