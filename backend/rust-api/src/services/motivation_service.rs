use chrono::Timelike;
use std::sync::Arc;

use super::context_service::ContextBuilder;
use crate::models::{MessageKind, MotivationalMessage, UserContext};
use crate::utils::time::Clock;

/// Context-aware encouragement shown between sessions
pub struct MotivationService {
    context: Arc<ContextBuilder>,
    clock: Arc<dyn Clock>,
}

impl MotivationService {
    pub fn new(context: Arc<ContextBuilder>, clock: Arc<dyn Clock>) -> Self {
        Self { context, clock }
    }

    pub async fn message_for(
        &self,
        user_id: &str,
        category_id: &str,
        correct_ratio: f64,
    ) -> MotivationalMessage {
        let context = self.context.build(user_id, category_id).await;
        motivational_message(&context, correct_ratio, self.clock.now().hour())
    }
}

pub fn motivational_message(
    context: &UserContext,
    correct_ratio: f64,
    hour: u32,
) -> MotivationalMessage {
    if context.is_struggling && correct_ratio < 0.5 {
        return MotivationalMessage {
            message: "Every expert was once a beginner. You're improving!".to_string(),
            kind: MessageKind::Encouragement,
            action_hint: Some("Try Practice Mode for unlimited attempts".to_string()),
        };
    }

    if context.is_excelling && correct_ratio > 0.8 {
        return MotivationalMessage {
            message: "You're on fire! Ready for Challenge Mode?".to_string(),
            kind: MessageKind::Celebration,
            action_hint: Some("Unlock Challenge Mode with 2 more perfect quizzes".to_string()),
        };
    }

    if context.play_streak_days >= 7 {
        return MotivationalMessage {
            message: format!(
                "{} day streak! You're unstoppable!",
                context.play_streak_days
            ),
            kind: MessageKind::Streak,
            action_hint: Some("Keep your streak alive tomorrow".to_string()),
        };
    }

    let message = match hour {
        0..=11 => "Great morning brain workout!",
        12..=16 => "Afternoon learning boost!",
        _ => "Evening brain training!",
    };
    MotivationalMessage {
        message: message.to_string(),
        kind: MessageKind::Greeting,
        action_hint: None,
    }
}
