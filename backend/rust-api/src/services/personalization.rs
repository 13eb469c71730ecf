use crate::models::{
    AnnotatedQuestion, CandidateQuestion, DifficultyLabel, PositionRole, QuestionMetadata,
    UserContext,
};

const PEAK_SHARE: f64 = 0.7;
const LOW_MOTIVATION: f64 = 0.5;

pub fn difficulty_label(difficulty: f64, skill_level: u8) -> DifficultyLabel {
    let delta = difficulty - f64::from(skill_level);
    if delta <= -1.0 {
        DifficultyLabel::Easy
    } else if delta >= 1.0 {
        DifficultyLabel::Hard
    } else {
        DifficultyLabel::Medium
    }
}

/// Warm-up wins over peak, peak over cooldown
pub fn position_role(index: usize, total: usize) -> PositionRole {
    let peak = (total as f64 * PEAK_SHARE).floor() as usize;
    if index < 2 {
        PositionRole::WarmUp
    } else if index == peak {
        PositionRole::Peak
    } else if index + 2 >= total {
        PositionRole::Cooldown
    } else {
        PositionRole::None
    }
}

pub fn encouragement(index: usize, total: usize, context: &UserContext) -> Option<&'static str> {
    if index == 0 {
        Some("Let's start easy!")
    } else if index == total / 2 {
        Some("Halfway there!")
    } else if index + 1 == total {
        Some("Last question!")
    } else if context.is_struggling && index == 2 {
        Some("You're doing great! Keep going!")
    } else {
        None
    }
}

/// Attaches UI and pedagogy hints to each question, in order
pub fn annotate(questions: Vec<CandidateQuestion>, context: &UserContext) -> Vec<AnnotatedQuestion> {
    let total = questions.len();
    let skill = context.skill();
    let hints_available = if context.is_struggling { 2 } else { 1 };

    questions
        .into_iter()
        .enumerate()
        .map(|(index, question)| {
            let metadata = QuestionMetadata {
                position_role: position_role(index, total),
                difficulty_label: difficulty_label(question.difficulty, context.skill_level),
                encouragement: encouragement(index, total, context).map(str::to_string),
                hints_available,
                skip_available: context.motivation < LOW_MOTIVATION
                    && index as f64 > total as f64 / 2.0,
                is_review: question.is_review,
                is_challenge: question.difficulty > skill,
                is_confidence_builder: question.difficulty < skill,
            };
            AnnotatedQuestion { question, metadata }
        })
        .collect()
}
