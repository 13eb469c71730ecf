use serde::Serialize;

use crate::models::{CandidateQuestion, UserContext};

/// Lists this short are served in selection order
const MIN_SEQUENCED_LEN: usize = 4;
const EASY_CEILING: f64 = 2.0;
const MEDIUM_CEILING: f64 = 3.5;
const MOUNTAIN_PEAK_SHARE: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowPattern {
    /// Easy start, cushioned hard items, easy finish
    GentleWave,
    /// Steady climb to a peak at 80%, then taper
    MountainClimb,
    /// Easy third, hardest third, middle third
    ClassicFlow,
}

impl FlowPattern {
    pub fn for_context(context: &UserContext) -> Self {
        if context.is_struggling {
            FlowPattern::GentleWave
        } else if context.is_excelling {
            FlowPattern::MountainClimb
        } else {
            FlowPattern::ClassicFlow
        }
    }
}

/// Reorders selected questions into the pacing pattern for this learner.
/// Always returns a permutation of the input.
pub fn sequence(questions: Vec<CandidateQuestion>, context: &UserContext) -> Vec<CandidateQuestion> {
    if questions.len() < MIN_SEQUENCED_LEN {
        return questions;
    }

    let mut sorted = questions;
    sorted.sort_by(|a, b| a.difficulty.total_cmp(&b.difficulty));

    match FlowPattern::for_context(context) {
        FlowPattern::GentleWave => gentle_wave(sorted),
        FlowPattern::MountainClimb => mountain_climb(sorted),
        FlowPattern::ClassicFlow => classic_flow(sorted),
    }
}

fn gentle_wave(sorted: Vec<CandidateQuestion>) -> Vec<CandidateQuestion> {
    let mut easy = Vec::new();
    let mut medium = Vec::new();
    let mut hard = Vec::new();
    for question in sorted {
        if question.difficulty <= EASY_CEILING {
            easy.push(question);
        } else if question.difficulty <= MEDIUM_CEILING {
            medium.push(question);
        } else {
            hard.push(question);
        }
    }

    let opening = easy.len().min(2);
    let mut result: Vec<CandidateQuestion> = easy.drain(..opening).collect();
    result.extend(medium);
    if !hard.is_empty() {
        let mid = result.len() / 2;
        result.splice(mid..mid, hard);
    }
    result.extend(easy);
    result
}

fn mountain_climb(mut sorted: Vec<CandidateQuestion>) -> Vec<CandidateQuestion> {
    let peak = (sorted.len() as f64 * MOUNTAIN_PEAK_SHARE).floor() as usize;
    sorted[peak..].reverse();
    sorted
}

fn classic_flow(mut sorted: Vec<CandidateQuestion>) -> Vec<CandidateQuestion> {
    let len = sorted.len();
    let third = len.div_ceil(3);
    let tail_start = (len - third).max(third);

    let hardest = sorted.split_off(tail_start);
    let middle = sorted.split_off(third);

    let mut result = sorted;
    result.extend(hardest);
    result.extend(middle);
    result
}
