use adaptive_quiz_api::{
    error::EngineError,
    models::{AnswerRecord, CandidateQuestion, UserContext},
    repositories::InMemoryRepository,
    services::{
        distribution::plan_distribution, flow_sequencer::sequence,
        question_selector::QuestionSelector,
    },
};
use chrono::{Duration, Utc};
use std::collections::HashSet;
use std::sync::Arc;

mod common;

use common::question;

const LEARNER: &str = "learner-1";

/// Twenty questions at every half step from 1.0 to 5.0
fn ample_bank() -> Vec<CandidateQuestion> {
    let mut bank = Vec::new();
    for step in 2..=10 {
        for n in 0..20 {
            bank.push(question(
                &format!("a-{}-{}", step, n),
                f64::from(step) / 2.0,
                &[],
            ));
        }
    }
    bank
}

fn record_miss(repo: &InMemoryRepository, question_id: &str) {
    record_miss_for(repo, LEARNER, question_id, 1);
}

fn record_miss_for(repo: &InMemoryRepository, user_id: &str, question_id: &str, days_ago: i64) {
    repo.push_answer(
        user_id,
        common::CATEGORY,
        AnswerRecord {
            question_id: question_id.to_string(),
            is_correct: false,
            time_spent_seconds: 30.0,
            difficulty: 3.0,
            topics: vec![],
            answered_at: Utc::now() - Duration::days(days_ago),
        },
    )
    .unwrap();
}

fn ids(questions: &[CandidateQuestion]) -> Vec<&str> {
    questions.iter().map(|q| q.id.as_str()).collect()
}

#[tokio::test]
async fn test_new_user_selection_keeps_tier_prefix_after_truncation() {
    let repo = InMemoryRepository::new().without_shuffle().with_questions(vec![
        question("e1", 1.0, &[]),
        question("e2", 1.0, &[]),
        question("e3", 1.0, &[]),
        question("e4", 1.0, &[]),
        question("e5", 1.0, &[]),
        question("n1", 1.2, &[]),
        question("n2", 1.2, &[]),
        question("n3", 1.2, &[]),
        question("h1", 2.0, &[]),
    ]);
    let selector = QuestionSelector::new(Arc::new(repo));
    let context = UserContext::default();

    let plan = plan_distribution(&context, 7);
    assert_eq!((plan.easy, plan.review, plan.normal, plan.hard), (5, 0, 3, 1));

    let selected = selector
        .select(LEARNER, common::CATEGORY, 7, &context, &plan)
        .await
        .unwrap();

    // Plan asks for 9; the hard pick and the last normal pick fall off
    assert_eq!(ids(&selected), vec!["e1", "e2", "e3", "e4", "e5", "n1", "n2"]);
}

#[tokio::test]
async fn test_selection_never_exceeds_and_fills_with_ample_supply() {
    for skill_level in 1..=5u8 {
        let review_difficulty = if skill_level <= 3 { 5.0 } else { 1.0 };
        let repo = InMemoryRepository::new().with_questions(ample_bank());
        let mut mistakes = Vec::new();
        for n in 0..5 {
            let id = format!("review-{}", n);
            repo.insert_question(question(&id, review_difficulty, &[]))
                .unwrap();
            record_miss(&repo, &id);
            mistakes.push(id);
        }
        let selector = QuestionSelector::new(Arc::new(repo));

        let states = [(true, false, false), (false, true, false), (false, false, true), (false, false, false)];
        for (is_new, is_struggling, is_excelling) in states {
            let context = UserContext {
                skill_level,
                is_new,
                is_struggling,
                is_excelling,
                common_mistake_ids: mistakes.clone(),
                ..UserContext::default()
            };

            for total in 1..=15 {
                let plan = plan_distribution(&context, total);
                let selected = selector
                    .select(LEARNER, common::CATEGORY, total, &context, &plan)
                    .await
                    .unwrap();

                assert_eq!(
                    selected.len(),
                    total,
                    "skill={} new={} struggling={} excelling={}",
                    skill_level,
                    is_new,
                    is_struggling,
                    is_excelling
                );
                let unique: HashSet<&str> = ids(&selected).into_iter().collect();
                assert_eq!(unique.len(), total);

                let ordered = sequence(selected, &context);
                assert_eq!(ordered.len(), total);
            }
        }
    }
}

#[tokio::test]
async fn test_review_candidates_are_marked() {
    let repo = InMemoryRepository::new()
        .without_shuffle()
        .with_questions(ample_bank());
    repo.insert_question(question("missed", 5.0, &[])).unwrap();
    record_miss(&repo, "missed");
    let selector = QuestionSelector::new(Arc::new(repo));
    let context = UserContext {
        skill_level: 2,
        is_new: false,
        is_struggling: true,
        common_mistake_ids: vec!["missed".to_string(), "never-missed".to_string()],
        ..UserContext::default()
    };

    let plan = plan_distribution(&context, 10);
    let selected = selector
        .select(LEARNER, common::CATEGORY, 10, &context, &plan)
        .await
        .unwrap();

    let reviews: Vec<&CandidateQuestion> = selected.iter().filter(|q| q.is_review).collect();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].id, "missed");
    assert!(selected.iter().all(|q| q.id != "never-missed"));
}

#[tokio::test]
async fn test_review_ignores_other_learners_recent_misses() {
    let repo = InMemoryRepository::new()
        .without_shuffle()
        .with_questions(ample_bank());
    repo.insert_question(question("old-miss", 5.0, &[])).unwrap();
    record_miss_for(&repo, LEARNER, "old-miss", 30);
    record_miss_for(&repo, "someone-else", "old-miss", 1);
    let selector = QuestionSelector::new(Arc::new(repo));
    let context = UserContext {
        skill_level: 2,
        is_new: false,
        is_struggling: true,
        common_mistake_ids: vec!["old-miss".to_string()],
        ..UserContext::default()
    };

    let plan = plan_distribution(&context, 10);
    assert!(plan.review > 0);
    let selected = selector
        .select(LEARNER, common::CATEGORY, 10, &context, &plan)
        .await
        .unwrap();

    assert!(selected.iter().all(|q| !q.is_review));
    assert!(selected.iter().all(|q| q.id != "old-miss"));
}

#[tokio::test]
async fn test_failed_band_queries_degrade_to_surprise() {
    let inner = InMemoryRepository::new()
        .without_shuffle()
        .with_questions(common::full_bank());
    let selector = QuestionSelector::new(Arc::new(common::FlakyQuestions::new(inner)));
    let context = UserContext::default();

    let plan = plan_distribution(&context, 7);
    let selected = selector
        .select(LEARNER, common::CATEGORY, 7, &context, &plan)
        .await
        .unwrap();

    assert_eq!(ids(&selected), vec!["q-2-0"]);
}

#[tokio::test]
async fn test_empty_category_is_no_content() {
    let repo = InMemoryRepository::new().with_questions(common::full_bank());
    let selector = QuestionSelector::new(Arc::new(repo));
    let context = UserContext::default();
    let plan = plan_distribution(&context, 5);

    let err = selector
        .select(LEARNER, "geography", 5, &context, &plan)
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::NoContentAvailable { ref category_id } if category_id == "geography"));
}
