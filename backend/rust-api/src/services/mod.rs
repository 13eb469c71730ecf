use chrono::Duration;
use std::sync::Arc;

use crate::config::Config;
use crate::repositories::{HistoryRepository, QuestionRepository};
use crate::utils::retry::RetryConfig;
use crate::utils::time::{Clock, SystemClock};

pub mod answer_service;
pub mod context_service;
pub mod distribution;
pub mod error_sink;
pub mod flow_sequencer;
pub mod motivation_service;
pub mod personalization;
pub mod question_selector;
pub mod session_service;

use answer_service::AnswerService;
use context_service::ContextBuilder;
use error_sink::{ErrorSink, TracingErrorSink};
use motivation_service::MotivationService;
use question_selector::QuestionSelector;
use session_service::SessionService;

/// Engine services wired once per process and shared by handlers.
///
/// Session assembly, answer evaluation and motivation share one
/// `ContextBuilder`, and therefore one context cache.
pub struct AppState {
    pub config: Config,
    pub sessions: SessionService,
    pub answers: AnswerService,
    pub motivation: MotivationService,
}

impl AppState {
    pub fn new(
        config: Config,
        questions: Arc<dyn QuestionRepository>,
        history: Arc<dyn HistoryRepository>,
    ) -> Self {
        Self::with_dependencies(
            config,
            questions,
            history,
            Arc::new(SystemClock),
            Arc::new(TracingErrorSink),
        )
    }

    pub fn with_dependencies(
        config: Config,
        questions: Arc<dyn QuestionRepository>,
        history: Arc<dyn HistoryRepository>,
        clock: Arc<dyn Clock>,
        error_sink: Arc<dyn ErrorSink>,
    ) -> Self {
        let ttl = Duration::seconds(config.context_cache_ttl_seconds);
        let context = Arc::new(ContextBuilder::new(history.clone(), ttl, clock.clone()));

        tracing::info!(
            "Engine ready: context cache ttl={}s, record attempts={}",
            config.context_cache_ttl_seconds,
            config.record_answer_attempts
        );

        Self {
            sessions: SessionService::new(
                context.clone(),
                QuestionSelector::new(questions),
                clock.clone(),
            ),
            answers: AnswerService::new(
                context.clone(),
                history,
                error_sink,
                RetryConfig::with_attempts(config.record_answer_attempts),
            ),
            motivation: MotivationService::new(context, clock),
            config,
        }
    }
}
