use std::sync::Arc;
use uuid::Uuid;

use super::context_service::ContextBuilder;
use super::distribution::plan_distribution;
use super::flow_sequencer::{sequence, FlowPattern};
use super::personalization::annotate;
use super::question_selector::QuestionSelector;
use crate::error::EngineError;
use crate::metrics::{SESSIONS_ASSEMBLED_TOTAL, SESSIONS_UNDERFILLED_TOTAL};
use crate::models::session::SECONDS_PER_QUESTION_ESTIMATE;
use crate::models::{SessionBundle, SessionMode};
use crate::utils::time::Clock;

/// Sole entry point for building a quiz session
pub struct SessionService {
    context: Arc<ContextBuilder>,
    selector: QuestionSelector,
    clock: Arc<dyn Clock>,
}

impl SessionService {
    pub fn new(
        context: Arc<ContextBuilder>,
        selector: QuestionSelector,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            context,
            selector,
            clock,
        }
    }

    /// Context → plan → selection → flow → annotation. No retries; a
    /// session with no questions at all is an error, a short one is not.
    pub async fn create_session(
        &self,
        user_id: &str,
        category_id: &str,
        mode_name: Option<&str>,
    ) -> Result<SessionBundle, EngineError> {
        let mode = SessionMode::resolve(mode_name);
        let config = mode.config();
        let requested_count = config.question_count;

        tracing::info!(
            "Assembling session: user={}, category={}, mode={}",
            user_id,
            category_id,
            mode.as_str()
        );

        let context = self.context.build(user_id, category_id).await;
        let plan = plan_distribution(&context, requested_count);
        tracing::debug!(
            "Distribution for user={}: easy={}, review={}, normal={}, hard={}",
            user_id,
            plan.easy,
            plan.review,
            plan.normal,
            plan.hard
        );

        let selected = match self
            .selector
            .select(user_id, category_id, requested_count, &context, &plan)
            .await
        {
            Ok(selected) => selected,
            Err(e) => {
                SESSIONS_ASSEMBLED_TOTAL
                    .with_label_values(&[mode.as_str(), "no_content"])
                    .inc();
                return Err(e);
            }
        };

        let pattern = FlowPattern::for_context(&context);
        let questions = annotate(sequence(selected, &context), &context);

        let bundle = SessionBundle {
            session_id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            category_id: category_id.to_string(),
            mode,
            estimated_seconds: requested_count as u32 * SECONDS_PER_QUESTION_ESTIMATE,
            config,
            questions,
            user_context: context,
            requested_count,
            created_at: self.clock.now(),
        };

        SESSIONS_ASSEMBLED_TOTAL
            .with_label_values(&[mode.as_str(), "ok"])
            .inc();
        if bundle.is_underfilled() {
            SESSIONS_UNDERFILLED_TOTAL
                .with_label_values(&[mode.as_str()])
                .inc();
            tracing::warn!(
                "Session {} underfilled: {} of {} questions",
                bundle.session_id,
                bundle.len(),
                requested_count
            );
        }

        tracing::info!(
            "Session assembled: id={}, questions={}, pattern={:?}",
            bundle.session_id,
            bundle.len(),
            pattern
        );
        Ok(bundle)
    }
}
