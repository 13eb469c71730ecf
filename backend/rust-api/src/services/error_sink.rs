use tokio::sync::mpsc;

use crate::metrics::ANSWER_PERSISTENCE_FAILURES_TOTAL;
use crate::models::AnswerEvent;

/// An answer record that could not be stored after all retries
#[derive(Debug, Clone, PartialEq)]
pub struct PersistenceFailure {
    pub event: AnswerEvent,
    pub error: String,
    pub attempts: usize,
}

/// Receives failures from background work that has no caller to return to
pub trait ErrorSink: Send + Sync {
    fn report(&self, failure: PersistenceFailure);
}

/// Logs and counts failures
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingErrorSink;

impl ErrorSink for TracingErrorSink {
    fn report(&self, failure: PersistenceFailure) {
        ANSWER_PERSISTENCE_FAILURES_TOTAL.inc();
        tracing::error!(
            "Answer record lost after {} attempt(s): user={}, category={}, question={}, error={}",
            failure.attempts,
            failure.event.user_id,
            failure.event.category_id,
            failure.event.question_id,
            failure.error
        );
    }
}

/// Forwards failures to a channel, e.g. for a dead-letter consumer
#[derive(Debug, Clone)]
pub struct ChannelErrorSink {
    tx: mpsc::UnboundedSender<PersistenceFailure>,
}

impl ChannelErrorSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PersistenceFailure>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ErrorSink for ChannelErrorSink {
    fn report(&self, failure: PersistenceFailure) {
        ANSWER_PERSISTENCE_FAILURES_TOTAL.inc();
        if let Err(e) = self.tx.send(failure) {
            tracing::error!(
                "Error sink receiver dropped, answer failure for question={} lost",
                e.0.event.question_id
            );
        }
    }
}
