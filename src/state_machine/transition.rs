//! Pure state transition function

use super::{ChatOutcome, Effect, Event, RequestContext, RequestState};
use thiserror::Error;

/// Shown when the endpoint rejects a message without saying why
pub const UNKNOWN_ERROR_TEXT: &str = "An unknown error occurred";

/// Shown for every transport-level failure
pub const NETWORK_ERROR_TEXT: &str = "Network error, please try again later";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: RequestState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: RequestState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    #[must_use]
    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Submissions the controller refuses
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Message is empty")]
    EmptyMessage,
    #[error("A request is already pending (cancel it first)")]
    RequestPending,
    #[error("No active conversation")]
    NoActiveConversation,
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs, with no I/O.
pub fn transition(
    state: &RequestState,
    context: &RequestContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (*state, event) {
        // ============================================================
        // Submission
        // ============================================================
        (_, Event::Submit { text }) if text.trim().is_empty() => Err(TransitionError::EmptyMessage),

        (RequestState::Pending { .. }, Event::Submit { .. }) => {
            Err(TransitionError::RequestPending)
        }

        (RequestState::Idle, Event::Submit { text }) => {
            let conversation_id = context
                .active_conversation
                .ok_or(TransitionError::NoActiveConversation)?;
            let request_id = context.next_request_id;
            let text = text.trim().to_string();

            Ok(TransitionResult::new(RequestState::Pending {
                request_id,
                conversation_id,
            })
            .with_effect(Effect::append_user_message(conversation_id, text.clone()))
            .with_effect(Effect::ShowLoading)
            .with_effect(Effect::RequestChat { request_id, text }))
        }

        // ============================================================
        // Cancellation (idempotent)
        // ============================================================
        (RequestState::Idle, Event::Cancel) => Ok(TransitionResult::new(RequestState::Idle)),

        (RequestState::Pending { request_id, .. }, Event::Cancel) => {
            Ok(TransitionResult::new(RequestState::Idle)
                .with_effect(Effect::AbortChat { request_id })
                .with_effect(Effect::HideLoading))
        }

        // ============================================================
        // Completion of the outstanding request
        // ============================================================
        (
            RequestState::Pending {
                request_id,
                conversation_id,
            },
            Event::ChatCompleted {
                request_id: completed,
                outcome,
            },
        ) if completed == request_id => {
            let outcome_effect = match outcome {
                ChatOutcome::Answer(answer) => Effect::append_bot_message(conversation_id, answer),
                ChatOutcome::Rejected { error } => Effect::show_error(
                    error
                        .filter(|e| !e.trim().is_empty())
                        .unwrap_or_else(|| UNKNOWN_ERROR_TEXT.to_string()),
                ),
                ChatOutcome::TransportFailed { .. } => Effect::show_error(NETWORK_ERROR_TEXT),
            };
            // Loading goes first so the answer lands where the indicator was
            Ok(TransitionResult::new(RequestState::Idle)
                .with_effects([Effect::HideLoading, outcome_effect]))
        }

        (
            RequestState::Pending { request_id, .. },
            Event::ChatAborted {
                request_id: aborted,
            },
        ) if aborted == request_id => {
            Ok(TransitionResult::new(RequestState::Idle).with_effect(Effect::HideLoading))
        }

        // Late results of cancelled requests are dropped
        (state, Event::ChatCompleted { .. } | Event::ChatAborted { .. }) => {
            Ok(TransitionResult::new(state))
        }
    }
}
