//! Chat session executor

use super::traits::ChatBackend;
use super::Command;
use crate::backend::ChatReply;
use crate::conversation::{ConversationId, ConversationStore, Message, MessageKind};
use crate::render::{SendButtonState, ViewUpdate};
use crate::state_machine::{
    transition, ChatOutcome, Effect, Event, RequestContext, RequestId, RequestState,
    TransitionError,
};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;

const EVENT_CHANNEL_CAPACITY: usize = 32;
const VIEW_CHANNEL_CAPACITY: usize = 256;

/// One chat widget instance: the conversation store, the single outstanding
/// request and the subscribers watching them.
///
/// All mutation happens inside `dispatch` and `handle_event`, which run to
/// completion one at a time. Network calls run on spawned tasks and report
/// back through an internal channel drained by `next_event`.
pub struct ChatSession<B>
where
    B: ChatBackend + 'static,
{
    store: ConversationStore,
    state: RequestState,
    backend: Arc<B>,
    next_request_id: RequestId,
    /// Token to cancel the running chat request
    chat_cancel_token: Option<CancellationToken>,
    event_rx: mpsc::Receiver<Event>,
    event_tx: mpsc::Sender<Event>,
    view_tx: broadcast::Sender<ViewUpdate>,
    sidebar_collapsed: bool,
}

impl<B> ChatSession<B>
where
    B: ChatBackend + 'static,
{
    pub fn new(backend: B, store: ConversationStore) -> Self {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (view_tx, _) = broadcast::channel(VIEW_CHANNEL_CAPACITY);
        Self {
            store,
            state: RequestState::Idle,
            backend: Arc::new(backend),
            next_request_id: RequestId::new(1),
            chat_cancel_token: None,
            event_rx,
            event_tx,
            view_tx,
            sidebar_collapsed: false,
        }
    }

    /// Receive every view update published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<ViewUpdate> {
        self.view_tx.subscribe()
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn request_state(&self) -> &RequestState {
        &self.state
    }

    pub fn is_sidebar_collapsed(&self) -> bool {
        self.sidebar_collapsed
    }

    /// Create the default conversation if there is none and publish the full view.
    pub fn start(&mut self) {
        if self.store.is_empty() {
            self.create_conversation();
        }
        self.publish(ViewUpdate::sidebar(&self.store));
        self.publish_message_pane();
        self.publish(ViewUpdate::SendButton(SendButtonState::for_request(
            &self.state,
        )));
        self.publish(ViewUpdate::SidebarCollapsed(self.sidebar_collapsed));
    }

    /// Event loop for view bindings: starts the session, then applies
    /// commands and network completions until the command channel closes.
    pub async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        tracing::info!("Starting chat session");
        self.start();

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.dispatch(command),
                    None => break,
                },
                Some(event) = self.event_rx.recv() => self.handle_event(event),
            }
        }

        if let Some(token) = self.chat_cancel_token.take() {
            token.cancel();
        }
        tracing::info!("Chat session stopped");
    }

    /// Wait for the next network completion
    pub async fn next_event(&mut self) -> Option<Event> {
        self.event_rx.recv().await
    }

    /// Apply a network completion
    pub fn handle_event(&mut self, event: Event) {
        if let Err(e) = self.apply(event) {
            tracing::error!(error = %e, "Network event rejected");
        }
    }

    pub fn dispatch(&mut self, command: Command) {
        tracing::debug!(?command, "Dispatching command");
        match command {
            Command::Submit(text) => self.submit(text),

            Command::Cancel => {
                if let Err(e) = self.apply(Event::Cancel) {
                    tracing::error!(error = %e, "Cancel rejected");
                }
            }

            Command::NewConversation => {
                self.create_conversation();
                self.publish(ViewUpdate::sidebar(&self.store));
                self.publish_message_pane();
            }

            Command::SwitchConversation(id) => {
                if self.store.switch_conversation(id) {
                    tracing::info!(conv_id = %id, "Switched conversation");
                    self.publish(ViewUpdate::sidebar(&self.store));
                    self.publish_message_pane();
                }
            }

            Command::DeleteConversation(id) => {
                if let Some(deletion) = self.store.delete_conversation(id) {
                    tracing::info!(conv_id = %id, was_active = deletion.was_active, "Deleted conversation");
                    if deletion.was_active {
                        self.execute_effect(Effect::ResetRemoteSession);
                        self.publish_message_pane();
                    }
                    self.publish(ViewUpdate::sidebar(&self.store));
                }
            }

            Command::RenameConversation { id, title } => {
                if let Some(title) = self.store.rename_conversation(id, &title) {
                    tracing::info!(conv_id = %id, %title, "Renamed conversation");
                }
                // Also restores the list after an abandoned edit
                self.publish(ViewUpdate::sidebar(&self.store));
            }

            Command::ClearConversation => {
                let Some(id) = self.store.active_id() else {
                    return;
                };
                match self.store.clear_conversation(id) {
                    Ok(was_active) => {
                        tracing::info!(conv_id = %id, "Cleared conversation");
                        if was_active {
                            self.execute_effect(Effect::ResetRemoteSession);
                        }
                        self.publish_message_pane();
                    }
                    Err(e) => tracing::error!(error = %e, "Failed to clear conversation"),
                }
            }

            Command::ToggleSidebar => {
                self.sidebar_collapsed = !self.sidebar_collapsed;
                self.publish(ViewUpdate::SidebarCollapsed(self.sidebar_collapsed));
            }

            Command::CollapseSidebar => {
                self.sidebar_collapsed = true;
                self.publish(ViewUpdate::SidebarCollapsed(true));
            }
        }
    }

    fn submit(&mut self, text: String) {
        match self.apply(Event::submit(text.clone())) {
            Ok(()) => {}
            Err(TransitionError::NoActiveConversation) => {
                tracing::info!("No active conversation, creating one for submit");
                self.create_conversation();
                self.publish(ViewUpdate::sidebar(&self.store));
                self.publish_message_pane();
                if let Err(e) = self.apply(Event::submit(text)) {
                    tracing::error!(error = %e, "Submit failed after creating conversation");
                }
            }
            Err(e) => tracing::debug!(reason = %e, "Submit ignored"),
        }
    }

    /// Run the pure transition and execute its effects
    fn apply(&mut self, event: Event) -> Result<(), TransitionError> {
        let context = RequestContext::new(self.store.active_id(), self.next_request_id);
        let result = transition(&self.state, &context, event)?;

        let was_pending = self.state.is_pending();
        self.state = result.new_state;

        for effect in result.effects {
            self.execute_effect(effect);
        }

        if !self.state.is_pending() {
            self.chat_cancel_token = None;
        }
        if was_pending != self.state.is_pending() {
            self.publish(ViewUpdate::SendButton(SendButtonState::for_request(
                &self.state,
            )));
        }
        Ok(())
    }

    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::AppendMessage {
                conversation_id,
                message,
            } => self.append_message(conversation_id, message),

            Effect::RequestChat { request_id, text } => self.request_chat(request_id, text),

            Effect::AbortChat { request_id } => {
                if let Some(token) = self.chat_cancel_token.take() {
                    tracing::info!(%request_id, "Cancelling chat request");
                    token.cancel();
                }
            }

            Effect::ShowLoading => {
                self.publish(ViewUpdate::loading_shown());
                self.publish(ViewUpdate::ScrollToEnd);
            }

            Effect::HideLoading => self.publish(ViewUpdate::LoadingHidden),

            Effect::ShowError { text } => {
                tracing::info!(error = %text, "Showing error");
                self.publish(ViewUpdate::error_shown(text));
                self.publish(ViewUpdate::ScrollToEnd);
            }

            Effect::ResetRemoteSession => {
                let backend = self.backend.clone();
                tokio::spawn(async move {
                    if let Err(e) = backend.clear_history().await {
                        tracing::debug!(error = %e, "Ignoring failed history reset");
                    }
                });
            }
        }
    }

    fn request_chat(&mut self, request_id: RequestId, text: String) {
        self.next_request_id = request_id.next();

        let cancel_token = CancellationToken::new();
        self.chat_cancel_token = Some(cancel_token.clone());

        let backend = self.backend.clone();
        let event_tx = self.event_tx.clone();

        tokio::spawn(async move {
            tracing::info!(%request_id, "Sending chat request (background)");

            // Race the request against cancellation
            tokio::select! {
                biased;

                () = cancel_token.cancelled() => {
                    tracing::info!(%request_id, "Chat request cancelled");
                    let _ = event_tx.send(Event::ChatAborted { request_id }).await;
                }

                result = backend.send_message(&text) => {
                    let outcome = match result {
                        Ok(reply) => outcome_from_reply(reply),
                        Err(e) => {
                            tracing::warn!(%request_id, kind = ?e.kind, error = %e, "Chat request failed");
                            ChatOutcome::TransportFailed { reason: e.message }
                        }
                    };
                    let _ = event_tx
                        .send(Event::ChatCompleted { request_id, outcome })
                        .await;
                }
            }
        });
    }

    fn append_message(&mut self, conversation_id: ConversationId, message: Message) {
        let kind = message.kind;
        match self.store.append_message(conversation_id, message.clone()) {
            Ok(appended) => {
                if self.store.active_id() == Some(conversation_id) {
                    self.publish(ViewUpdate::message_appended(
                        conversation_id,
                        message,
                        appended.index,
                    ));
                    self.publish(ViewUpdate::ScrollToEnd);
                }
                if appended.title_changed {
                    self.publish(ViewUpdate::sidebar(&self.store));
                }
            }
            Err(e) if kind == MessageKind::Bot => {
                tracing::warn!(conv_id = %conversation_id, error = %e, "Conversation was deleted, dropping answer");
            }
            Err(e) => tracing::error!(conv_id = %conversation_id, error = %e, "Failed to append message"),
        }
    }

    fn create_conversation(&mut self) {
        let id = self.store.create_conversation().id;
        tracing::info!(conv_id = %id, "Created conversation");
        self.execute_effect(Effect::ResetRemoteSession);
    }

    fn publish_message_pane(&self) {
        self.publish(ViewUpdate::message_pane(&self.store, &self.state));
        self.publish(ViewUpdate::ScrollToEnd);
    }

    fn publish(&self, update: ViewUpdate) {
        // No subscribers is fine
        let _ = self.view_tx.send(update);
    }
}

fn outcome_from_reply(reply: ChatReply) -> ChatOutcome {
    match reply {
        ChatReply::Answer(answer) => ChatOutcome::Answer(answer),
        ChatReply::Rejected { error } => ChatOutcome::Rejected { error },
    }
}
