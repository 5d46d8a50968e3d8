//! Mock implementations for testing
//!
//! These mocks enable session tests without real I/O.

use super::traits::ChatBackend;
use super::{ChatSession, Command};
use crate::backend::{ChatError, ChatReply};
use crate::conversation::{ConversationStore, Message};
use crate::render::ViewUpdate;
use crate::state_machine::Event;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, Notify};

// ============================================================================
// Mock Chat Backend
// ============================================================================

/// Mock backend that returns queued replies
pub struct MockChatBackend {
    replies: Mutex<VecDeque<Result<ChatReply, ChatError>>>,
    /// Record of every message sent
    pub requests: Mutex<Vec<String>>,
    clear_history_calls: AtomicUsize,
    fail_clear_history: AtomicBool,
}

impl MockChatBackend {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            clear_history_calls: AtomicUsize::new(0),
            fail_clear_history: AtomicBool::new(false),
        }
    }

    /// Queue a successful answer
    pub fn queue_answer(&self, answer: impl Into<String>) {
        self.queue_reply(Ok(ChatReply::Answer(answer.into())));
    }

    /// Queue an application-level failure
    pub fn queue_rejection(&self, error: Option<&str>) {
        self.queue_reply(Ok(ChatReply::Rejected {
            error: error.map(str::to_string),
        }));
    }

    /// Queue a transport failure
    pub fn queue_error(&self, error: ChatError) {
        self.queue_reply(Err(error));
    }

    fn queue_reply(&self, reply: Result<ChatReply, ChatError>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    /// Make every history reset fail
    pub fn fail_clear_history(&self) {
        self.fail_clear_history.store(true, Ordering::SeqCst);
    }

    pub fn recorded_requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn clear_history_calls(&self) -> usize {
        self.clear_history_calls.load(Ordering::SeqCst)
    }

    fn next_reply(&self) -> Result<ChatReply, ChatError> {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ChatError::network("No mock reply queued")))
    }
}

impl Default for MockChatBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatBackend for MockChatBackend {
    async fn send_message(&self, message: &str) -> Result<ChatReply, ChatError> {
        self.requests.lock().unwrap().push(message.to_string());
        self.next_reply()
    }

    async fn clear_history(&self) -> Result<(), ChatError> {
        self.clear_history_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_clear_history.load(Ordering::SeqCst) {
            Err(ChatError::network("Mock history reset failure"))
        } else {
            Ok(())
        }
    }
}

// ============================================================================
// Delayed Mock Chat Backend (for cancellation testing)
// ============================================================================

/// Mock backend that answers after a delay
pub struct DelayedMockChatBackend {
    inner: MockChatBackend,
    delay: Duration,
    /// Notified when a request starts (for test synchronization)
    pub request_started: Arc<Notify>,
}

impl DelayedMockChatBackend {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MockChatBackend::new(),
            delay,
            request_started: Arc::new(Notify::new()),
        }
    }

    pub fn queue_answer(&self, answer: impl Into<String>) {
        self.inner.queue_answer(answer);
    }

    pub fn recorded_requests(&self) -> Vec<String> {
        self.inner.recorded_requests()
    }

    pub fn clear_history_calls(&self) -> usize {
        self.inner.clear_history_calls()
    }
}

#[async_trait]
impl ChatBackend for DelayedMockChatBackend {
    async fn send_message(&self, message: &str) -> Result<ChatReply, ChatError> {
        self.inner.requests.lock().unwrap().push(message.to_string());
        // Stores a permit, so a waiter that arrives late still wakes
        self.request_started.notify_one();
        tokio::time::sleep(self.delay).await;
        self.inner.next_reply()
    }

    async fn clear_history(&self) -> Result<(), ChatError> {
        self.inner.clear_history().await
    }
}

// ============================================================================
// Test Session
// ============================================================================

/// Started session plus a subscriber, driven step by step from the test
pub struct TestSession<B: ChatBackend + 'static> {
    pub session: ChatSession<Arc<B>>,
    pub backend: Arc<B>,
    updates: broadcast::Receiver<ViewUpdate>,
}

impl<B: ChatBackend + 'static> TestSession<B> {
    pub fn new(backend: B) -> Self {
        let backend = Arc::new(backend);
        let mut session = ChatSession::new(backend.clone(), ConversationStore::new());
        let updates = session.subscribe();
        session.start();
        Self {
            session,
            backend,
            updates,
        }
    }

    pub fn dispatch(&mut self, command: Command) {
        self.session.dispatch(command);
    }

    pub fn submit(&mut self, text: &str) {
        self.dispatch(Command::Submit(text.to_string()));
    }

    /// Handle the next network completion, if one arrives in time
    pub async fn process_next_event(&mut self, timeout: Duration) -> Option<Event> {
        let event = tokio::time::timeout(timeout, self.session.next_event())
            .await
            .ok()
            .flatten()?;
        self.session.handle_event(event.clone());
        Some(event)
    }

    /// Handle completions until no request is pending
    pub async fn wait_idle(&mut self, timeout: Duration) -> bool {
        let session = &mut self.session;
        tokio::time::timeout(timeout, async {
            while session.request_state().is_pending() {
                match session.next_event().await {
                    Some(event) => session.handle_event(event),
                    None => return,
                }
            }
        })
        .await
        .is_ok()
    }

    /// Everything published since the last call
    pub fn drain_updates(&mut self) -> Vec<ViewUpdate> {
        let mut updates = Vec::new();
        while let Ok(update) = self.updates.try_recv() {
            updates.push(update);
        }
        updates
    }

    pub fn active_messages(&self) -> Vec<Message> {
        self.session
            .store()
            .active()
            .map(|c| c.messages().to_vec())
            .unwrap_or_default()
    }
}

/// Poll until `condition` holds; spawned fire-and-forget tasks need a moment.
pub async fn wait_until(condition: impl Fn() -> bool, timeout: Duration) -> bool {
    tokio::time::timeout(timeout, async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{ConversationId, MessageKind};
    use crate::render::{loading_html, message_html, welcome_html, SendButtonState};
    use crate::state_machine::{
        ChatOutcome, RequestId, RequestState, NETWORK_ERROR_TEXT, UNKNOWN_ERROR_TEXT,
    };

    const WAIT: Duration = Duration::from_secs(2);

    fn errors_shown(updates: &[ViewUpdate]) -> Vec<String> {
        updates
            .iter()
            .filter_map(|u| match u {
                ViewUpdate::ErrorShown { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    fn appended(updates: &[ViewUpdate]) -> Vec<Message> {
        updates
            .iter()
            .filter_map(|u| match u {
                ViewUpdate::MessageAppended { message, .. } => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    fn last_message_pane(updates: &[ViewUpdate]) -> Option<String> {
        updates.iter().rev().find_map(|u| match u {
            ViewUpdate::MessagePane { html } => Some(html.clone()),
            _ => None,
        })
    }

    /// Apply updates the way a DOM binding does: replace on a full pane,
    /// append single blocks, drop the loading indicator when hidden.
    fn rebuild_pane(updates: &[ViewUpdate]) -> String {
        let mut pane = String::new();
        for update in updates {
            match update {
                ViewUpdate::MessagePane { html } => pane.clone_from(html),
                ViewUpdate::MessageAppended {
                    html,
                    replaces_welcome,
                    ..
                } => {
                    if *replaces_welcome {
                        pane.clear();
                    }
                    pane.push_str(html);
                }
                ViewUpdate::LoadingShown { html } | ViewUpdate::ErrorShown { html, .. } => {
                    pane.push_str(html);
                }
                ViewUpdate::LoadingHidden => pane = pane.replace(&loading_html(), ""),
                _ => {}
            }
        }
        pane
    }

    #[tokio::test]
    async fn test_mock_chat_backend() {
        let mock = MockChatBackend::new();
        mock.queue_answer("Hello");

        let reply = mock.send_message("Hi").await.unwrap();
        assert_eq!(reply, ChatReply::Answer("Hello".to_string()));
        assert_eq!(mock.recorded_requests(), vec!["Hi".to_string()]);

        // Second call should fail (no more replies)
        assert!(mock.send_message("Again").await.is_err());
    }

    #[tokio::test]
    async fn test_start_creates_default_conversation() {
        let mut rt = TestSession::new(MockChatBackend::new());

        let store = rt.session.store();
        assert_eq!(store.len(), 1);
        assert_eq!(store.active().unwrap().title, "New chat 1");

        let updates = rt.drain_updates();
        assert!(matches!(&updates[0], ViewUpdate::Sidebar { rows, .. } if rows.len() == 1 && rows[0].active));
        assert_eq!(last_message_pane(&updates), Some(welcome_html()));
        assert!(updates.contains(&ViewUpdate::SendButton(SendButtonState::Send)));

        let backend = rt.backend.clone();
        assert!(wait_until(|| backend.clear_history_calls() == 1, WAIT).await);
    }

    /// Create, submit, answer: two messages in order and a derived title
    #[tokio::test]
    async fn test_submit_and_answer() {
        let backend = MockChatBackend::new();
        backend.queue_answer("XSS is...");

        let mut rt = TestSession::new(backend);
        rt.drain_updates();
        rt.submit("what is xss");
        assert!(rt.session.request_state().is_pending());
        assert!(rt.wait_idle(WAIT).await);

        let messages = rt.active_messages();
        assert_eq!(messages, vec![Message::user("what is xss"), Message::bot("XSS is...")]);
        assert_eq!(rt.session.store().active().unwrap().title, "what is xss");
        assert_eq!(rt.backend.recorded_requests(), vec!["what is xss".to_string()]);

        let updates = rt.drain_updates();
        assert_eq!(appended(&updates), messages);
        let loading_shown = updates
            .iter()
            .position(|u| matches!(u, ViewUpdate::LoadingShown { .. }))
            .unwrap();
        let loading_hidden = updates
            .iter()
            .position(|u| *u == ViewUpdate::LoadingHidden)
            .unwrap();
        let bot_appended = updates
            .iter()
            .position(|u| matches!(u, ViewUpdate::MessageAppended { message, .. } if message.kind == MessageKind::Bot))
            .unwrap();
        assert!(loading_shown < loading_hidden && loading_hidden < bot_appended);
        assert_eq!(updates[bot_appended + 1], ViewUpdate::ScrollToEnd);
        assert!(updates.contains(&ViewUpdate::SendButton(SendButtonState::Stop)));
        assert!(updates.contains(&ViewUpdate::SendButton(SendButtonState::Send)));
    }

    /// A binding that only applies the published updates ends with exactly
    /// the stored messages, no welcome block
    #[tokio::test]
    async fn test_update_stream_rebuilds_pane() {
        let backend = MockChatBackend::new();
        backend.queue_answer("XSS is...");
        backend.queue_answer("Escape output.");

        let mut rt = TestSession::new(backend);
        let mut updates = rt.drain_updates();
        assert_eq!(rebuild_pane(&updates), welcome_html());

        rt.submit("what is xss");
        assert!(rt.wait_idle(WAIT).await);
        rt.submit("how to defend");
        assert!(rt.wait_idle(WAIT).await);
        updates.extend(rt.drain_updates());

        let pane = rebuild_pane(&updates);
        assert!(!pane.contains("welcome-message"));
        let expected: String = rt.active_messages().iter().map(message_html).collect();
        assert_eq!(rt.active_messages().len(), 4);
        assert_eq!(pane, expected);
    }

    #[tokio::test]
    async fn test_long_first_message_title_is_cut() {
        let backend = MockChatBackend::new();
        backend.queue_answer("ok");

        let mut rt = TestSession::new(backend);
        rt.submit("how do I defend against cross site scripting");
        assert!(rt.wait_idle(WAIT).await);
        assert_eq!(
            rt.session.store().active().unwrap().title,
            "how do I defend agai"
        );
    }

    #[tokio::test]
    async fn test_double_submit_makes_one_request() {
        let backend = DelayedMockChatBackend::new(Duration::from_millis(50));
        backend.queue_answer("first");

        let mut rt = TestSession::new(backend);
        rt.submit("one");
        rt.submit("two");
        assert!(rt.wait_idle(WAIT).await);

        assert_eq!(rt.backend.recorded_requests(), vec!["one".to_string()]);
        assert_eq!(
            rt.active_messages(),
            vec![Message::user("one"), Message::bot("first")]
        );
    }

    #[tokio::test]
    async fn test_empty_submit_is_ignored() {
        let mut rt = TestSession::new(MockChatBackend::new());
        rt.drain_updates();

        rt.submit("   ");
        assert!(!rt.session.request_state().is_pending());
        assert!(rt.drain_updates().is_empty());
        assert!(rt.active_messages().is_empty());
    }

    /// Cancel leaves exactly the user message and shows nothing else
    #[tokio::test]
    async fn test_cancel_during_request() {
        let backend = DelayedMockChatBackend::new(Duration::from_secs(5));
        backend.queue_answer("Response that should be discarded");
        let started = backend.request_started.clone();

        let mut rt = TestSession::new(backend);
        rt.submit("Hello");
        tokio::time::timeout(WAIT, started.notified()).await.unwrap();
        rt.drain_updates();

        rt.dispatch(Command::Cancel);
        assert_eq!(*rt.session.request_state(), RequestState::Idle);
        assert_eq!(rt.active_messages(), vec![Message::user("Hello")]);

        // The aborted task reports back; it is stale and changes nothing
        let event = rt.process_next_event(WAIT).await.unwrap();
        assert!(matches!(event, Event::ChatAborted { .. }));
        assert_eq!(rt.active_messages(), vec![Message::user("Hello")]);

        let updates = rt.drain_updates();
        assert!(updates.contains(&ViewUpdate::LoadingHidden));
        assert!(updates.contains(&ViewUpdate::SendButton(SendButtonState::Send)));
        assert!(errors_shown(&updates).is_empty());
        assert!(appended(&updates).is_empty());
    }

    #[tokio::test]
    async fn test_cancel_when_idle_is_noop() {
        let mut rt = TestSession::new(MockChatBackend::new());
        rt.drain_updates();
        rt.dispatch(Command::Cancel);
        rt.dispatch(Command::Cancel);
        assert!(rt.drain_updates().is_empty());
    }

    #[tokio::test]
    async fn test_submit_after_cancel_works() {
        let backend = DelayedMockChatBackend::new(Duration::from_millis(100));
        backend.queue_answer("second answer");
        let started = backend.request_started.clone();

        let mut rt = TestSession::new(backend);
        rt.submit("first");
        tokio::time::timeout(WAIT, started.notified()).await.unwrap();
        rt.dispatch(Command::Cancel);
        rt.submit("second");
        assert!(rt.wait_idle(WAIT).await);

        // The aborted first request's report may still be queued; it is stale
        let _ = rt.process_next_event(Duration::from_millis(50)).await;
        assert_eq!(
            rt.active_messages(),
            vec![
                Message::user("first"),
                Message::user("second"),
                Message::bot("second answer"),
            ]
        );
    }

    #[tokio::test]
    async fn test_application_error_is_shown_not_stored() {
        let backend = MockChatBackend::new();
        backend.queue_rejection(Some("model overloaded"));

        let mut rt = TestSession::new(backend);
        rt.submit("hi");
        assert!(rt.wait_idle(WAIT).await);

        assert_eq!(rt.active_messages(), vec![Message::user("hi")]);
        assert_eq!(errors_shown(&rt.drain_updates()), vec!["model overloaded"]);
    }

    #[tokio::test]
    async fn test_application_error_without_text() {
        let backend = MockChatBackend::new();
        backend.queue_rejection(None);

        let mut rt = TestSession::new(backend);
        rt.submit("hi");
        assert!(rt.wait_idle(WAIT).await);
        assert_eq!(errors_shown(&rt.drain_updates()), vec![UNKNOWN_ERROR_TEXT]);
    }

    #[tokio::test]
    async fn test_transport_error_shows_network_error() {
        let backend = MockChatBackend::new();
        backend.queue_error(ChatError::malformed("not json"));

        let mut rt = TestSession::new(backend);
        rt.submit("hi");
        assert!(rt.wait_idle(WAIT).await);

        assert_eq!(rt.active_messages(), vec![Message::user("hi")]);
        assert_eq!(errors_shown(&rt.drain_updates()), vec![NETWORK_ERROR_TEXT]);
    }

    #[tokio::test]
    async fn test_stale_completion_is_ignored() {
        let mut rt = TestSession::new(MockChatBackend::new());
        rt.drain_updates();
        rt.session.handle_event(Event::ChatCompleted {
            request_id: RequestId::new(99),
            outcome: ChatOutcome::Answer("late".to_string()),
        });
        assert!(rt.active_messages().is_empty());
        assert!(rt.drain_updates().is_empty());
    }

    #[tokio::test]
    async fn test_delete_only_conversation_shows_welcome() {
        let mut rt = TestSession::new(MockChatBackend::new());
        let id = rt.session.store().active_id().unwrap();
        rt.drain_updates();

        rt.dispatch(Command::DeleteConversation(id));
        assert!(rt.session.store().is_empty());
        assert_eq!(rt.session.store().active_id(), None);

        let updates = rt.drain_updates();
        assert_eq!(last_message_pane(&updates), Some(welcome_html()));
        assert!(matches!(updates.last(), Some(ViewUpdate::Sidebar { rows, .. }) if rows.is_empty()));

        // start + delete of the active conversation
        let backend = rt.backend.clone();
        assert!(wait_until(|| backend.clear_history_calls() == 2, WAIT).await);
    }

    #[tokio::test]
    async fn test_delete_inactive_does_not_reset() {
        let mut rt = TestSession::new(MockChatBackend::new());
        let first = rt.session.store().active_id().unwrap();
        rt.dispatch(Command::NewConversation);
        let second = rt.session.store().active_id().unwrap();
        rt.drain_updates();

        rt.dispatch(Command::DeleteConversation(first));
        assert_eq!(rt.session.store().active_id(), Some(second));
        let updates = rt.drain_updates();
        assert!(last_message_pane(&updates).is_none());

        let backend = rt.backend.clone();
        assert!(wait_until(|| backend.clear_history_calls() == 2, WAIT).await);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(rt.backend.clear_history_calls(), 2);
    }

    #[tokio::test]
    async fn test_delete_unknown_is_noop() {
        let mut rt = TestSession::new(MockChatBackend::new());
        rt.drain_updates();
        rt.dispatch(Command::DeleteConversation(ConversationId::from(-1)));
        assert_eq!(rt.session.store().len(), 1);
        assert!(rt.drain_updates().is_empty());
    }

    #[tokio::test]
    async fn test_switch_replaces_pane_without_reset() {
        let backend = MockChatBackend::new();
        backend.queue_answer("answer");
        let mut rt = TestSession::new(backend);
        let first = rt.session.store().active_id().unwrap();
        rt.submit("question");
        assert!(rt.wait_idle(WAIT).await);
        rt.dispatch(Command::NewConversation);

        let backend = rt.backend.clone();
        assert!(wait_until(|| backend.clear_history_calls() == 2, WAIT).await);
        rt.drain_updates();

        rt.dispatch(Command::SwitchConversation(first));
        let updates = rt.drain_updates();
        let pane = last_message_pane(&updates).unwrap();
        assert!(pane.contains("user-message") && pane.contains("bot-message"));
        assert!(updates.contains(&ViewUpdate::ScrollToEnd));

        // Switching to the active one again does nothing
        rt.dispatch(Command::SwitchConversation(first));
        assert!(rt.drain_updates().is_empty());

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(rt.backend.clear_history_calls(), 2);
    }

    #[tokio::test]
    async fn test_clear_keeps_conversation_and_resets() {
        let backend = MockChatBackend::new();
        backend.queue_answer("answer");
        let mut rt = TestSession::new(backend);
        rt.submit("question");
        assert!(rt.wait_idle(WAIT).await);
        rt.drain_updates();

        rt.dispatch(Command::ClearConversation);
        assert!(rt.active_messages().is_empty());
        assert_eq!(rt.session.store().active().unwrap().title, "question");
        assert_eq!(last_message_pane(&rt.drain_updates()), Some(welcome_html()));

        let backend = rt.backend.clone();
        assert!(wait_until(|| backend.clear_history_calls() == 2, WAIT).await);
    }

    #[tokio::test]
    async fn test_failed_reset_is_swallowed() {
        let backend = MockChatBackend::new();
        backend.fail_clear_history();
        backend.queue_answer("still works");

        let mut rt = TestSession::new(backend);
        rt.dispatch(Command::NewConversation);
        rt.submit("hi");
        assert!(rt.wait_idle(WAIT).await);

        let backend = rt.backend.clone();
        assert!(wait_until(|| backend.clear_history_calls() == 2, WAIT).await);
        assert_eq!(rt.active_messages().len(), 2);
        assert!(errors_shown(&rt.drain_updates()).is_empty());
    }

    #[tokio::test]
    async fn test_submit_without_conversation_creates_one() {
        let backend = MockChatBackend::new();
        backend.queue_answer("hello");
        let mut rt = TestSession::new(backend);
        let id = rt.session.store().active_id().unwrap();
        rt.dispatch(Command::DeleteConversation(id));
        assert!(rt.session.store().is_empty());

        rt.submit("hi");
        assert!(rt.wait_idle(WAIT).await);
        assert_eq!(rt.session.store().len(), 1);
        assert_eq!(
            rt.active_messages(),
            vec![Message::user("hi"), Message::bot("hello")]
        );
    }

    /// The answer lands in the conversation the request came from
    #[tokio::test]
    async fn test_answer_follows_originating_conversation() {
        let backend = DelayedMockChatBackend::new(Duration::from_millis(50));
        backend.queue_answer("for the first one");

        let mut rt = TestSession::new(backend);
        let first = rt.session.store().active_id().unwrap();
        rt.submit("question");
        rt.dispatch(Command::NewConversation);
        let second = rt.session.store().active_id().unwrap();

        // The new pane does not carry the other conversation's loading indicator
        let pane = last_message_pane(&rt.drain_updates()).unwrap();
        assert!(!pane.contains("loading-message"));

        assert!(rt.wait_idle(WAIT).await);
        let store = rt.session.store();
        assert_eq!(store.get(first).unwrap().messages().len(), 2);
        assert!(store.get(second).unwrap().messages().is_empty());
        assert!(appended(&rt.drain_updates()).is_empty());
    }

    #[tokio::test]
    async fn test_answer_dropped_when_conversation_deleted() {
        let backend = DelayedMockChatBackend::new(Duration::from_millis(50));
        backend.queue_answer("nobody is listening");

        let mut rt = TestSession::new(backend);
        let first = rt.session.store().active_id().unwrap();
        rt.submit("question");
        rt.dispatch(Command::NewConversation);
        rt.dispatch(Command::DeleteConversation(first));

        assert!(rt.wait_idle(WAIT).await);
        assert_eq!(rt.session.store().len(), 1);
        assert!(rt.active_messages().is_empty());
    }

    #[tokio::test]
    async fn test_rename_updates_sidebar() {
        let mut rt = TestSession::new(MockChatBackend::new());
        let id = rt.session.store().active_id().unwrap();
        rt.drain_updates();

        rt.dispatch(Command::RenameConversation {
            id,
            title: "  Foo  ".to_string(),
        });
        assert_eq!(rt.session.store().active().unwrap().title, "Foo");
        let updates = rt.drain_updates();
        assert!(matches!(&updates[..], [ViewUpdate::Sidebar { rows, .. }] if rows[0].title == "Foo"));

        rt.dispatch(Command::RenameConversation {
            id,
            title: String::new(),
        });
        assert_eq!(rt.session.store().active().unwrap().title, "Foo");
    }

    #[tokio::test]
    async fn test_sidebar_toggle_and_collapse() {
        let mut rt = TestSession::new(MockChatBackend::new());
        rt.drain_updates();

        rt.dispatch(Command::ToggleSidebar);
        assert!(rt.session.is_sidebar_collapsed());
        rt.dispatch(Command::CollapseSidebar);
        assert!(rt.session.is_sidebar_collapsed());
        rt.dispatch(Command::ToggleSidebar);
        assert!(!rt.session.is_sidebar_collapsed());

        assert_eq!(
            rt.drain_updates(),
            vec![
                ViewUpdate::SidebarCollapsed(true),
                ViewUpdate::SidebarCollapsed(true),
                ViewUpdate::SidebarCollapsed(false),
            ]
        );
    }

    /// The event loop applies commands and completions from one task
    #[tokio::test]
    async fn test_run_loop() {
        let backend = Arc::new(MockChatBackend::new());
        backend.queue_answer("from the loop");

        let session = ChatSession::new(backend.clone(), ConversationStore::new());
        let mut updates = session.subscribe();
        let (command_tx, command_rx) = tokio::sync::mpsc::channel(8);
        let handle = tokio::spawn(session.run(command_rx));

        command_tx
            .send(Command::Submit("hi".to_string()))
            .await
            .unwrap();

        let answer = tokio::time::timeout(WAIT, async {
            loop {
                if let ViewUpdate::MessageAppended { message, .. } = updates.recv().await.unwrap() {
                    if message.kind == MessageKind::Bot {
                        return message;
                    }
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(answer, Message::bot("from the loop"));

        drop(command_tx);
        tokio::time::timeout(WAIT, handle).await.unwrap().unwrap();
    }
}
