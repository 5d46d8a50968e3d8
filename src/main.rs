//! Terminal binding for the chat widget
//!
//! Reads lines from stdin as if they were typed into the widget's textarea
//! and prints view updates as plain text.

use chat_widget::input::{InputController, Key, KeyPress, RenameEditor, RenameResult};
use chat_widget::render::{SendButtonState, SidebarRow};
use chat_widget::runtime::ProductionSession;
use chat_widget::{Command, ConversationStore, HttpChatBackend, ViewUpdate, WidgetConfig};
use regex::Regex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock, Mutex};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{broadcast, mpsc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern"));

const HELP: &str = "Type a message and press Enter. While the assistant is thinking, Enter stops it.
Commands: /new /list /switch N /delete N /rename N TITLE /clear /cancel /sidebar /quit";

/// What the printer task learns from view updates and the input loop needs
#[derive(Default)]
struct ViewState {
    pending: AtomicBool,
    rows: Mutex<Vec<SidebarRow>>,
}

impl ViewState {
    fn row(&self, number: &str) -> Option<SidebarRow> {
        let index = number.trim().parse::<usize>().ok()?.checked_sub(1)?;
        self.rows.lock().ok()?.get(index).cloned()
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chat_widget=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = WidgetConfig::from_env();
    tracing::info!(
        endpoint = %config.endpoint,
        title_chars = config.title_chars,
        "Starting chat widget"
    );

    let backend = HttpChatBackend::new(&config.endpoint)?;
    let store = ConversationStore::with_title_chars(config.title_chars);
    let session = ProductionSession::new(backend, store);
    let updates = session.subscribe();

    let (command_tx, command_rx) = mpsc::channel(16);
    let session_handle = tokio::spawn(session.run(command_rx));

    let view = Arc::new(ViewState::default());
    let printer = tokio::spawn(print_updates(updates, view.clone()));

    println!("{HELP}");
    let mut input = InputController::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let command = match line.trim().split_once(' ').unwrap_or((line.trim(), "")) {
            ("/quit", _) => break,
            ("/new", _) => Some(Command::NewConversation),
            ("/clear", _) => Some(Command::ClearConversation),
            ("/cancel", _) => Some(Command::Cancel),
            ("/sidebar", _) => Some(Command::ToggleSidebar),
            ("/list", _) => {
                print_rows(&view);
                None
            }
            ("/switch", n) => view.row(n).map(|row| Command::SwitchConversation(row.id)),
            ("/delete", n) => view.row(n).map(|row| Command::DeleteConversation(row.id)),
            ("/rename", args) => {
                let (n, title) = args.split_once(' ').unwrap_or((args, ""));
                view.row(n).and_then(|row| {
                    let mut editor = RenameEditor::begin(row.id, &row.title);
                    editor.on_input(title);
                    match editor.on_key(KeyPress::new(Key::Enter)) {
                        Some(RenameResult::Commit(command)) => Some(command),
                        _ => None,
                    }
                })
            }
            (word, _) if word.starts_with('/') => {
                println!("{HELP}");
                None
            }
            _ => {
                input.on_input(line.clone(), 0);
                input.on_key(KeyPress::new(Key::Enter), view.pending.load(Ordering::SeqCst))
            }
        };

        if let Some(command) = command {
            if command_tx.send(command).await.is_err() {
                break;
            }
        }
    }

    drop(command_tx);
    session_handle.await?;
    printer.abort();
    tracing::info!("Chat widget stopped");
    Ok(())
}

async fn print_updates(mut updates: broadcast::Receiver<ViewUpdate>, view: Arc<ViewState>) {
    loop {
        let update = match updates.recv().await {
            Ok(update) => update,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "View fell behind");
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };

        match update {
            ViewUpdate::Sidebar { rows, .. } => {
                if let Ok(mut current) = view.rows.lock() {
                    *current = rows;
                }
            }
            ViewUpdate::MessagePane { html } => {
                println!("──────────");
                println!("{}", html_to_text(&html));
            }
            ViewUpdate::MessageAppended {
                html,
                replaces_welcome,
                ..
            } => {
                if replaces_welcome {
                    println!("──────────");
                }
                println!("{}", html_to_text(&html));
            }
            ViewUpdate::LoadingShown { .. } => println!("AI is thinking… (Enter to stop)"),
            ViewUpdate::ErrorShown { text, .. } => println!("! {text}"),
            ViewUpdate::SendButton(state) => {
                view.pending
                    .store(state == SendButtonState::Stop, Ordering::SeqCst);
            }
            ViewUpdate::SidebarCollapsed(collapsed) => {
                if collapsed {
                    println!("[conversation list hidden]");
                } else {
                    println!("[conversation list shown]");
                }
            }
            ViewUpdate::LoadingHidden | ViewUpdate::ScrollToEnd => {}
        }
    }
}

fn print_rows(view: &ViewState) {
    let Ok(rows) = view.rows.lock() else {
        return;
    };
    if rows.is_empty() {
        println!("(no conversations)");
    }
    for (i, row) in rows.iter().enumerate() {
        let marker = if row.active { '*' } else { ' ' };
        println!("{marker} {}. {}", i + 1, row.title);
    }
}

/// Message blocks become `Label: text` lines
fn html_to_text(html: &str) -> String {
    let text = html
        .replace("<br>", "\n")
        .replace(r#"</div><div class="message-content">"#, ": ")
        .replace(r#"</div><div class="welcome-text">"#, "\n")
        .replace(r#"</div></div><div class="message "#, "</div></div>\n<div class=\"message ");
    let text = TAG.replace_all(&text, "");
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
