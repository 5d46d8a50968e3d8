//! Message formatting
//!
//! Converts message content into display markup. User text is always escaped
//! and never interpreted; assistant text is escaped and then a restricted
//! markdown subset is applied in a fixed order.

use crate::conversation::MessageKind;
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Marks stashed fragments that later substitutions must not touch.
const SENTINEL: char = '\u{E000}';

static FENCED_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(.*?)```").expect("fenced code pattern"));
static INLINE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`\n]+)`").expect("inline code pattern"));
static HEADINGS: LazyLock<[(Regex, &'static str); 4]> = LazyLock::new(|| {
    [
        (Regex::new(r"(?m)^#### (.+)$").expect("h4 pattern"), "h4"),
        (Regex::new(r"(?m)^### (.+)$").expect("h3 pattern"), "h3"),
        (Regex::new(r"(?m)^## (.+)$").expect("h2 pattern"), "h2"),
        (Regex::new(r"(?m)^# (.+)$").expect("h1 pattern"), "h1"),
    ]
});
static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*\n]+)\*\*").expect("bold pattern"));
static ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^*\n]+)\*").expect("italic pattern"));
static IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[([^\]]*)\]\(([^)\s]+)\)").expect("image pattern"));
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)\s]+)\)").expect("link pattern"));
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("{SENTINEL}([0-9]+){SENTINEL}")).expect("placeholder pattern")
});
static LANGUAGE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_+#.-]+$").expect("language tag pattern"));

/// Escape text so it is displayed literally.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Format a message body according to who wrote it.
pub fn format_message(kind: MessageKind, content: &str) -> String {
    match kind {
        MessageKind::User => format_user_text(content),
        MessageKind::Bot => format_markdown(content),
    }
}

/// User text: escaped, line breaks preserved.
pub fn format_user_text(text: &str) -> String {
    escape_html(text).replace('\n', "<br>")
}

/// Assistant text: escaped, then the markdown subset is applied.
///
/// Precedence: fenced code, inline code, headings, bold, italic, images,
/// links, line breaks. Code is stashed behind placeholders before any other
/// substitution runs, so its content is never reformatted. Unmatched markers
/// are left as literal text.
pub fn format_markdown(text: &str) -> String {
    let cleaned: String = text.chars().filter(|c| *c != SENTINEL).collect();
    let escaped = escape_html(&cleaned);
    let mut stash: Vec<String> = Vec::new();

    let html = FENCED_CODE
        .replace_all(&escaped, |caps: &Captures| {
            push_stash(&mut stash, render_fenced_block(&caps[1]))
        })
        .into_owned();

    let mut html = INLINE_CODE
        .replace_all(&html, |caps: &Captures| {
            push_stash(&mut stash, format!("<code>{}</code>", &caps[1]))
        })
        .into_owned();

    for (pattern, tag) in HEADINGS.iter() {
        html = pattern
            .replace_all(&html, format!("<{tag}>${{1}}</{tag}>").as_str())
            .into_owned();
    }

    let html = BOLD.replace_all(&html, "<strong>${1}</strong>");
    let html = ITALIC.replace_all(&html, "<em>${1}</em>");
    let html = IMAGE.replace_all(&html, |caps: &Captures| {
        if is_safe_url(&caps[2]) {
            format!(r#"<img alt="{}" src="{}">"#, &caps[1], &caps[2])
        } else {
            caps[0].to_string()
        }
    });
    let html = LINK.replace_all(&html, |caps: &Captures| {
        if is_safe_url(&caps[2]) {
            format!(
                r#"<a href="{}" target="_blank" rel="noopener noreferrer">{}</a>"#,
                &caps[2], &caps[1]
            )
        } else {
            caps[0].to_string()
        }
    });
    let html = html.replace('\n', "<br>");

    restore_stash(html, &stash)
}

fn push_stash(stash: &mut Vec<String>, fragment: String) -> String {
    stash.push(fragment);
    format!("{SENTINEL}{}{SENTINEL}", stash.len() - 1)
}

/// Placeholders can nest (a fence inside backticks), so restore until none remain.
fn restore_stash(mut html: String, stash: &[String]) -> String {
    for _ in 0..=stash.len() {
        if !html.contains(SENTINEL) {
            break;
        }
        html = PLACEHOLDER
            .replace_all(&html, |caps: &Captures| {
                caps[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|idx| stash.get(idx))
                    .cloned()
                    .unwrap_or_default()
            })
            .into_owned();
    }
    html
}

/// A language tag only counts when it sits on the opening fence line.
fn render_fenced_block(body: &str) -> String {
    let (language, code) = match body.strip_prefix('\n') {
        Some(rest) => (None, rest),
        None => match body.split_once('\n') {
            Some((first, rest)) if LANGUAGE_TAG.is_match(first) => (Some(first), rest),
            _ => (None, body),
        },
    };
    let code = code.strip_suffix('\n').unwrap_or(code);

    match language {
        Some(lang) => format!(r#"<pre><code class="language-{lang}">{code}</code></pre>"#),
        None => format!("<pre><code>{code}</code></pre>"),
    }
}

/// Only web and mail targets, or scheme-less paths, become live attributes.
fn is_safe_url(url: &str) -> bool {
    match url.split_once(':') {
        None => true,
        Some((scheme, _)) if scheme.contains(['/', '?', '#']) => true,
        Some((scheme, _)) => {
            let scheme = scheme.to_ascii_lowercase();
            matches!(scheme.as_str(), "http" | "https" | "mailto")
        }
    }
}
