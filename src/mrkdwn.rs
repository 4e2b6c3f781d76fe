//! Markdown to Slack mrkdwn conversion.
//!
//! A fixed sequence of regex rewrites, each applied once over the whole
//! input. See <https://api.slack.com/reference/surfaces/formatting>.

use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Opens and closes a shielded bold span: `\0B<index>\0`.
const SENTINEL: char = '\u{0}';

/// What a NUL already present in the input becomes while sentinels are live,
/// so only spans parked by this module are ever restored.
const ESCAPED_NUL: &str = "\u{0}E";

fn compiled(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("Invalid mrkdwn regex"))
}

fn bold_asterisk_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, r"\*\*(.+?)\*\*")
}

fn bold_underscore_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, r"__(.+?)__")
}

fn bold_sentinel_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, r"\x00B(\d+)\x00")
}

/// A single-asterisk span on one line.
fn italic_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, r"\*([^*\n]+?)\*")
}

fn strikethrough_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, r"~~(.+?)~~")
}

fn link_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, r"\[([^\]]+)\]\(([^)]+)\)")
}

/// Opening fence with a language tag such as `rust`, `c++`, `c#` or `objective-c`.
fn code_fence_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, r"```[a-zA-Z0-9+#\-]*\n")
}

fn bullet_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, r"(?m)^[*\-]\s+")
}

/// Convert Markdown to Slack's mrkdwn dialect.
///
/// Pure and stateless. Ordered list markers and anything outside bold,
/// italic, strikethrough, links, fenced code openings and bullet markers are
/// left untouched.
pub fn markdown_to_mrkdwn(markdown: &str) -> String {
    // Bold becomes `*x*`, which the italic pass would otherwise rewrite to
    // `_x_`. Each bold span is parked behind an indexed sentinel until the
    // italic pass is done.
    let mut bolds: Vec<String> = Vec::new();
    let mut shield = |caps: &Captures<'_>| {
        bolds.push(format!("*{}*", &caps[1]));
        format!("{SENTINEL}B{}{SENTINEL}", bolds.len() - 1)
    };

    let escaped = markdown.replace(SENTINEL, ESCAPED_NUL);
    let text = bold_asterisk_regex().replace_all(&escaped, &mut shield).into_owned();
    let text = bold_underscore_regex().replace_all(&text, &mut shield).into_owned();

    let text = italic_regex().replace_all(&text, "_${1}_").into_owned();

    let text = bold_sentinel_regex()
        .replace_all(&text, |caps: &Captures<'_>| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|i| bolds.get(i).cloned())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .replace(ESCAPED_NUL, "\u{0}");

    let text = strikethrough_regex().replace_all(&text, "~${1}~").into_owned();
    let text = link_regex().replace_all(&text, "<${2}|${1}>").into_owned();
    let text = code_fence_regex().replace_all(&text, "```\n").into_owned();

    bullet_regex().replace_all(&text, "• ").into_owned()
}
