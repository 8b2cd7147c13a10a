//! Bullet normalization.
//!
//! Bullets arrive in several shapes: bare strings, `{ "text": .. }` records,
//! list markup from the rich-text editor (`<ul><li><p>..</p></li></ul>`), or
//! plain newline-separated text. Everything is normalized into an ordered
//! `Vec<Bullet>` on ingress, and converted back to markup or to the bare
//! string storage form on output.

use quick_xml::escape::{escape, unescape};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Regex matching a single markup tag, capturing an optional closing slash
/// and the tag name.
static TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<\s*(/?)\s*([A-Za-z][A-Za-z0-9]*)[^>]*>").unwrap());

/// Regex to collapse whitespace runs into one space.
static WHITESPACE_COLLAPSE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Regex for list markers typed at the start of a plain-text line.
static PLAIN_MARKER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[•\-*·▪‣]|\d+[.)])\s+").unwrap());

/// Tags that end a line in plain text.
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "br", "ul", "ol", "li", "h1", "h2", "h3", "h4", "h5", "h6",
];

/// Formatting tags removed from plain text. Anything else is kept as typed.
const INLINE_TAGS: &[&str] = &[
    "b", "strong", "i", "em", "u", "s", "span", "a", "code", "mark", "sub", "sup", "small",
];

/// Serialized form of an empty bullet list.
pub const EMPTY_LIST_MARKUP: &str = "<ul></ul>";

/// Normalized bullet record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bullet {
    pub text: String,
}

impl Bullet {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// A bullet as found on the wire or in storage: either a bare string or a
/// record with a `text` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BulletPoint {
    Text(String),
    Structured { text: String },
}

impl BulletPoint {
    pub fn text(&self) -> &str {
        match self {
            BulletPoint::Text(text) => text,
            BulletPoint::Structured { text } => text,
        }
    }

    /// Convert into the normalized record form.
    pub fn into_bullet(self) -> Bullet {
        match self {
            BulletPoint::Text(text) | BulletPoint::Structured { text } => Bullet { text },
        }
    }
}

impl From<&str> for BulletPoint {
    fn from(text: &str) -> Self {
        BulletPoint::Text(text.to_string())
    }
}

impl From<Bullet> for BulletPoint {
    fn from(bullet: Bullet) -> Self {
        BulletPoint::Text(bullet.text)
    }
}

/// Any accepted bullet list input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BulletInput {
    List(Vec<BulletPoint>),
    Serialized(String),
}

impl BulletInput {
    pub fn to_list(&self) -> Vec<Bullet> {
        match self {
            BulletInput::List(points) => from_points(points),
            BulletInput::Serialized(raw) => parse_serialized(raw),
        }
    }
}

impl From<Vec<BulletPoint>> for BulletInput {
    fn from(points: Vec<BulletPoint>) -> Self {
        BulletInput::List(points)
    }
}

impl From<&str> for BulletInput {
    fn from(raw: &str) -> Self {
        BulletInput::Serialized(raw.to_string())
    }
}

/// Normalize any bullet input into an ordered list of records.
///
/// Empty or unparseable input gives an empty list. Whitespace-only bullets
/// are dropped.
pub fn to_list(input: &BulletInput) -> Vec<Bullet> {
    input.to_list()
}

/// Normalize a list of mixed string/record bullets.
pub fn from_points(points: &[BulletPoint]) -> Vec<Bullet> {
    points
        .iter()
        .filter_map(|p| clean_text(p.text()))
        .map(Bullet::new)
        .collect()
}

/// Normalize a serialized string: list markup when it contains list items,
/// newline-separated text otherwise.
pub fn parse_serialized(raw: &str) -> Vec<Bullet> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    if has_list_items(raw) {
        parse_markup(raw)
    } else {
        parse_plain(raw)
    }
}

/// Serialize bullets into list markup. An empty list gives `<ul></ul>`.
pub fn to_serialized(bullets: &[Bullet]) -> String {
    let mut markup = String::from("<ul>");
    for bullet in bullets {
        markup.push_str("<li><p>");
        markup.push_str(&escape(bullet.text.as_str()));
        markup.push_str("</p></li>");
    }
    markup.push_str("</ul>");
    markup
}

/// Convert normalized bullets back to the bare-string storage form.
pub fn denormalize(bullets: Vec<Bullet>) -> Vec<BulletPoint> {
    bullets.into_iter().map(BulletPoint::from).collect()
}

/// Scan list markup. Each `<li>` opens a bullet; nested lists flatten in
/// document order.
fn parse_markup(raw: &str) -> Vec<Bullet> {
    let mut bullets = Vec::new();
    // Text collected for each open <li>, innermost last.
    let mut open_items: Vec<String> = Vec::new();
    let mut cursor = 0;

    for caps in TAG_REGEX.captures_iter(raw) {
        let Some(whole) = caps.get(0) else { continue };
        if let Some(current) = open_items.last_mut() {
            current.push_str(&raw[cursor..whole.start()]);
        }
        cursor = whole.end();

        let closing = !caps[1].is_empty();
        let name = caps[2].to_ascii_lowercase();
        match (name.as_str(), closing) {
            ("li", false) => {
                // A nested list ends the parent's leading text.
                if let Some(parent) = open_items.last_mut() {
                    push_bullet(&mut bullets, std::mem::take(parent));
                }
                open_items.push(String::new());
            }
            ("li", true) => {
                if let Some(text) = open_items.pop() {
                    push_bullet(&mut bullets, text);
                }
            }
            ("br", _) | ("p", true) | ("div", true) => {
                if let Some(current) = open_items.last_mut() {
                    current.push(' ');
                }
            }
            _ => {}
        }
    }

    // Unterminated items at the end of the blob.
    if let Some(current) = open_items.last_mut() {
        current.push_str(&raw[cursor..]);
    }
    while let Some(text) = open_items.pop() {
        push_bullet(&mut bullets, text);
    }

    bullets
}

fn has_list_items(raw: &str) -> bool {
    TAG_REGEX
        .captures_iter(raw)
        .any(|caps| caps[2].eq_ignore_ascii_case("li"))
}

fn parse_plain(raw: &str) -> Vec<Bullet> {
    let stripped = TAG_REGEX.replace_all(raw, |caps: &Captures| {
        let name = caps[2].to_ascii_lowercase();
        if BLOCK_TAGS.contains(&name.as_str()) {
            "\n".to_string()
        } else if INLINE_TAGS.contains(&name.as_str()) {
            String::new()
        } else {
            caps[0].to_string()
        }
    });
    stripped
        .lines()
        .map(|line| PLAIN_MARKER_REGEX.replace(line.trim(), "").to_string())
        .filter_map(|line| clean_text(&decode_entities(&line)))
        .map(Bullet::new)
        .collect()
}

fn push_bullet(bullets: &mut Vec<Bullet>, raw_text: String) {
    if let Some(text) = clean_text(&decode_entities(&raw_text)) {
        bullets.push(Bullet::new(text));
    }
}

fn decode_entities(text: &str) -> String {
    let text = text.replace("&nbsp;", " ").replace("&#160;", " ");
    let decoded = unescape(&text).map(|cow| cow.into_owned());
    match decoded {
        Ok(decoded) => decoded,
        Err(e) => {
            log::debug!("Leaving undecodable entity in bullet text: {}", e);
            text
        }
    }
}

/// Collapse whitespace, NFC-normalize, and drop empty text.
fn clean_text(text: &str) -> Option<String> {
    let collapsed = WHITESPACE_COLLAPSE_REGEX.replace_all(text.trim(), " ");
    if collapsed.is_empty() {
        return None;
    }
    Some(collapsed.nfc().collect())
}
