//! Static preview pages
//!
//! [`PreviewRenderer::render_html`] turns a draft into a self-contained HTML
//! page that mimics how the post will look in a feed, including the "see
//! more" fold. All draft text is escaped by `maud`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use maud::{html, Markup, PreEscaped, DOCTYPE};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::error::{PostcraftError, Result, StorageError};
use crate::service::bounded;
use crate::types::{Draft, FOLD_CHARS, MAX_POST_CHARS};

const STYLE: &str = r#"
body { font-family: -apple-system, "Segoe UI", Roboto, sans-serif; background: #f3f2ef; margin: 0; padding: 24px; }
.post { max-width: 552px; margin: 0 auto; background: #fff; border-radius: 8px; box-shadow: 0 0 0 1px rgba(0,0,0,.08); padding: 16px; }
.post header { color: #666; font-size: 13px; margin-bottom: 12px; }
.post header .name { color: #000; font-weight: 600; font-size: 15px; }
.content { white-space: pre-wrap; font-size: 14px; line-height: 1.45; color: rgba(0,0,0,.9); }
.hashtag { color: #0a66c2; font-weight: 600; }
details.more summary { color: #666; cursor: pointer; list-style: none; }
.stats { max-width: 552px; margin: 16px auto; font-size: 13px; color: #444; }
.stats li { margin: 4px 0; }
.indicator.ok { color: #057642; }
.indicator.warn { color: #b24020; }
"#;

/// Length and engagement figures for a draft's composed text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewStats {
    pub char_count: usize,
    pub word_count: usize,
    /// Characters left before the post limit; negative when over it
    pub char_remaining: i64,
    /// Characters shown before the fold
    pub preview_visible: usize,
    pub hashtag_count: usize,
    pub has_hook: bool,
    pub has_cta: bool,
}

impl PreviewStats {
    pub fn for_text(text: &str) -> Self {
        let char_count = text.chars().count();
        Self {
            char_count,
            word_count: text.split_whitespace().count(),
            char_remaining: MAX_POST_CHARS as i64 - char_count as i64,
            preview_visible: char_count.min(FOLD_CHARS),
            hashtag_count: split_hashtags(text)
                .iter()
                .filter(|s| matches!(s, Segment::Tag(_)))
                .count(),
            has_hook: false,
            has_cta: false,
        }
    }

    /// Figures for the draft's composed text
    ///
    /// Hook and call-to-action presence is read from the component kinds a
    /// composed post records, or from explicit `hook` / `cta` content keys.
    pub fn for_draft(draft: &Draft) -> Self {
        let mut stats = Self::for_text(draft.composed_text().unwrap_or_default());
        let kinds: Vec<&str> = draft
            .content
            .get("components")
            .and_then(Value::as_array)
            .map(|components| {
                components
                    .iter()
                    .filter_map(|c| c.get("kind").and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default();
        let present = |key: &str| {
            kinds.contains(&key) || draft.content.get(key).is_some_and(|v| !v.is_null())
        };
        stats.has_hook = present("hook");
        stats.has_cta = present("cta");
        stats
    }

    pub fn is_over_limit(&self) -> bool {
        self.char_remaining < 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Plain(&'a str),
    Tag(&'a str),
}

fn is_tag_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Split text into plain runs and `#hashtag` runs
///
/// A hashtag starts at a `#` that opens a word and runs over letters, digits
/// and underscores.
fn split_hashtags(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut plain_start = 0;
    let mut prev: Option<char> = None;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        let opens_tag = c == '#'
            && prev.map_or(true, char::is_whitespace)
            && chars.peek().is_some_and(|&(_, next)| is_tag_char(next));
        if !opens_tag {
            prev = Some(c);
            continue;
        }

        let mut end = i + c.len_utf8();
        while let Some(&(j, next)) = chars.peek() {
            if !is_tag_char(next) {
                break;
            }
            end = j + next.len_utf8();
            prev = Some(next);
            chars.next();
        }
        if plain_start < i {
            segments.push(Segment::Plain(&text[plain_start..i]));
        }
        segments.push(Segment::Tag(&text[i..end]));
        plain_start = end;
    }

    if plain_start < text.len() {
        segments.push(Segment::Plain(&text[plain_start..]));
    }
    segments
}

fn text_markup(text: &str) -> Markup {
    html! {
        @for segment in split_hashtags(text) {
            @match segment {
                Segment::Plain(plain) => { (plain) }
                Segment::Tag(tag) => { span.hashtag { (tag) } }
            }
        }
    }
}

/// Split at the fold, returning the visible part and the remainder
fn split_at_fold(text: &str) -> (&str, Option<&str>) {
    match text.char_indices().nth(FOLD_CHARS) {
        Some((idx, _)) => (&text[..idx], Some(&text[idx..])),
        None => (text, None),
    }
}

/// Renders and stores preview pages
#[derive(Debug, Clone)]
pub struct PreviewRenderer {
    io_timeout: Duration,
}

impl PreviewRenderer {
    pub fn new(io_timeout: Duration) -> Self {
        Self { io_timeout }
    }

    /// Render a draft as a standalone HTML page
    ///
    /// Output depends only on the arguments, so rendering the same draft twice
    /// yields identical markup.
    pub fn render_html(&self, draft: &Draft, stats: &PreviewStats) -> Markup {
        let text = draft.composed_text().unwrap_or_default();
        let (visible, folded) = split_at_fold(text);
        let updated = draft.updated_at.format("%Y-%m-%d %H:%M UTC").to_string();
        let theme = draft.theme.as_deref().unwrap_or("none");

        html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="utf-8";
                    meta name="viewport" content="width=device-width, initial-scale=1";
                    meta name="robots" content="noindex";
                    title { "Preview: " (draft.name) }
                    style { (PreEscaped(STYLE)) }
                }
                body {
                    article.post {
                        header {
                            div.name { (draft.name) }
                            div.meta {
                                (draft.post_type.as_str()) " post · theme " (theme) " · updated " (updated)
                            }
                        }
                        @if text.is_empty() {
                            p.content.empty { "Nothing composed yet." }
                        } @else {
                            div.content {
                                (text_markup(visible))
                                @if let Some(rest) = folded {
                                    details.more {
                                        summary { "…see more" }
                                        (text_markup(rest))
                                    }
                                }
                            }
                        }
                    }
                    section.stats {
                        h2 { "Stats" }
                        ul {
                            li { "Characters: " (stats.char_count) " / " (MAX_POST_CHARS) }
                            li {
                                span.indicator.ok[!stats.is_over_limit()].warn[stats.is_over_limit()] {
                                    "Remaining: " (stats.char_remaining)
                                }
                            }
                            li { "Words: " (stats.word_count) }
                            li { "Visible before fold: " (stats.preview_visible) }
                            li { "Hashtags: " (stats.hashtag_count) }
                            li {
                                span.indicator.ok[stats.has_hook].warn[!stats.has_hook] {
                                    "Hook: " @if stats.has_hook { "yes" } @else { "missing" }
                                }
                            }
                            li {
                                span.indicator.ok[stats.has_cta].warn[!stats.has_cta] {
                                    "Call to action: " @if stats.has_cta { "yes" } @else { "missing" }
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    /// Write rendered markup to `path`, creating parent directories
    ///
    /// Returns the path written.
    ///
    /// # Errors
    ///
    /// Returns `PostcraftError::Storage` on I/O failure and
    /// `PostcraftError::Transient` if the write exceeds the I/O timeout.
    pub async fn save(&self, markup: Markup, path: &Path) -> Result<PathBuf> {
        let html = markup.into_string();
        bounded("write preview", self.io_timeout, async {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(StorageError::Io)?;
            }
            tokio::fs::write(path, html.as_bytes())
                .await
                .map_err(StorageError::Io)?;
            Ok::<(), PostcraftError>(())
        })
        .await?;
        info!(path = %path.display(), "Saved preview page");
        Ok(path.to_path_buf())
    }
}
