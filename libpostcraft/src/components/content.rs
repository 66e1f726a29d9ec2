//! Text building blocks: hook, body, call-to-action, hashtags, separator

use serde::Serialize;

use super::{char_len, glyphs, Component, ComponentKind, CtaKind, HookKind};
use crate::themes::{ControversyLevel, EmojiLevel, HashtagPlacement, LineBreakStyle, Theme};

const HOOK_MAX_CHARS: usize = 200;
const BODY_MAX_CHARS: usize = 2800;
const CTA_MAX_CHARS: usize = 200;
const DEFAULT_MAX_TAGS: usize = 5;

/// Opening line of a post
#[derive(Debug, Clone)]
pub struct Hook {
    pub kind: HookKind,
    pub content: String,
}

impl Hook {
    pub fn new(kind: HookKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }
}

impl Component for Hook {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Hook
    }

    fn render(&self, theme: Option<&Theme>) -> String {
        let emphasize = self.kind == HookKind::Controversy
            && theme.is_some_and(|t| t.controversy_level >= ControversyLevel::Bold);
        if emphasize {
            format!("{} {}", glyphs::ALERT, self.content)
        } else {
            self.content.clone()
        }
    }

    fn invalid_reason(&self) -> Option<String> {
        let len = char_len(&self.content);
        if len == 0 || len > HOOK_MAX_CHARS {
            return Some(format!(
                "hook must be 1-{} characters (got {})",
                HOOK_MAX_CHARS, len
            ));
        }
        None
    }
}

/// Layout applied to body text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyStructure {
    #[default]
    Linear,
    /// One item per line, each prefixed with an arrow
    Listicle,
    /// Parts separated by `||`, each pinned
    Framework,
    StoryArc,
    /// Exactly two parts separated by `||`: the rejected and the preferred
    Comparison,
}

/// Main text of a post
#[derive(Debug, Clone)]
pub struct Body {
    pub content: String,
    pub structure: BodyStructure,
}

impl Body {
    pub fn new(content: impl Into<String>) -> Self {
        Self::with_structure(content, BodyStructure::Linear)
    }

    pub fn with_structure(content: impl Into<String>, structure: BodyStructure) -> Self {
        Self {
            content: content.into(),
            structure,
        }
    }

    fn render_linear(&self, theme: Option<&Theme>) -> String {
        match theme {
            Some(theme) => {
                let breaks = "\n".repeat(theme.line_break_style.break_count());
                self.content.split("\n\n").collect::<Vec<_>>().join(&breaks)
            }
            None => self.content.clone(),
        }
    }

    fn render_listicle(&self, theme: Option<&Theme>) -> String {
        let symbol = match theme {
            Some(t) if t.emoji_level == EmojiLevel::None => "-",
            _ => glyphs::ARROW,
        };
        self.content
            .trim()
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| {
                if ["→", "-", "•", "✓"].iter().any(|p| line.starts_with(p)) {
                    line.to_string()
                } else {
                    format!("{} {}", symbol, line)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render_framework(&self, theme: Option<&Theme>) -> String {
        let symbol = match theme {
            Some(t) if t.emoji_level <= EmojiLevel::Minimal => glyphs::BULLET,
            _ => glyphs::PIN,
        };
        self.content
            .split("||")
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| format!("{} {}", symbol, part))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn render_story_arc(&self, theme: Option<&Theme>) -> String {
        let separator = match theme {
            Some(t) if t.line_break_style == LineBreakStyle::Extreme => "\n\n\n",
            _ => "\n\n",
        };
        self.content
            .split("\n\n")
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(separator)
    }

    fn render_comparison(&self) -> String {
        let parts: Vec<_> = self.content.split("||").collect();
        match parts.as_slice() {
            [rejected, preferred] => format!(
                "{} {}\n\n{} {}",
                glyphs::NEGATIVE,
                rejected.trim(),
                glyphs::POSITIVE,
                preferred.trim()
            ),
            _ => self.content.clone(),
        }
    }
}

impl Component for Body {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Body
    }

    fn render(&self, theme: Option<&Theme>) -> String {
        match self.structure {
            BodyStructure::Linear => self.render_linear(theme),
            BodyStructure::Listicle => self.render_listicle(theme),
            BodyStructure::Framework => self.render_framework(theme),
            BodyStructure::StoryArc => self.render_story_arc(theme),
            BodyStructure::Comparison => self.render_comparison(),
        }
    }

    fn invalid_reason(&self) -> Option<String> {
        let len = char_len(&self.content);
        if len == 0 || len > BODY_MAX_CHARS {
            return Some(format!(
                "body must be 1-{} characters (got {})",
                BODY_MAX_CHARS, len
            ));
        }
        None
    }
}

/// Closing prompt inviting a response
#[derive(Debug, Clone)]
pub struct CallToAction {
    pub kind: CtaKind,
    pub text: String,
}

impl CallToAction {
    pub fn new(kind: CtaKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

impl Component for CallToAction {
    fn kind(&self) -> ComponentKind {
        ComponentKind::CallToAction
    }

    fn render(&self, theme: Option<&Theme>) -> String {
        match theme {
            Some(t) if t.emoji_level.is_decorative() => {
                format!("{} {}", self.kind.emoji(), self.text)
            }
            _ => self.text.clone(),
        }
    }

    fn invalid_reason(&self) -> Option<String> {
        let len = char_len(&self.text);
        if len == 0 || len > CTA_MAX_CHARS {
            return Some(format!(
                "call-to-action must be 1-{} characters (got {})",
                CTA_MAX_CHARS, len
            ));
        }
        None
    }
}

/// Hashtag block
///
/// Tags may be given with or without the leading `#`.
#[derive(Debug, Clone)]
pub struct Hashtags {
    pub tags: Vec<String>,
    pub placement: HashtagPlacement,
}

impl Hashtags {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_placement(tags, HashtagPlacement::End)
    }

    pub fn with_placement<I, S>(tags: I, placement: HashtagPlacement) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
            placement,
        }
    }
}

fn bare_tag(tag: &str) -> &str {
    tag.trim().trim_start_matches('#')
}

impl Component for Hashtags {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Hashtags
    }

    fn render(&self, theme: Option<&Theme>) -> String {
        let max_tags = theme
            .map(|t| t.hashtag_strategy.max_tags())
            .unwrap_or(DEFAULT_MAX_TAGS);
        self.tags
            .iter()
            .take(max_tags)
            .map(|tag| format!("#{}", bare_tag(tag)))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn invalid_reason(&self) -> Option<String> {
        if self.tags.is_empty() {
            return Some("at least one hashtag is required".to_string());
        }
        if let Some(pos) = self.tags.iter().position(|tag| bare_tag(tag).is_empty()) {
            return Some(format!("hashtag {} is empty", pos + 1));
        }
        if let Some(tag) = self
            .tags
            .iter()
            .find(|tag| bare_tag(tag).contains(char::is_whitespace))
        {
            return Some(format!("hashtag '{}' contains whitespace", tag));
        }
        None
    }

    fn hashtag_placement(&self) -> Option<HashtagPlacement> {
        Some(self.placement)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeparatorStyle {
    #[default]
    Line,
    Dots,
    Wave,
    Heavy,
    Double,
    /// Renders nothing; the paragraph break alone separates sections
    Minimal,
}

impl SeparatorStyle {
    pub fn glyph(self) -> &'static str {
        match self {
            SeparatorStyle::Line => "---",
            SeparatorStyle::Dots => "• • •",
            SeparatorStyle::Wave => "~",
            SeparatorStyle::Heavy => "━━━",
            SeparatorStyle::Double => "===",
            SeparatorStyle::Minimal => "",
        }
    }
}

/// Visual break between sections
#[derive(Debug, Clone, Default)]
pub struct Separator {
    pub style: SeparatorStyle,
}

impl Separator {
    pub fn new(style: SeparatorStyle) -> Self {
        Self { style }
    }
}

impl Component for Separator {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Separator
    }

    fn render(&self, _theme: Option<&Theme>) -> String {
        self.style.glyph().to_string()
    }

    fn invalid_reason(&self) -> Option<String> {
        None
    }
}
