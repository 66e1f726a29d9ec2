//! Post components
//!
//! A component is a self-contained unit of post content that knows how to
//! render itself as text under an optional theme and how to check its own
//! structure. Rendering is pure; validation never looks at the theme.
//!
//! # Example
//!
//! ```
//! use libpostcraft::components::{Component, ProgressChart};
//!
//! let chart = ProgressChart::new([("Design", 100.0), ("Build", 40.0)]);
//! assert!(chart.validate());
//! assert!(chart.render(None).contains("40%"));
//! ```

use std::fmt;

use serde::Serialize;

use crate::themes::{EmojiLevel, HashtagPlacement, Theme};

pub mod charts;
pub mod content;
pub mod features;

pub use charts::{
    BarChart, ComparisonChart, ComparisonPoints, MetricValue, MetricsChart, ProgressChart,
    RankingChart,
};
pub use content::{Body, BodyStructure, CallToAction, Hashtags, Hook, Separator, SeparatorStyle};
pub use features::{
    BeforeAfter, BigStat, Checklist, ChecklistItem, Feature, FeatureList, KeyTakeaway,
    NumberedList, NumberedListStyle, PollPreview, ProCon, Quote, StatsGrid, TakeawayStyle,
    Timeline, TimelineStyle, TipBox, TipStyle,
};

/// Renderable, validatable unit of post content
pub trait Component: fmt::Debug + Send + Sync {
    fn kind(&self) -> ComponentKind;

    /// Render the component as plain text
    ///
    /// Must be a pure function of the component's own state and `theme`.
    fn render(&self, theme: Option<&Theme>) -> String;

    /// Describe why the component is structurally invalid, if it is
    fn invalid_reason(&self) -> Option<String>;

    fn validate(&self) -> bool {
        self.invalid_reason().is_none()
    }

    /// Where a hashtag block wants to sit; `None` for every other component
    fn hashtag_placement(&self) -> Option<HashtagPlacement> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Hook,
    Body,
    #[serde(rename = "cta")]
    CallToAction,
    Hashtags,
    Separator,
    BarChart,
    MetricsChart,
    ComparisonChart,
    ProgressChart,
    RankingChart,
    Quote,
    BigStat,
    Timeline,
    KeyTakeaway,
    ProCon,
    Checklist,
    BeforeAfter,
    TipBox,
    StatsGrid,
    PollPreview,
    FeatureList,
    NumberedList,
}

impl ComponentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Hook => "hook",
            ComponentKind::Body => "body",
            ComponentKind::CallToAction => "cta",
            ComponentKind::Hashtags => "hashtags",
            ComponentKind::Separator => "separator",
            ComponentKind::BarChart => "bar_chart",
            ComponentKind::MetricsChart => "metrics_chart",
            ComponentKind::ComparisonChart => "comparison_chart",
            ComponentKind::ProgressChart => "progress_chart",
            ComponentKind::RankingChart => "ranking_chart",
            ComponentKind::Quote => "quote",
            ComponentKind::BigStat => "big_stat",
            ComponentKind::Timeline => "timeline",
            ComponentKind::KeyTakeaway => "key_takeaway",
            ComponentKind::ProCon => "pro_con",
            ComponentKind::Checklist => "checklist",
            ComponentKind::BeforeAfter => "before_after",
            ComponentKind::TipBox => "tip_box",
            ComponentKind::StatsGrid => "stats_grid",
            ComponentKind::PollPreview => "poll_preview",
            ComponentKind::FeatureList => "feature_list",
            ComponentKind::NumberedList => "numbered_list",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opening hook flavours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HookKind {
    Question,
    Stat,
    Story,
    Controversy,
    List,
    Curiosity,
}

/// Call-to-action flavours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CtaKind {
    Direct,
    Curiosity,
    Action,
    Share,
    Soft,
}

impl CtaKind {
    pub fn emoji(self) -> &'static str {
        match self {
            CtaKind::Direct => "👇",
            CtaKind::Curiosity => "🤔",
            CtaKind::Action => "⚡",
            CtaKind::Share => "🔄",
            CtaKind::Soft => "💭",
        }
    }

    /// Prompt used when a call-to-action is added automatically
    pub fn default_prompt(self) -> &'static str {
        match self {
            CtaKind::Direct => "Share your thoughts in the comments.",
            CtaKind::Curiosity => "What's your take?",
            CtaKind::Action => "Save this for later.",
            CtaKind::Share => "Repost if this resonates with your network.",
            CtaKind::Soft => "Have you experienced something similar?",
        }
    }
}

/// Glyphs shared by the text renderers
pub mod glyphs {
    pub const ARROW: &str = "→";
    pub const BULLET: &str = "•";
    pub const PIN: &str = "📌";
    pub const POSITIVE: &str = "✅";
    pub const NEGATIVE: &str = "❌";
    pub const CHECKBOX: &str = "☐";
    pub const LIGHTBULB: &str = "💡";
    pub const ALERT: &str = "🚨";
    pub const PROGRESS_FILLED: &str = "█";
    pub const PROGRESS_EMPTY: &str = "░";
    pub const BAR_COLORS: [&str; 6] = ["🟦", "🟩", "🟨", "🟧", "🟥", "🟪"];
    pub const MEDALS: [&str; 3] = ["🥇", "🥈", "🥉"];
}

/// Push an uppercased `"<emoji> TITLE:"` heading followed by a blank line
///
/// The emoji is dropped for themes that use none.
pub(crate) fn push_title(
    lines: &mut Vec<String>,
    emoji: &str,
    title: Option<&str>,
    theme: Option<&Theme>,
) {
    let Some(title) = title else {
        return;
    };
    let plain = theme.is_some_and(|t| t.emoji_level == EmojiLevel::None);
    if plain {
        lines.push(format!("{}:", title.to_uppercase()));
    } else {
        lines.push(format!("{} {}:", emoji, title.to_uppercase()));
    }
    lines.push(String::new());
}

/// Whole numbers print without a fractional part
pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

pub(crate) fn char_len(s: &str) -> usize {
    s.chars().count()
}

pub(crate) fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::themes::ThemeManager;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(10.0), "10");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(2.5), "2.5");
    }

    #[test]
    fn test_push_title_uppercases() {
        let mut lines = Vec::new();
        push_title(&mut lines, "📊", Some("Revenue"), None);
        assert_eq!(lines, vec!["📊 REVENUE:".to_string(), String::new()]);
    }

    #[test]
    fn test_push_title_plain_for_emoji_free_theme() {
        let manager = ThemeManager::new();
        let theme = manager.get_theme("technical_expert").unwrap();
        let mut lines = Vec::new();
        push_title(&mut lines, "📊", Some("Revenue"), Some(&theme));
        assert_eq!(lines[0], "REVENUE:");
    }

    #[test]
    fn test_push_title_skips_missing_title() {
        let mut lines = Vec::new();
        push_title(&mut lines, "📊", None, None);
        assert!(lines.is_empty());
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ComponentKind::CallToAction.to_string(), "cta");
        assert_eq!(ComponentKind::ProgressChart.as_str(), "progress_chart");
    }
}
