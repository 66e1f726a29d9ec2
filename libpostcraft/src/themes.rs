//! Theme catalog and lookup
//!
//! A theme is an immutable bundle of presentation hints (voice, emoji
//! density, structure preferences) that components consult while rendering.
//! The catalog is fixed: ten presets, addressed by their snake_case key.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::components::{CtaKind, HookKind};
use crate::error::{PostcraftError, Result};

/// How many emoji a theme tolerates
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmojiLevel {
    None,
    Minimal,
    Moderate,
    Expressive,
    Heavy,
}

impl EmojiLevel {
    /// True for themes that decorate prompts with emoji
    pub fn is_decorative(self) -> bool {
        self >= EmojiLevel::Moderate
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineBreakStyle {
    Dense,
    Readable,
    Scannable,
    Dramatic,
    Extreme,
}

impl LineBreakStyle {
    /// Newlines placed between paragraphs of a linear body
    pub fn break_count(self) -> usize {
        match self {
            LineBreakStyle::Dense => 1,
            LineBreakStyle::Readable => 2,
            LineBreakStyle::Scannable => 3,
            LineBreakStyle::Dramatic => 5,
            LineBreakStyle::Extreme => 7,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HashtagStrategy {
    Minimal,
    Optimal,
    Branded,
    Trending,
    Niche,
    Mixed,
}

impl HashtagStrategy {
    pub fn max_tags(self) -> usize {
        match self {
            HashtagStrategy::Minimal => 3,
            _ => 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HashtagPlacement {
    Inline,
    Mid,
    End,
    FirstComment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControversyLevel {
    Safe,
    Moderate,
    Bold,
    Provocative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    Authority,
    Engagement,
    Community,
    Leads,
    Awareness,
}

impl std::str::FromStr for Goal {
    type Err = PostcraftError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "authority" => Ok(Goal::Authority),
            "engagement" => Ok(Goal::Engagement),
            "community" => Ok(Goal::Community),
            "leads" => Ok(Goal::Leads),
            "awareness" => Ok(Goal::Awareness),
            _ => Err(PostcraftError::InvalidInput(format!(
                "Invalid goal: '{}'. Valid options: authority, engagement, community, leads, awareness",
                s
            ))),
        }
    }
}

/// Presentation hints for one persona
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Theme {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub tone: &'static str,
    pub formality: &'static str,
    pub primary_goal: Goal,
    pub emoji_level: EmojiLevel,
    pub line_break_style: LineBreakStyle,
    pub preferred_structures: &'static [&'static str],
    pub hook_style: HookKind,
    pub cta_style: CtaKind,
    pub hashtag_strategy: HashtagStrategy,
    pub hashtag_placement: HashtagPlacement,
    pub controversy_level: ControversyLevel,
    pub preferred_formats: &'static [&'static str],
    pub post_frequency: u8,
}

/// Short description of a theme for listings
#[derive(Debug, Clone, Serialize)]
pub struct ThemeSummary {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub tone: &'static str,
    pub goal: Goal,
    pub post_frequency: String,
    pub best_formats: Vec<&'static str>,
    pub emoji_level: EmojiLevel,
    pub controversy_level: ControversyLevel,
}

static PRESETS: [Theme; 10] = [
    Theme {
        key: "thought_leader",
        name: "Thought Leader",
        description: "Establish expertise and industry authority",
        tone: "professional",
        formality: "conversational",
        primary_goal: Goal::Authority,
        emoji_level: EmojiLevel::Minimal,
        line_break_style: LineBreakStyle::Scannable,
        preferred_structures: &["framework", "listicle", "comparison"],
        hook_style: HookKind::Stat,
        cta_style: CtaKind::Curiosity,
        hashtag_strategy: HashtagStrategy::Minimal,
        hashtag_placement: HashtagPlacement::End,
        controversy_level: ControversyLevel::Moderate,
        preferred_formats: &["text", "document", "carousel"],
        post_frequency: 4,
    },
    Theme {
        key: "personal_brand",
        name: "Personal Brand Builder",
        description: "Build authentic personal connection and following",
        tone: "inspirational",
        formality: "friendly",
        primary_goal: Goal::Engagement,
        emoji_level: EmojiLevel::Moderate,
        line_break_style: LineBreakStyle::Dramatic,
        preferred_structures: &["story_arc", "linear", "question_based"],
        hook_style: HookKind::Story,
        cta_style: CtaKind::Share,
        hashtag_strategy: HashtagStrategy::Mixed,
        hashtag_placement: HashtagPlacement::End,
        controversy_level: ControversyLevel::Safe,
        preferred_formats: &["text", "image", "video"],
        post_frequency: 5,
    },
    Theme {
        key: "technical_expert",
        name: "Technical Expert",
        description: "Deep technical knowledge and precision",
        tone: "technical",
        formality: "formal",
        primary_goal: Goal::Authority,
        emoji_level: EmojiLevel::None,
        line_break_style: LineBreakStyle::Readable,
        preferred_structures: &["listicle", "framework", "linear"],
        hook_style: HookKind::Question,
        cta_style: CtaKind::Direct,
        hashtag_strategy: HashtagStrategy::Niche,
        hashtag_placement: HashtagPlacement::End,
        controversy_level: ControversyLevel::Safe,
        preferred_formats: &["text", "document", "carousel"],
        post_frequency: 3,
    },
    Theme {
        key: "community_builder",
        name: "Community Builder",
        description: "Foster connection and conversation",
        tone: "casual",
        formality: "friendly",
        primary_goal: Goal::Community,
        emoji_level: EmojiLevel::Expressive,
        line_break_style: LineBreakStyle::Scannable,
        preferred_structures: &["question_based", "story_arc", "listicle"],
        hook_style: HookKind::Question,
        cta_style: CtaKind::Curiosity,
        hashtag_strategy: HashtagStrategy::Trending,
        hashtag_placement: HashtagPlacement::FirstComment,
        controversy_level: ControversyLevel::Safe,
        preferred_formats: &["poll", "text", "video"],
        post_frequency: 5,
    },
    Theme {
        key: "corporate_professional",
        name: "Corporate Professional",
        description: "Polished corporate communication",
        tone: "professional",
        formality: "formal",
        primary_goal: Goal::Awareness,
        emoji_level: EmojiLevel::Minimal,
        line_break_style: LineBreakStyle::Readable,
        preferred_structures: &["linear", "listicle", "comparison"],
        hook_style: HookKind::Stat,
        cta_style: CtaKind::Direct,
        hashtag_strategy: HashtagStrategy::Branded,
        hashtag_placement: HashtagPlacement::End,
        controversy_level: ControversyLevel::Safe,
        preferred_formats: &["document", "image", "article"],
        post_frequency: 3,
    },
    Theme {
        key: "contrarian_voice",
        name: "Contrarian Voice",
        description: "Challenge status quo, spark debate",
        tone: "professional",
        formality: "conversational",
        primary_goal: Goal::Engagement,
        emoji_level: EmojiLevel::Minimal,
        line_break_style: LineBreakStyle::Dramatic,
        preferred_structures: &["linear", "comparison", "question_based"],
        hook_style: HookKind::Controversy,
        cta_style: CtaKind::Curiosity,
        hashtag_strategy: HashtagStrategy::Minimal,
        hashtag_placement: HashtagPlacement::Mid,
        controversy_level: ControversyLevel::Bold,
        preferred_formats: &["text", "carousel", "video"],
        post_frequency: 4,
    },
    Theme {
        key: "storyteller",
        name: "Storyteller",
        description: "Narrative-driven, emotional connection",
        tone: "inspirational",
        formality: "conversational",
        primary_goal: Goal::Engagement,
        emoji_level: EmojiLevel::Moderate,
        line_break_style: LineBreakStyle::Dramatic,
        preferred_structures: &["story_arc", "linear"],
        hook_style: HookKind::Story,
        cta_style: CtaKind::Soft,
        hashtag_strategy: HashtagStrategy::Minimal,
        hashtag_placement: HashtagPlacement::End,
        controversy_level: ControversyLevel::Safe,
        preferred_formats: &["text", "video", "image"],
        post_frequency: 4,
    },
    Theme {
        key: "data_driven",
        name: "Data-Driven Analyst",
        description: "Let the numbers tell the story",
        tone: "professional",
        formality: "conversational",
        primary_goal: Goal::Authority,
        emoji_level: EmojiLevel::Minimal,
        line_break_style: LineBreakStyle::Scannable,
        preferred_structures: &["listicle", "comparison", "framework"],
        hook_style: HookKind::Stat,
        cta_style: CtaKind::Direct,
        hashtag_strategy: HashtagStrategy::Niche,
        hashtag_placement: HashtagPlacement::End,
        controversy_level: ControversyLevel::Moderate,
        preferred_formats: &["document", "carousel", "image"],
        post_frequency: 3,
    },
    Theme {
        key: "coach_mentor",
        name: "Coach/Mentor",
        description: "Guide and support your audience",
        tone: "inspirational",
        formality: "friendly",
        primary_goal: Goal::Community,
        emoji_level: EmojiLevel::Moderate,
        line_break_style: LineBreakStyle::Scannable,
        preferred_structures: &["framework", "question_based", "listicle"],
        hook_style: HookKind::Question,
        cta_style: CtaKind::Action,
        hashtag_strategy: HashtagStrategy::Optimal,
        hashtag_placement: HashtagPlacement::End,
        controversy_level: ControversyLevel::Safe,
        preferred_formats: &["text", "carousel", "video"],
        post_frequency: 5,
    },
    Theme {
        key: "entertainer",
        name: "The Entertainer",
        description: "Make posts fun and memorable",
        tone: "humorous",
        formality: "casual",
        primary_goal: Goal::Engagement,
        emoji_level: EmojiLevel::Expressive,
        line_break_style: LineBreakStyle::Dramatic,
        preferred_structures: &["story_arc", "linear", "question_based"],
        hook_style: HookKind::Curiosity,
        cta_style: CtaKind::Share,
        hashtag_strategy: HashtagStrategy::Trending,
        hashtag_placement: HashtagPlacement::FirstComment,
        controversy_level: ControversyLevel::Moderate,
        preferred_formats: &["text", "video", "image"],
        post_frequency: 5,
    },
];

/// Theme used when a goal matches nothing in the catalog
pub const FALLBACK_THEME: &str = "thought_leader";

/// Resolves theme names against the fixed catalog
///
/// Built once at the composition root and shared by reference; lookups are
/// read-only and safe from any number of threads.
#[derive(Debug, Clone)]
pub struct ThemeManager {
    themes: HashMap<&'static str, Arc<Theme>>,
}

impl Default for ThemeManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ThemeManager {
    pub fn new() -> Self {
        let themes = PRESETS
            .iter()
            .map(|theme| (theme.key, Arc::new(theme.clone())))
            .collect();
        Self { themes }
    }

    /// Look up a theme by its catalog key
    ///
    /// # Errors
    ///
    /// Returns `PostcraftError::UnknownTheme` if the key is not a preset.
    pub fn get_theme(&self, name: &str) -> Result<Arc<Theme>> {
        self.themes
            .get(name)
            .cloned()
            .ok_or_else(|| PostcraftError::UnknownTheme(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.themes.contains_key(name)
    }

    /// Catalog keys in preset order
    pub fn list_themes(&self) -> Vec<&'static str> {
        PRESETS.iter().map(|theme| theme.key).collect()
    }

    pub fn summary(&self, name: &str) -> Result<ThemeSummary> {
        let theme = self.get_theme(name)?;
        Ok(ThemeSummary {
            key: theme.key,
            name: theme.name,
            description: theme.description,
            tone: theme.tone,
            goal: theme.primary_goal,
            post_frequency: format!("{}x per week", theme.post_frequency),
            best_formats: theme.preferred_formats.to_vec(),
            emoji_level: theme.emoji_level,
            controversy_level: theme.controversy_level,
        })
    }

    /// Themes whose primary goal matches, falling back to the thought leader
    pub fn recommend(&self, goal: Goal) -> Vec<&'static str> {
        let matches: Vec<_> = PRESETS
            .iter()
            .filter(|theme| theme.primary_goal == goal)
            .map(|theme| theme.key)
            .collect();
        if matches.is_empty() {
            vec![FALLBACK_THEME]
        } else {
            matches
        }
    }
}
