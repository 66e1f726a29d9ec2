//! Post composition
//!
//! [`ComposablePost`] owns an ordered list of components plus an optional
//! theme and turns them into the final post text.
//!
//! # Example
//!
//! ```
//! use libpostcraft::components::HookKind;
//! use libpostcraft::composition::ComposablePost;
//! use libpostcraft::types::PostType;
//!
//! let mut post = ComposablePost::new(PostType::Text, None);
//! post.add_hook(HookKind::Question, "Do you still write status reports?")
//!     .add_body("We replaced ours with a two-line changelog.")
//!     .add_hashtags(["productivity"]);
//!
//! let text = post.compose().unwrap();
//! assert!(text.ends_with("#productivity"));
//! ```

use std::sync::Arc;

use serde_json::{json, Value};

use crate::components::{
    Body, BodyStructure, CallToAction, Component, ComponentKind, CtaKind, Hashtags, Hook,
    HookKind, Separator, SeparatorStyle,
};
use crate::error::{ComponentIssue, Result, ValidationError};
use crate::themes::{HashtagPlacement, Theme};
use crate::types::{DraftContent, PostType, COMPOSED_TEXT_KEY, FOLD_CHARS};

const SECTION_SEPARATOR: &str = "\n\n";

/// Ordered components rendered under one theme
#[derive(Debug, Clone, Default)]
pub struct ComposablePost {
    pub post_type: PostType,
    theme: Option<Arc<Theme>>,
    components: Vec<Arc<dyn Component>>,
}

impl ComposablePost {
    pub fn new(post_type: PostType, theme: Option<Arc<Theme>>) -> Self {
        Self {
            post_type,
            theme,
            components: Vec::new(),
        }
    }

    pub fn theme(&self) -> Option<&Theme> {
        self.theme.as_deref()
    }

    pub fn set_theme(&mut self, theme: Option<Arc<Theme>>) {
        self.theme = theme;
    }

    pub fn components(&self) -> &[Arc<dyn Component>] {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Append any component
    pub fn add<C: Component + 'static>(&mut self, component: C) -> &mut Self {
        self.components.push(Arc::new(component));
        self
    }

    pub fn add_hook(&mut self, kind: HookKind, content: impl Into<String>) -> &mut Self {
        self.add(Hook::new(kind, content))
    }

    pub fn add_body(&mut self, content: impl Into<String>) -> &mut Self {
        self.add(Body::new(content))
    }

    pub fn add_structured_body(
        &mut self,
        content: impl Into<String>,
        structure: BodyStructure,
    ) -> &mut Self {
        self.add(Body::with_structure(content, structure))
    }

    pub fn add_cta(&mut self, kind: CtaKind, text: impl Into<String>) -> &mut Self {
        self.add(CallToAction::new(kind, text))
    }

    pub fn add_hashtags<I, S>(&mut self, tags: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let placement = self
            .theme
            .as_ref()
            .map(|t| t.hashtag_placement)
            .unwrap_or(HashtagPlacement::End);
        self.add(Hashtags::with_placement(tags, placement))
    }

    pub fn add_separator(&mut self, style: SeparatorStyle) -> &mut Self {
        self.add(Separator::new(style))
    }

    /// Validate every component, collecting one issue per failure
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` listing all invalid components.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        let issues: Vec<_> = self
            .components
            .iter()
            .enumerate()
            .filter_map(|(index, component)| {
                component.invalid_reason().map(|reason| ComponentIssue {
                    index,
                    kind: component.kind().to_string(),
                    reason,
                })
            })
            .collect();

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(issues))
        }
    }

    /// Render every component in order and join them into the post text
    ///
    /// Blank renders are skipped so they do not leave stray paragraph breaks.
    ///
    /// # Errors
    ///
    /// Returns `PostcraftError::Validation` if any component is invalid;
    /// nothing is rendered in that case.
    pub fn compose(&self) -> Result<String> {
        self.validate()?;
        let theme = self.theme();
        let rendered: Vec<String> = self
            .components
            .iter()
            .map(|component| component.render(theme))
            .filter(|text| !text.trim().is_empty())
            .collect();
        Ok(rendered
            .join(SECTION_SEPARATOR)
            .trim_matches('\n')
            .to_string())
    }

    /// Text visible before the fold, with `...` when cut
    ///
    /// # Errors
    ///
    /// Returns `PostcraftError::Validation` if the post does not compose.
    pub fn preview(&self, chars: usize) -> Result<String> {
        let text = self.compose()?;
        if text.chars().count() <= chars {
            return Ok(text);
        }
        let mut cut: String = text.chars().take(chars).collect();
        cut.push_str("...");
        Ok(cut)
    }

    /// [`preview`](Self::preview) at the platform's default fold
    pub fn fold_preview(&self) -> Result<String> {
        self.preview(FOLD_CHARS)
    }

    /// Rearrange components toward a higher-engagement layout
    ///
    /// Adds a call-to-action in the theme's style when none exists, then
    /// moves end-placed hashtag blocks to the tail. Does nothing without a
    /// theme; running it twice yields the same order as running it once.
    pub fn optimize_for_engagement(&mut self) {
        let Some(theme) = self.theme.clone() else {
            return;
        };

        let has_cta = self
            .components
            .iter()
            .any(|c| c.kind() == ComponentKind::CallToAction);
        if !has_cta {
            let trailing_tags = self
                .components
                .iter()
                .rev()
                .take_while(|c| c.kind() == ComponentKind::Hashtags)
                .count();
            let at = self.components.len() - trailing_tags;
            let style = theme.cta_style;
            self.components.insert(
                at,
                Arc::new(CallToAction::new(style, style.default_prompt())),
            );
        }

        let (tail, rest): (Vec<_>, Vec<_>) = self
            .components
            .drain(..)
            .partition(|c| c.hashtag_placement() == Some(HashtagPlacement::End));
        self.components = rest;
        self.components.extend(tail);
    }

    /// Structured content suitable for storing in a draft
    ///
    /// # Errors
    ///
    /// Returns `PostcraftError::Validation` if the post does not compose.
    pub fn to_draft_content(&self) -> Result<DraftContent> {
        let text = self.compose()?;
        let theme = self.theme();
        let components: Vec<Value> = self
            .components
            .iter()
            .map(|c| json!({ "kind": c.kind(), "text": c.render(theme) }))
            .collect();

        let mut content = DraftContent::new();
        content.insert(
            "character_count".to_string(),
            Value::from(text.chars().count()),
        );
        content.insert(COMPOSED_TEXT_KEY.to_string(), Value::from(text));
        content.insert("components".to_string(), Value::from(components));
        content.insert(
            "theme".to_string(),
            theme.map_or(Value::Null, |t| Value::from(t.key)),
        );
        content.insert("post_type".to_string(), Value::from(self.post_type.as_str()));
        Ok(content)
    }
}

/// Ready-made post layouts
pub struct PostBuilder;

impl PostBuilder {
    /// Stat hook, named framework, conclusion
    pub fn thought_leadership(
        hook_stat: &str,
        framework_name: &str,
        framework_parts: &[&str],
        conclusion: &str,
        theme: Option<Arc<Theme>>,
    ) -> ComposablePost {
        let mut post = ComposablePost::new(PostType::Text, theme);
        post.add_hook(HookKind::Stat, hook_stat)
            .add_body(format!("Here's the {}:", framework_name))
            .add_structured_body(framework_parts.join("||"), BodyStructure::Framework)
            .add_separator(SeparatorStyle::Line)
            .add_body(conclusion)
            .add_cta(CtaKind::Curiosity, "Which resonates most with you?")
            .add_hashtags([
                framework_name.replace(' ', ""),
                "Leadership".to_string(),
                "Strategy".to_string(),
            ]);
        post
    }

    /// Problem, journey and solution told as a story with a closing lesson
    pub fn story(
        hook: &str,
        problem: &str,
        journey: &str,
        solution: &str,
        lesson: &str,
        theme: Option<Arc<Theme>>,
    ) -> ComposablePost {
        let mut post = ComposablePost::new(PostType::Text, theme);
        post.add_hook(HookKind::Story, hook)
            .add_structured_body(
                format!("{}\n\n{}\n\n{}", problem, journey, solution),
                BodyStructure::StoryArc,
            )
            .add_separator(SeparatorStyle::Dots)
            .add_body(format!("The lesson: {}", lesson))
            .add_cta(CtaKind::Soft, CtaKind::Soft.default_prompt());
        post
    }

    pub fn listicle(
        hook: &str,
        items: &[&str],
        conclusion: &str,
        theme: Option<Arc<Theme>>,
    ) -> ComposablePost {
        let mut post = ComposablePost::new(PostType::Text, theme);
        post.add_hook(HookKind::List, hook)
            .add_structured_body(items.join("\n"), BodyStructure::Listicle)
            .add_separator(SeparatorStyle::Wave)
            .add_body(conclusion)
            .add_cta(CtaKind::Action, CtaKind::Action.default_prompt());
        post
    }

    /// Two options side by side followed by a recommendation
    pub fn comparison(
        hook: &str,
        option_a: &str,
        option_b: &str,
        recommendation: &str,
        theme: Option<Arc<Theme>>,
    ) -> ComposablePost {
        let mut post = ComposablePost::new(PostType::Text, theme);
        post.add_hook(HookKind::Question, hook)
            .add_structured_body(
                format!("{}||{}", option_a, option_b),
                BodyStructure::Comparison,
            )
            .add_separator(SeparatorStyle::Line)
            .add_body(format!("My take: {}", recommendation))
            .add_cta(CtaKind::Curiosity, "Which would you choose?");
        post
    }
}
