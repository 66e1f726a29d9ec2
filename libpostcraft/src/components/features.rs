//! Visual feature blocks: quotes, stats, lists, checklists and friends
//!
//! None of these emit leading or trailing blank lines; spacing between
//! blocks is the composer's job.

use super::{char_len, glyphs, is_blank, push_title, Component, ComponentKind};
use crate::themes::Theme;

const QUOTE_MAX_CHARS: usize = 500;
const TAKEAWAY_MAX_CHARS: usize = 500;
const POLL_MIN_OPTIONS: usize = 2;
const POLL_MAX_OPTIONS: usize = 4;
const STATS_GRID_MAX_COLUMNS: usize = 4;
const EMOJI_NUMBERS: [&str; 10] = [
    "1️⃣", "2️⃣", "3️⃣", "4️⃣", "5️⃣", "6️⃣", "7️⃣", "8️⃣", "9️⃣", "🔟",
];

fn into_strings<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}

fn into_pairs<I, K, V>(pairs: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}

fn first_blank(items: &[String]) -> Option<usize> {
    items.iter().position(|item| is_blank(item))
}

/// Attributed quotation
#[derive(Debug, Clone)]
pub struct Quote {
    pub text: String,
    pub author: String,
    pub source: Option<String>,
}

impl Quote {
    pub fn new(text: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            author: author.into(),
            source: None,
        }
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Component for Quote {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Quote
    }

    fn render(&self, _theme: Option<&Theme>) -> String {
        let attribution = match &self.source {
            Some(source) => format!("{}, {}", self.author, source),
            None => self.author.clone(),
        };
        format!("💬 \"{}\"\n   — {}", self.text, attribution)
    }

    fn invalid_reason(&self) -> Option<String> {
        let len = char_len(&self.text);
        if len == 0 || len > QUOTE_MAX_CHARS {
            return Some(format!(
                "quote must be 1-{} characters (got {})",
                QUOTE_MAX_CHARS, len
            ));
        }
        if is_blank(&self.author) {
            return Some("quote needs an author".to_string());
        }
        None
    }
}

/// One headline number with its label
#[derive(Debug, Clone)]
pub struct BigStat {
    pub number: String,
    pub label: String,
    pub context: Option<String>,
}

impl BigStat {
    pub fn new(number: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            label: label.into(),
            context: None,
        }
    }

    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl Component for BigStat {
    fn kind(&self) -> ComponentKind {
        ComponentKind::BigStat
    }

    fn render(&self, _theme: Option<&Theme>) -> String {
        let mut lines = vec![format!("📈 {}", self.number), self.label.clone()];
        if let Some(context) = &self.context {
            lines.push(String::new());
            lines.push(context.clone());
        }
        lines.join("\n")
    }

    fn invalid_reason(&self) -> Option<String> {
        if is_blank(&self.number) || is_blank(&self.label) {
            return Some("big stat needs both a number and a label".to_string());
        }
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimelineStyle {
    /// `step → detail`
    #[default]
    Arrow,
    /// `1. step: detail`
    Numbered,
    /// `date | detail`
    Dated,
}

/// Ordered steps or milestones
#[derive(Debug, Clone)]
pub struct Timeline {
    pub steps: Vec<(String, String)>,
    pub style: TimelineStyle,
    pub title: Option<String>,
}

impl Timeline {
    pub fn new<I, K, V>(steps: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            steps: into_pairs(steps),
            style: TimelineStyle::default(),
            title: None,
        }
    }

    pub fn style(mut self, style: TimelineStyle) -> Self {
        self.style = style;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

impl Component for Timeline {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Timeline
    }

    fn render(&self, theme: Option<&Theme>) -> String {
        let mut lines = Vec::with_capacity(self.steps.len() + 2);
        push_title(&mut lines, "📅", self.title.as_deref(), theme);
        for (i, (step, detail)) in self.steps.iter().enumerate() {
            lines.push(match self.style {
                TimelineStyle::Arrow => format!("{} {} {}", step, glyphs::ARROW, detail),
                TimelineStyle::Numbered => format!("{}. {}: {}", i + 1, step, detail),
                TimelineStyle::Dated => format!("{} | {}", step, detail),
            });
        }
        lines.join("\n")
    }

    fn invalid_reason(&self) -> Option<String> {
        if self.steps.len() < 2 {
            return Some(format!(
                "timeline needs at least 2 steps (got {})",
                self.steps.len()
            ));
        }
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TakeawayStyle {
    #[default]
    Box,
    Highlight,
    Simple,
}

/// The one thing a reader should remember
#[derive(Debug, Clone)]
pub struct KeyTakeaway {
    pub message: String,
    pub style: TakeawayStyle,
    pub title: String,
}

impl KeyTakeaway {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            style: TakeawayStyle::default(),
            title: "Key Takeaway".to_string(),
        }
    }

    pub fn style(mut self, style: TakeawayStyle) -> Self {
        self.style = style;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

impl Component for KeyTakeaway {
    fn kind(&self) -> ComponentKind {
        ComponentKind::KeyTakeaway
    }

    fn render(&self, theme: Option<&Theme>) -> String {
        match self.style {
            TakeawayStyle::Box => {
                let mut lines = Vec::with_capacity(3);
                push_title(&mut lines, glyphs::LIGHTBULB, Some(&self.title), theme);
                lines.push(self.message.clone());
                lines.join("\n")
            }
            TakeawayStyle::Highlight => format!("{} {}", glyphs::LIGHTBULB, self.message),
            TakeawayStyle::Simple => self.message.clone(),
        }
    }

    fn invalid_reason(&self) -> Option<String> {
        let len = char_len(&self.message);
        if len == 0 || len > TAKEAWAY_MAX_CHARS {
            return Some(format!(
                "takeaway must be 1-{} characters (got {})",
                TAKEAWAY_MAX_CHARS, len
            ));
        }
        None
    }
}

/// Pros followed by cons
#[derive(Debug, Clone)]
pub struct ProCon {
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub title: Option<String>,
}

impl ProCon {
    pub fn new<P, C, S, T>(pros: P, cons: C) -> Self
    where
        P: IntoIterator<Item = S>,
        C: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            pros: into_strings(pros),
            cons: into_strings(cons),
            title: None,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

impl Component for ProCon {
    fn kind(&self) -> ComponentKind {
        ComponentKind::ProCon
    }

    fn render(&self, theme: Option<&Theme>) -> String {
        let mut lines = Vec::new();
        push_title(&mut lines, "⚖️", self.title.as_deref(), theme);
        lines.push(format!("{} PROS:", glyphs::POSITIVE));
        lines.extend(self.pros.iter().map(|p| format!("{} {}", glyphs::BULLET, p)));
        lines.push(String::new());
        lines.push(format!("{} CONS:", glyphs::NEGATIVE));
        lines.extend(self.cons.iter().map(|c| format!("{} {}", glyphs::BULLET, c)));
        lines.join("\n")
    }

    fn invalid_reason(&self) -> Option<String> {
        if self.pros.is_empty() || self.cons.is_empty() {
            return Some("pro/con needs at least one pro and one con".to_string());
        }
        if first_blank(&self.pros).is_some() || first_blank(&self.cons).is_some() {
            return Some("pro/con entries must not be blank".to_string());
        }
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistItem {
    pub text: String,
    pub checked: bool,
}

impl ChecklistItem {
    pub fn new(text: impl Into<String>, checked: bool) -> Self {
        Self {
            text: text.into(),
            checked,
        }
    }
}

/// Checkable items with an optional completion counter
#[derive(Debug, Clone)]
pub struct Checklist {
    pub items: Vec<ChecklistItem>,
    pub title: Option<String>,
    pub show_progress: bool,
}

impl Checklist {
    pub fn new(items: Vec<ChecklistItem>) -> Self {
        Self {
            items,
            title: None,
            show_progress: false,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }
}

impl Component for Checklist {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Checklist
    }

    fn render(&self, theme: Option<&Theme>) -> String {
        let mut lines = Vec::with_capacity(self.items.len() + 4);
        push_title(&mut lines, "📋", self.title.as_deref(), theme);
        if self.show_progress {
            let done = self.items.iter().filter(|item| item.checked).count();
            lines.push(format!("Progress: {}/{} complete", done, self.items.len()));
            lines.push(String::new());
        }
        for item in &self.items {
            let mark = if item.checked {
                glyphs::POSITIVE
            } else {
                glyphs::CHECKBOX
            };
            lines.push(format!("{} {}", mark, item.text));
        }
        lines.join("\n")
    }

    fn invalid_reason(&self) -> Option<String> {
        if self.items.is_empty() {
            return Some("checklist needs at least one item".to_string());
        }
        if let Some(pos) = self.items.iter().position(|item| is_blank(&item.text)) {
            return Some(format!("checklist item {} is blank", pos + 1));
        }
        None
    }
}

/// Two labelled states, the second one preferred
#[derive(Debug, Clone)]
pub struct BeforeAfter {
    pub before: Vec<String>,
    pub after: Vec<String>,
    pub before_label: String,
    pub after_label: String,
    pub title: Option<String>,
}

impl BeforeAfter {
    pub fn new<B, A, S, T>(before: B, after: A) -> Self
    where
        B: IntoIterator<Item = S>,
        A: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            before: into_strings(before),
            after: into_strings(after),
            before_label: "BEFORE".to_string(),
            after_label: "AFTER".to_string(),
            title: None,
        }
    }

    pub fn labels(mut self, before: impl Into<String>, after: impl Into<String>) -> Self {
        self.before_label = before.into();
        self.after_label = after.into();
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

impl Component for BeforeAfter {
    fn kind(&self) -> ComponentKind {
        ComponentKind::BeforeAfter
    }

    fn render(&self, theme: Option<&Theme>) -> String {
        let mut lines = Vec::new();
        push_title(&mut lines, "🔄", self.title.as_deref(), theme);
        lines.push(format!("{} {}:", glyphs::NEGATIVE, self.before_label));
        lines.extend(self.before.iter().map(|b| format!("{} {}", glyphs::BULLET, b)));
        lines.push(String::new());
        lines.push(format!("{} {}:", glyphs::POSITIVE, self.after_label));
        lines.extend(self.after.iter().map(|a| format!("{} {}", glyphs::BULLET, a)));
        lines.join("\n")
    }

    fn invalid_reason(&self) -> Option<String> {
        if self.before.is_empty() || self.after.is_empty() {
            return Some("before/after needs items on both sides".to_string());
        }
        if first_blank(&self.before).is_some() || first_blank(&self.after).is_some() {
            return Some("before/after items must not be blank".to_string());
        }
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TipStyle {
    Info,
    #[default]
    Tip,
    Warning,
    Success,
}

impl TipStyle {
    fn heading(self) -> (&'static str, &'static str) {
        match self {
            TipStyle::Info => ("ℹ️", "INFO"),
            TipStyle::Tip => (glyphs::LIGHTBULB, "PRO TIP"),
            TipStyle::Warning => ("⚠️", "WARNING"),
            TipStyle::Success => (glyphs::POSITIVE, "SUCCESS"),
        }
    }
}

/// Callout box
#[derive(Debug, Clone)]
pub struct TipBox {
    pub message: String,
    pub style: TipStyle,
    pub title: Option<String>,
}

impl TipBox {
    pub fn new(message: impl Into<String>, style: TipStyle) -> Self {
        Self {
            message: message.into(),
            style,
            title: None,
        }
    }

    /// Replace the style's default heading
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

impl Component for TipBox {
    fn kind(&self) -> ComponentKind {
        ComponentKind::TipBox
    }

    fn render(&self, theme: Option<&Theme>) -> String {
        let (emoji, heading) = self.style.heading();
        let heading = self.title.as_deref().unwrap_or(heading);
        let mut lines = Vec::with_capacity(3);
        push_title(&mut lines, emoji, Some(heading), theme);
        lines.push(self.message.clone());
        lines.join("\n")
    }

    fn invalid_reason(&self) -> Option<String> {
        if is_blank(&self.message) {
            return Some("tip box message is blank".to_string());
        }
        None
    }
}

/// Label/value pairs laid out in rows of `columns`
#[derive(Debug, Clone)]
pub struct StatsGrid {
    pub stats: Vec<(String, String)>,
    pub columns: usize,
    pub title: Option<String>,
}

impl StatsGrid {
    pub fn new<I, K, V>(stats: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            stats: into_pairs(stats),
            columns: 2,
            title: None,
        }
    }

    pub fn columns(mut self, columns: usize) -> Self {
        self.columns = columns;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

impl Component for StatsGrid {
    fn kind(&self) -> ComponentKind {
        ComponentKind::StatsGrid
    }

    fn render(&self, theme: Option<&Theme>) -> String {
        let mut lines = Vec::new();
        push_title(&mut lines, "📊", self.title.as_deref(), theme);
        for row in self.stats.chunks(self.columns.max(1)) {
            lines.push(
                row.iter()
                    .map(|(label, value)| format!("{}: {}", label, value))
                    .collect::<Vec<_>>()
                    .join("  |  "),
            );
        }
        lines.join("\n")
    }

    fn invalid_reason(&self) -> Option<String> {
        if self.stats.len() < 2 {
            return Some(format!(
                "stats grid needs at least 2 stats (got {})",
                self.stats.len()
            ));
        }
        if !(1..=STATS_GRID_MAX_COLUMNS).contains(&self.columns) {
            return Some(format!(
                "stats grid columns must be 1-{} (got {})",
                STATS_GRID_MAX_COLUMNS, self.columns
            ));
        }
        if self
            .stats
            .iter()
            .any(|(label, value)| is_blank(label) || is_blank(value))
        {
            return Some("stats grid entries must not be blank".to_string());
        }
        None
    }
}

/// Mock-up of a platform poll
#[derive(Debug, Clone)]
pub struct PollPreview {
    pub question: String,
    pub options: Vec<String>,
}

impl PollPreview {
    pub fn new<I, S>(question: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            question: question.into(),
            options: into_strings(options),
        }
    }
}

impl Component for PollPreview {
    fn kind(&self) -> ComponentKind {
        ComponentKind::PollPreview
    }

    fn render(&self, _theme: Option<&Theme>) -> String {
        let mut lines = vec![
            "📊 POLL:".to_string(),
            String::new(),
            self.question.clone(),
            String::new(),
        ];
        lines.extend(self.options.iter().map(|option| format!("◯ {}", option)));
        lines.push(String::new());
        lines.push("💬 Vote in the poll below!".to_string());
        lines.join("\n")
    }

    fn invalid_reason(&self) -> Option<String> {
        if is_blank(&self.question) {
            return Some("poll question is blank".to_string());
        }
        let count = self.options.len();
        if !(POLL_MIN_OPTIONS..=POLL_MAX_OPTIONS).contains(&count) {
            return Some(format!(
                "poll needs {}-{} options (got {})",
                POLL_MIN_OPTIONS, POLL_MAX_OPTIONS, count
            ));
        }
        if let Some(pos) = first_blank(&self.options) {
            return Some(format!("poll option {} is blank", pos + 1));
        }
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    pub icon: Option<String>,
    pub title: String,
    pub description: Option<String>,
}

impl Feature {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            icon: None,
            title: title.into(),
            description: None,
        }
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Product or idea highlights with optional descriptions
#[derive(Debug, Clone)]
pub struct FeatureList {
    pub features: Vec<Feature>,
    pub title: Option<String>,
}

impl FeatureList {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            features,
            title: None,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

impl Component for FeatureList {
    fn kind(&self) -> ComponentKind {
        ComponentKind::FeatureList
    }

    fn render(&self, theme: Option<&Theme>) -> String {
        let mut lines = Vec::new();
        push_title(&mut lines, "✨", self.title.as_deref(), theme);
        for feature in &self.features {
            let icon = feature.icon.as_deref().unwrap_or(glyphs::BULLET);
            lines.push(format!("{} {}", icon, feature.title));
            if let Some(description) = &feature.description {
                lines.push(format!("   {}", description));
            }
        }
        lines.join("\n")
    }

    fn invalid_reason(&self) -> Option<String> {
        if self.features.is_empty() {
            return Some("feature list needs at least one feature".to_string());
        }
        if let Some(pos) = self.features.iter().position(|f| is_blank(&f.title)) {
            return Some(format!("feature {} has a blank title", pos + 1));
        }
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumberedListStyle {
    /// `1.`
    #[default]
    Numbers,
    /// Keycap emoji up to ten, plain numbers beyond
    EmojiNumbers,
    /// `[1]`
    BoldNumbers,
}

#[derive(Debug, Clone)]
pub struct NumberedList {
    pub items: Vec<String>,
    pub style: NumberedListStyle,
    pub start: usize,
    pub title: Option<String>,
}

impl NumberedList {
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            items: into_strings(items),
            style: NumberedListStyle::default(),
            start: 1,
            title: None,
        }
    }

    pub fn style(mut self, style: NumberedListStyle) -> Self {
        self.style = style;
        self
    }

    pub fn start(mut self, start: usize) -> Self {
        self.start = start;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    fn marker(&self, n: usize) -> String {
        match self.style {
            NumberedListStyle::Numbers => format!("{}.", n),
            NumberedListStyle::EmojiNumbers => {
                match n.checked_sub(1).and_then(|i| EMOJI_NUMBERS.get(i)) {
                    Some(keycap) => keycap.to_string(),
                    None => format!("{}.", n),
                }
            }
            NumberedListStyle::BoldNumbers => format!("[{}]", n),
        }
    }
}

impl Component for NumberedList {
    fn kind(&self) -> ComponentKind {
        ComponentKind::NumberedList
    }

    fn render(&self, theme: Option<&Theme>) -> String {
        let mut lines = Vec::with_capacity(self.items.len() + 2);
        push_title(&mut lines, "📝", self.title.as_deref(), theme);
        for (offset, item) in self.items.iter().enumerate() {
            lines.push(format!("{} {}", self.marker(self.start.saturating_add(offset)), item));
        }
        lines.join("\n")
    }

    fn invalid_reason(&self) -> Option<String> {
        if self.items.is_empty() {
            return Some("numbered list needs at least one item".to_string());
        }
        if self.start < 1 {
            return Some("numbered list must start at 1 or above".to_string());
        }
        if let Some(pos) = first_blank(&self.items) {
            return Some(format!("list item {} is blank", pos + 1));
        }
        None
    }
}
