//! Text charts
//!
//! Every chart keeps its entries in insertion order and renders an optional
//! uppercased title line followed by one line per entry.

use super::{char_len, format_number, glyphs, is_blank, push_title, Component, ComponentKind};
use crate::themes::Theme;

const BAR_WIDTH: f64 = 10.0;
const PROGRESS_WIDTH: usize = 10;

fn collect_entries<I, K, V>(entries: I) -> Vec<(String, V)>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
{
    entries.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

/// Horizontal bars scaled against the largest value
#[derive(Debug, Clone)]
pub struct BarChart {
    pub entries: Vec<(String, f64)>,
    pub title: Option<String>,
    pub unit: Option<String>,
}

impl BarChart {
    pub fn new<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        Self {
            entries: collect_entries(entries),
            title: None,
            unit: None,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    fn run_length(value: f64, max: f64) -> usize {
        if value <= 0.0 || max <= 0.0 {
            return 0;
        }
        ((value / max * BAR_WIDTH).round() as usize).max(1)
    }
}

impl Component for BarChart {
    fn kind(&self) -> ComponentKind {
        ComponentKind::BarChart
    }

    fn render(&self, theme: Option<&Theme>) -> String {
        let mut lines = Vec::with_capacity(self.entries.len() + 2);
        push_title(&mut lines, "📊", self.title.as_deref(), theme);

        let max = self
            .entries
            .iter()
            .map(|(_, v)| *v)
            .fold(f64::NEG_INFINITY, f64::max);
        for (i, (label, value)) in self.entries.iter().enumerate() {
            let color = glyphs::BAR_COLORS[i % glyphs::BAR_COLORS.len()];
            let bar = color.repeat(Self::run_length(*value, max));
            let value = match &self.unit {
                Some(unit) => format!("{} {}", format_number(*value), unit),
                None => format_number(*value),
            };
            lines.push(format!("{} {}: {}", bar, label, value).trim_start().to_string());
        }
        lines.join("\n")
    }

    fn invalid_reason(&self) -> Option<String> {
        if self.entries.is_empty() {
            return Some("bar chart needs at least one entry".to_string());
        }
        if let Some((label, _)) = self.entries.iter().find(|(_, v)| !v.is_finite()) {
            return Some(format!("value for '{}' is not a number", label));
        }
        None
    }
}

/// Metric value shown as-is
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    Text(String),
    Number(f64),
}

impl std::fmt::Display for MetricValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricValue::Text(text) => f.write_str(text),
            MetricValue::Number(n) => f.write_str(&format_number(*n)),
        }
    }
}

impl From<&str> for MetricValue {
    fn from(value: &str) -> Self {
        MetricValue::Text(value.to_string())
    }
}

impl From<String> for MetricValue {
    fn from(value: String) -> Self {
        MetricValue::Text(value)
    }
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        MetricValue::Number(value)
    }
}

impl From<i64> for MetricValue {
    fn from(value: i64) -> Self {
        MetricValue::Number(value as f64)
    }
}

/// Key figures, each with a directional marker
#[derive(Debug, Clone)]
pub struct MetricsChart {
    pub entries: Vec<(String, MetricValue)>,
    pub title: Option<String>,
}

impl MetricsChart {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<MetricValue>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            title: None,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    fn marker(label: &str) -> &'static str {
        let label = label.to_lowercase();
        if ["decrease", "down", "decline"]
            .iter()
            .any(|cue| label.contains(cue))
        {
            glyphs::NEGATIVE
        } else {
            glyphs::POSITIVE
        }
    }
}

impl Component for MetricsChart {
    fn kind(&self) -> ComponentKind {
        ComponentKind::MetricsChart
    }

    fn render(&self, theme: Option<&Theme>) -> String {
        let mut lines = Vec::with_capacity(self.entries.len() + 2);
        push_title(&mut lines, "📈", self.title.as_deref(), theme);
        for (label, value) in &self.entries {
            lines.push(format!(
                "{} {} {} {}",
                Self::marker(label),
                value,
                glyphs::ARROW,
                label
            ));
        }
        lines.join("\n")
    }

    fn invalid_reason(&self) -> Option<String> {
        if self.entries.is_empty() {
            return Some("metrics chart needs at least one entry".to_string());
        }
        None
    }
}

/// Content of one comparison column
#[derive(Debug, Clone, PartialEq)]
pub enum ComparisonPoints {
    Single(String),
    List(Vec<String>),
}

impl From<&str> for ComparisonPoints {
    fn from(value: &str) -> Self {
        ComparisonPoints::Single(value.to_string())
    }
}

impl From<String> for ComparisonPoints {
    fn from(value: String) -> Self {
        ComparisonPoints::Single(value)
    }
}

impl<S: Into<String>> From<Vec<S>> for ComparisonPoints {
    fn from(value: Vec<S>) -> Self {
        ComparisonPoints::List(value.into_iter().map(Into::into).collect())
    }
}

/// Side-by-side columns; the last column is the preferred one
#[derive(Debug, Clone)]
pub struct ComparisonChart {
    pub columns: Vec<(String, ComparisonPoints)>,
    pub title: Option<String>,
}

impl ComparisonChart {
    pub fn new<I, K, V>(columns: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ComparisonPoints>,
    {
        Self {
            columns: columns
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            title: None,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

impl Component for ComparisonChart {
    fn kind(&self) -> ComponentKind {
        ComponentKind::ComparisonChart
    }

    fn render(&self, theme: Option<&Theme>) -> String {
        let mut lines = Vec::new();
        push_title(&mut lines, "⚖️", self.title.as_deref(), theme);

        let last = self.columns.len().saturating_sub(1);
        for (i, (header, points)) in self.columns.iter().enumerate() {
            if i > 0 {
                lines.push(String::new());
            }
            let marker = if i == last {
                glyphs::POSITIVE
            } else {
                glyphs::NEGATIVE
            };
            lines.push(format!("{} {}:", marker, header));
            match points {
                ComparisonPoints::Single(text) => lines.push(format!("  {}", text)),
                ComparisonPoints::List(items) => {
                    lines.extend(items.iter().map(|item| format!("  {} {}", glyphs::BULLET, item)))
                }
            }
        }
        lines.join("\n")
    }

    fn invalid_reason(&self) -> Option<String> {
        if self.columns.len() < 2 {
            return Some(format!(
                "comparison needs at least 2 columns (got {})",
                self.columns.len()
            ));
        }
        None
    }
}

/// Percentage bars aligned on the widest label
#[derive(Debug, Clone)]
pub struct ProgressChart {
    pub entries: Vec<(String, f64)>,
    pub title: Option<String>,
}

impl ProgressChart {
    pub fn new<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        Self {
            entries: collect_entries(entries),
            title: None,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    fn bar(percent: f64) -> String {
        let filled = ((percent / 10.0).floor().max(0.0) as usize).min(PROGRESS_WIDTH);
        format!(
            "{}{}",
            glyphs::PROGRESS_FILLED.repeat(filled),
            glyphs::PROGRESS_EMPTY.repeat(PROGRESS_WIDTH - filled)
        )
    }
}

impl Component for ProgressChart {
    fn kind(&self) -> ComponentKind {
        ComponentKind::ProgressChart
    }

    fn render(&self, theme: Option<&Theme>) -> String {
        let mut lines = Vec::with_capacity(self.entries.len() + 2);
        push_title(&mut lines, "🎯", self.title.as_deref(), theme);

        let width = self
            .entries
            .iter()
            .map(|(label, _)| char_len(label))
            .max()
            .unwrap_or(0);
        for (label, percent) in &self.entries {
            let padding = " ".repeat(width - char_len(label));
            lines.push(format!(
                "{}{}  {} {}%",
                label,
                padding,
                Self::bar(*percent),
                format_number(*percent)
            ));
        }
        lines.join("\n")
    }

    fn invalid_reason(&self) -> Option<String> {
        if self.entries.is_empty() {
            return Some("progress chart needs at least one entry".to_string());
        }
        if let Some((label, value)) = self
            .entries
            .iter()
            .find(|(_, v)| !v.is_finite() || !(0.0..=100.0).contains(v))
        {
            return Some(format!(
                "progress for '{}' must be within 0-100 (got {})",
                label, value
            ));
        }
        None
    }
}

/// Ordered leaderboard; callers sort entries before building it
#[derive(Debug, Clone)]
pub struct RankingChart {
    pub entries: Vec<(String, String)>,
    pub title: Option<String>,
    pub show_medals: bool,
}

impl RankingChart {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            title: None,
            show_medals: true,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn show_medals(mut self, show: bool) -> Self {
        self.show_medals = show;
        self
    }
}

impl Component for RankingChart {
    fn kind(&self) -> ComponentKind {
        ComponentKind::RankingChart
    }

    fn render(&self, theme: Option<&Theme>) -> String {
        let mut lines = Vec::with_capacity(self.entries.len() + 2);
        push_title(&mut lines, "🏆", self.title.as_deref(), theme);
        for (i, (label, value)) in self.entries.iter().enumerate() {
            let prefix = match glyphs::MEDALS.get(i) {
                Some(medal) if self.show_medals => medal.to_string(),
                _ => format!("{}.", i + 1),
            };
            lines.push(format!("{} {}: {}", prefix, label, value));
        }
        lines.join("\n")
    }

    fn invalid_reason(&self) -> Option<String> {
        if self.entries.is_empty() {
            return Some("ranking needs at least one entry".to_string());
        }
        if let Some(pos) = self.entries.iter().position(|(label, _)| is_blank(label)) {
            return Some(format!("ranking entry {} has an empty label", pos + 1));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::themes::ThemeManager;

    fn bar_run(line: &str) -> usize {
        line.chars()
            .filter(|c| "🟦🟩🟨🟧🟥🟪".contains(*c))
            .count()
    }

    #[test]
    fn test_bar_chart_scales_to_largest_value() {
        let chart = BarChart::new([("Q1", 10.0), ("Q2", 20.0)])
            .title("Rev")
            .unit("K");
        let rendered = chart.render(None);
        assert!(rendered.contains("REV:"));
        assert!(rendered.contains("10 K"));
        assert!(rendered.contains("20 K"));

        let q1 = rendered.lines().find(|l| l.contains("Q1")).unwrap();
        let q2 = rendered.lines().find(|l| l.contains("Q2")).unwrap();
        assert_eq!(bar_run(q1), 5);
        assert_eq!(bar_run(q2), 10);
    }

    #[test]
    fn test_bar_chart_small_positive_values_keep_a_glyph() {
        let chart = BarChart::new([("tiny", 1.0), ("huge", 1000.0), ("none", 0.0)]);
        let rendered = chart.render(None);
        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(bar_run(lines[0]), 1);
        assert_eq!(bar_run(lines[1]), 10);
        assert_eq!(lines[2], "none: 0");
    }

    #[test]
    fn test_bar_chart_validation() {
        assert!(!BarChart::new(Vec::<(String, f64)>::new()).validate());
        assert!(!BarChart::new([("x", f64::NAN)]).validate());
        assert!(BarChart::new([("x", -2.0)]).validate());
    }

    #[test]
    fn test_metrics_chart_markers() {
        let chart = MetricsChart::new([
            ("Revenue growth", MetricValue::from("+40%")),
            ("Churn decrease", MetricValue::from(12.0)),
        ])
        .title("Quarter");
        assert_eq!(
            chart.render(None),
            "📈 QUARTER:\n\n✅ +40% → Revenue growth\n❌ 12 → Churn decrease"
        );
        assert!(chart.validate());
        assert!(!MetricsChart::new(Vec::<(String, MetricValue)>::new()).validate());
    }

    #[test]
    fn test_comparison_chart_needs_two_columns() {
        assert!(!ComparisonChart::new(Vec::<(String, String)>::new()).validate());
        assert!(!ComparisonChart::new([("Only", "one")]).validate());
        assert!(ComparisonChart::new([("Old", "slow"), ("New", "fast")]).validate());
    }

    #[test]
    fn test_comparison_chart_render() {
        let chart = ComparisonChart::new([
            ("Before", ComparisonPoints::from(vec!["manual", "slow"])),
            ("After", ComparisonPoints::from("automated")),
        ]);
        assert_eq!(
            chart.render(None),
            "❌ Before:\n  • manual\n  • slow\n\n✅ After:\n  automated"
        );
    }

    #[test]
    fn test_progress_chart_bounds() {
        assert!(ProgressChart::new([("Task", 0.0)]).validate());
        assert!(ProgressChart::new([("Task", 100.0)]).validate());
        assert!(!ProgressChart::new([("Task", -10.0)]).validate());
        assert!(!ProgressChart::new([("Task", 150.0)]).validate());
        assert!(!ProgressChart::new(Vec::<(String, f64)>::new()).validate());
    }

    #[test]
    fn test_progress_chart_alignment() {
        let chart = ProgressChart::new([("Design", 100.0), ("QA", 35.0)]);
        assert_eq!(
            chart.render(None),
            "Design  ██████████ 100%\nQA      ███░░░░░░░ 35%"
        );
    }

    #[test]
    fn test_ranking_medals() {
        let chart = RankingChart::new([("a", "4"), ("b", "3"), ("c", "2"), ("d", "1")]);
        let lines: Vec<_> = chart.render(None).lines().map(String::from).collect();
        assert!(lines[0].starts_with("🥇"));
        assert!(lines[1].starts_with("🥈"));
        assert!(lines[2].starts_with("🥉"));
        assert_eq!(lines[3], "4. d: 1");
    }

    #[test]
    fn test_ranking_without_medals() {
        let chart = RankingChart::new([("a", "1"), ("b", "2")]).show_medals(false);
        assert_eq!(chart.render(None), "1. a: 1\n2. b: 2");
    }

    #[test]
    fn test_chart_title_plain_under_emoji_free_theme() {
        let theme = ThemeManager::new().get_theme("technical_expert").unwrap();
        let chart = RankingChart::new([("a", "1")]).title("Top");
        assert!(chart.render(Some(&theme)).starts_with("TOP:\n\n"));
    }
}
